//! HTML Serialization
//!
//! Renders a token stream back into an HTML string.
//!
//! Key features:
//! - Proper HTML escaping of text and attribute values
//! - Void element handling (no end tag, no trailing slash)
//! - Raw text elements emitted verbatim
//! - Namespaced attributes keep their prefix (`xlink:href`)

use crate::escape::{escape_attribute, escape_text};
use crate::token::{Tag, Token, HTML_NAMESPACE};

/// Raw text elements (no escaping for content)
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript",
];

/// Token stream serializer
#[derive(Debug, Default)]
pub struct HtmlSerializer {
    /// Raw text element we are currently inside of
    raw_text: Option<String>,
}

fn is_html(tag: &Tag) -> bool {
    matches!(tag.namespace.as_deref(), None | Some(HTML_NAMESPACE))
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize a whole token stream
    pub fn serialize<I>(mut self, tokens: I) -> String
    where
        I: IntoIterator<Item = Token>,
    {
        let mut output = String::new();
        for token in tokens {
            self.serialize_token(&token, &mut output);
        }
        output
    }

    /// Append a single token
    pub fn serialize_token(&mut self, token: &Token, output: &mut String) {
        match token {
            Token::StartTag(tag) => {
                self.serialize_tag(tag, output);
                if is_html(tag) && RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) {
                    self.raw_text = Some(tag.name.clone());
                }
            }
            Token::EmptyTag(tag) => self.serialize_tag(tag, output),
            Token::EndTag(tag) => {
                if self.raw_text.as_deref() == Some(tag.name.as_str()) {
                    self.raw_text = None;
                }
                output.push_str("</");
                output.push_str(&tag.name);
                output.push('>');
            }
            Token::Characters(text) => {
                if self.raw_text.is_some() {
                    output.push_str(text);
                } else {
                    escape_text(text, output);
                }
            }
            Token::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            Token::Doctype { name, .. } => {
                output.push_str("<!DOCTYPE ");
                output.push_str(name);
                output.push('>');
            }
        }
    }

    fn serialize_tag(&self, tag: &Tag, output: &mut String) {
        output.push('<');
        output.push_str(&tag.name);

        for attr in &tag.attrs {
            output.push(' ');
            output.push_str(&attr.name.to_string());
            output.push_str("=\"");
            escape_attribute(&attr.value, output);
            output.push('"');
        }

        output.push('>');
    }
}

/// Utility: serialize a token stream with default settings
pub fn serialize<I>(tokens: I) -> String
where
    I: IntoIterator<Item = Token>,
{
    HtmlSerializer::new().serialize(tokens)
}
