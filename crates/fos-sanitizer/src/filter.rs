//! Token sanitization filter
//!
//! Pull-based adapter over a token stream. Every input token is either
//! passed through, rewritten (attributes dropped or cleaned), turned into
//! inert text, or removed. The filter holds no state besides the policy, so
//! a consumer may stop pulling at any point.

use std::sync::OnceLock;

use regex::Regex;

use crate::escape::{escape_text, unescape};
use crate::policy::Policy;
use crate::protocol::is_allowed_uri;
use crate::token::{AttrName, Tag, Token, XLINK_NAMESPACE};

fn nonlocal_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)url\s*\(\s*[^#\s)][^)]*\)").expect("url reference pattern must compile")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Start,
    End,
    Empty,
}

impl TagKind {
    fn split(token: Token) -> Result<(TagKind, Tag), Token> {
        match token {
            Token::StartTag(tag) => Ok((TagKind::Start, tag)),
            Token::EndTag(tag) => Ok((TagKind::End, tag)),
            Token::EmptyTag(tag) => Ok((TagKind::Empty, tag)),
            other => Err(other),
        }
    }

    fn wrap(self, tag: Tag) -> Token {
        match self {
            TagKind::Start => Token::StartTag(tag),
            TagKind::End => Token::EndTag(tag),
            TagKind::Empty => Token::EmptyTag(tag),
        }
    }
}

/// Lazy sanitizing iterator over a token stream
pub struct SanitizerFilter<'a, I> {
    source: I,
    policy: &'a Policy,
}

impl<'a, I> SanitizerFilter<'a, I> {
    pub fn new(source: I, policy: &'a Policy) -> Self {
        Self { source, policy }
    }

    /// Decide the fate of a single token; `None` drops it
    pub fn sanitize_token(&self, token: Token) -> Option<Token> {
        let (kind, tag) = match TagKind::split(token) {
            Ok(split) => split,
            Err(Token::Comment(text)) => {
                if self.policy.strip_comments() {
                    tracing::trace!(comment = %text, "dropping comment");
                    return None;
                }
                return Some(Token::Comment(text));
            }
            Err(other) => return Some(other),
        };

        if self.policy.allows_element(&tag.name) {
            return Some(kind.wrap(self.allow_tag(tag)));
        }

        if self.policy.strip() {
            tracing::trace!(element = %tag.name, "stripping disallowed element");
            return None;
        }

        tracing::trace!(element = %tag.name, "escaping disallowed element");
        Some(Token::Characters(disallowed_markup(kind, tag)))
    }

    /// Clean the attributes of an allowed tag
    fn allow_tag(&self, mut tag: Tag) -> Tag {
        let policy = self.policy;

        let rule = policy.resolve(&tag.name);
        tag.attrs.retain(|attr| rule.allows(&attr.name.local, &attr.value));

        for name in policy.uri_attributes() {
            let allowed = tag.attr(name).map(|value| is_allowed_uri(value, policy.protocols()));
            if allowed == Some(false) {
                tracing::debug!(element = %tag.name, attribute = %name, "dropping attribute with disallowed protocol");
                tag.remove_attr(name);
            }
        }

        for name in policy.svg_ref_attributes() {
            let Some(value) = tag.attr(name) else {
                continue;
            };
            let cleaned = strip_nonlocal_refs(value);
            if cleaned.is_empty() {
                tracing::debug!(element = %tag.name, attribute = %name, "dropping non-local reference");
                tag.remove_attr(name);
            } else {
                tag.set_attr(name.clone(), cleaned);
            }
        }

        if policy.requires_local_href(&tag.name) {
            for name in [AttrName::new("href"), AttrName::with_namespace(XLINK_NAMESPACE, "href")] {
                if tag.attr(&name).is_some_and(|value| !is_local_reference(value)) {
                    tracing::debug!(element = %tag.name, attribute = %name, "dropping non-local href");
                    tag.remove_attr(&name);
                }
            }
        }

        let style = AttrName::new("style");
        if let Some(value) = tag.attr(&style) {
            let cleaned = policy.css().sanitize(value);
            tag.set_attr(style, cleaned);
        }

        tag.sort_attrs();
        tag
    }
}

impl<I: Iterator<Item = Token>> Iterator for SanitizerFilter<'_, I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let token = self.source.next()?;
            if let Some(token) = self.sanitize_token(token) {
                return Some(token);
            }
        }
    }
}

/// Remove `url()` references that do not point into the document
fn strip_nonlocal_refs(value: &str) -> String {
    let unescaped = unescape(value);
    nonlocal_url_regex().replace_all(&unescaped, " ").trim().to_string()
}

/// `#fragment`, ignoring leading whitespace
fn is_local_reference(value: &str) -> bool {
    value.trim_start().starts_with('#')
}

/// Text form of a disallowed tag, attributes in canonical order
fn disallowed_markup(kind: TagKind, mut tag: Tag) -> String {
    if kind == TagKind::End {
        return format!("</{}>", tag.name);
    }

    tag.sort_attrs();
    let mut markup = String::from("<");
    markup.push_str(&tag.name);
    for attr in &tag.attrs {
        markup.push(' ');
        markup.push_str(&attr.name.to_string());
        markup.push_str("=\"");
        escape_text(&attr.value, &mut markup);
        markup.push('"');
    }
    markup.push('>');
    markup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SanitizerBuilder, SanitizerConfig};

    fn policy() -> Policy {
        Policy::compile(SanitizerConfig::default()).unwrap()
    }

    #[test]
    fn test_is_local_reference() {
        assert!(is_local_reference("#foo"));
        assert!(is_local_reference("  #foo"));
        assert!(!is_local_reference("https://example.com/#foo"));
        assert!(!is_local_reference(""));
    }

    #[test]
    fn test_strip_nonlocal_refs() {
        assert_eq!(strip_nonlocal_refs("url(#foo)"), "url(#foo)");
        assert_eq!(strip_nonlocal_refs("url(http://example.com#foo)"), "");
        assert_eq!(strip_nonlocal_refs("red url(http://x/y)"), "red");
        assert_eq!(strip_nonlocal_refs(" url( #a ) "), "url( #a )");
        assert_eq!(strip_nonlocal_refs("URL(http://evil.example/x)"), "");
        assert_eq!(strip_nonlocal_refs("Url( //evil.example/x )"), "");
        assert_eq!(strip_nonlocal_refs("url(x)"), "");
        assert_eq!(strip_nonlocal_refs("URL(#grad)"), "URL(#grad)");
    }

    #[test]
    fn test_disallowed_markup_sorted() {
        let tag = Tag::new("script").with_attr("type", "x").with_attr("src", "a&b");
        assert_eq!(
            disallowed_markup(TagKind::Start, tag),
            r#"<script src="a&amp;b" type="x">"#
        );
        assert_eq!(disallowed_markup(TagKind::End, Tag::new("script")), "</script>");
    }

    #[test]
    fn test_comment_dropped_by_default() {
        let policy = policy();
        let filter = SanitizerFilter::new(std::iter::empty::<Token>(), &policy);
        assert_eq!(filter.sanitize_token(Token::comment(" c ")), None);
    }

    #[test]
    fn test_comment_kept_when_configured() {
        let sanitizer = SanitizerBuilder::new().strip_comments(false).build().unwrap();
        let filter = SanitizerFilter::new(std::iter::empty::<Token>(), sanitizer.policy());
        assert_eq!(filter.sanitize_token(Token::comment(" c ")), Some(Token::comment(" c ")));
    }

    #[test]
    fn test_characters_pass_through() {
        let policy = policy();
        let filter = SanitizerFilter::new(std::iter::empty::<Token>(), &policy);
        let token = Token::characters("a < b & c");
        assert_eq!(filter.sanitize_token(token.clone()), Some(token));
    }

    #[test]
    fn test_iterator_skips_dropped_tokens() {
        let policy = policy();
        let tokens = vec![
            Token::comment("x"),
            Token::StartTag(Tag::new("em")),
            Token::comment("y"),
            Token::EndTag(Tag::new("em")),
        ];
        let out: Vec<Token> = SanitizerFilter::new(tokens.into_iter(), &policy).collect();
        assert_eq!(out, vec![Token::StartTag(Tag::new("em")), Token::EndTag(Tag::new("em"))]);
    }
}
