//! Token model
//!
//! The unit of markup exchanged between the tree walker, the sanitizer
//! filter and the serializer.

use std::fmt;

/// XHTML namespace
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
/// SVG namespace
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
/// XLink namespace (`xlink:href`)
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";
/// XML namespace (`xml:base`, `xml:lang`)
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Prefixes used when a namespaced attribute is written out as text
const PREFIXES: &[(&str, &str)] = &[
    ("xlink", XLINK_NAMESPACE),
    ("xml", XML_NAMESPACE),
    ("xmlns", XMLNS_NAMESPACE),
];

/// Look up the namespace URI bound to a conventional attribute prefix
pub fn namespace_for_prefix(prefix: &str) -> Option<&'static str> {
    PREFIXES.iter().find(|(p, _)| *p == prefix).map(|(_, ns)| *ns)
}

/// Look up the conventional prefix of a namespace URI
pub fn prefix_for_namespace(namespace: &str) -> Option<&'static str> {
    PREFIXES.iter().find(|(_, ns)| *ns == namespace).map(|(p, _)| *p)
}

/// Namespace-qualified attribute name
///
/// `namespace` is `None` for plain attributes. Ordering follows the
/// canonical output order: namespace first (absent sorts as empty), then
/// local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrName {
    pub namespace: Option<String>,
    pub local: String,
}

impl AttrName {
    /// Attribute without a namespace
    pub fn new(local: impl Into<String>) -> Self {
        Self { namespace: None, local: local.into() }
    }

    /// Attribute in the given namespace
    pub fn with_namespace(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self { namespace: Some(namespace.into()), local: local.into() }
    }

    /// Parse `name` or `prefix:name`, resolving the prefix against the
    /// well-known attribute namespaces. Returns `None` for an unknown prefix.
    pub fn parse(qualified: &str) -> Option<Self> {
        match qualified.split_once(':') {
            Some((prefix, local)) => {
                namespace_for_prefix(prefix).map(|ns| Self::with_namespace(ns, local))
            }
            None => Some(Self::new(qualified)),
        }
    }

    /// Canonical sort key: (namespace or "", local name)
    pub fn sort_key(&self) -> (&str, &str) {
        (self.namespace.as_deref().unwrap_or(""), &self.local)
    }
}

impl Ord for AttrName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for AttrName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AttrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace.as_deref() {
            None => f.write_str(&self.local),
            Some(ns) => match prefix_for_namespace(ns) {
                Some(prefix) => write!(f, "{}:{}", prefix, self.local),
                None => write!(f, "{}:{}", ns, self.local),
            },
        }
    }
}

/// A single attribute of a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: AttrName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: AttrName, value: impl Into<String>) -> Self {
        Self { name, value: value.into() }
    }
}

/// Start, end or empty tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Element namespace, `None` for no namespace
    pub namespace: Option<String>,
    /// Local element name as produced by the tokenizer
    pub name: String,
    /// Attributes; keys are unique within one tag
    pub attrs: Vec<Attribute>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { namespace: None, name: name.into(), attrs: Vec::new() }
    }

    /// Builder-style attribute helper for plain attributes
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(AttrName::new(name), value);
        self
    }

    /// Builder-style namespace helper
    pub fn in_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Get an attribute value
    pub fn attr(&self, name: &AttrName) -> Option<&str> {
        self.attrs.iter().find(|a| &a.name == name).map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any existing value for the same key
    pub fn set_attr(&mut self, name: AttrName, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attribute::new(name, value)),
        }
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, name: &AttrName) -> Option<String> {
        let idx = self.attrs.iter().position(|a| &a.name == name)?;
        Some(self.attrs.remove(idx).value)
    }

    /// Sort attributes into canonical (namespace, name) order
    pub fn sort_attrs(&mut self) {
        self.attrs.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

/// One unit of markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag(Tag),
    EndTag(Tag),
    /// Tag without content or end tag (void elements)
    EmptyTag(Tag),
    Comment(String),
    Characters(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

impl Token {
    /// The tag carried by a start/end/empty token
    pub fn tag(&self) -> Option<&Tag> {
        match self {
            Token::StartTag(tag) | Token::EndTag(tag) | Token::EmptyTag(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn characters(text: impl Into<String>) -> Self {
        Token::Characters(text.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Token::Comment(text.into())
    }
}
