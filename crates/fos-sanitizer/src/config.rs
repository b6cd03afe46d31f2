//! Sanitizer configuration
//!
//! Plain-data configuration surface, its defaults and a fluent builder.
//! A configuration is validated and compiled into a [`Policy`](crate::policy::Policy)
//! once, when the [`Sanitizer`](crate::Sanitizer) is constructed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use crate::Sanitizer;

/// Attribute-map key whose list applies to every element
pub const WILDCARD: &str = "*";

/// Default allowed elements
pub const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "b", "blockquote", "code", "em", "i", "li", "ol", "strong", "ul",
];

/// Default allowed attributes per element
pub const ALLOWED_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title"]),
    ("abbr", &["title"]),
    ("acronym", &["title"]),
];

/// Default allowed URL protocols
pub const ALLOWED_PROTOCOLS: &[&str] = &["http", "https", "mailto"];

/// Conventional safe CSS properties (opt-in via [`SanitizerBuilder::standard_styles`])
pub const CSS_PROPERTIES: &[&str] = &[
    "azimuth", "background-color", "border-bottom-color", "border-collapse",
    "border-color", "border-left-color", "border-right-color", "border-top-color",
    "clear", "color", "cursor", "direction", "display", "elevation", "float", "font",
    "font-family", "font-size", "font-style", "font-variant", "font-weight", "height",
    "letter-spacing", "line-height", "overflow", "pause", "pause-after", "pause-before",
    "pitch", "pitch-range", "richness", "speak", "speak-header", "speak-numeral",
    "speak-punctuation", "speech-rate", "stress", "text-align", "text-decoration",
    "text-indent", "unicode-bidi", "vertical-align", "voice-family", "volume",
    "white-space", "width",
];

/// Conventional safe SVG presentation properties
pub const SVG_PROPERTIES: &[&str] = &[
    "fill", "fill-opacity", "fill-rule", "stroke", "stroke-width", "stroke-linecap",
    "stroke-linejoin", "stroke-opacity",
];

/// Attributes whose value is a URI and is subject to protocol checks
pub const URI_ATTRIBUTES: &[&str] = &[
    "action", "background", "cite", "datasrc", "dynsrc", "href", "longdesc", "lowsrc",
    "ping", "poster", "src", "xlink:href", "xml:base",
];

/// SVG attributes that may hold a `url(#local)` reference
pub const SVG_REF_ATTRIBUTES: &[&str] = &[
    "clip-path", "color-profile", "cursor", "fill", "filter", "marker", "marker-start",
    "marker-mid", "marker-end", "mask", "stroke",
];

/// SVG elements whose `href`/`xlink:href` must be a local reference
pub const SVG_LOCAL_HREF_ELEMENTS: &[&str] = &[
    "altGlyph", "animate", "animateColor", "animateMotion", "animateTransform", "cursor",
    "feImage", "filter", "linearGradient", "pattern", "radialGradient", "textPath", "tref",
    "set", "use",
];

/// Configuration errors, reported when a sanitizer is built
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("the wildcard attribute rule `*` must be a list, not a predicate")]
    WildcardPredicate,

    #[error("element `{element}` has both an attribute list and an attribute predicate")]
    ConflictingAttributeRule { element: String },

    #[error("unknown namespace prefix in attribute `{attribute}`")]
    UnknownNamespacePrefix { attribute: String },

    #[error("empty name in `{field}`")]
    EmptyName { field: &'static str },
}

/// Attribute predicate: `(name, value) -> keep?`
#[derive(Clone)]
pub struct AttributePredicate(Arc<dyn Fn(&str, &str) -> bool + Send + Sync>);

impl AttributePredicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, name: &str, value: &str) -> bool {
        (self.0)(name, value)
    }
}

impl fmt::Debug for AttributePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AttributePredicate(..)")
    }
}

/// Per-element attribute rule
#[derive(Debug, Clone)]
pub enum AttributeRule {
    /// Explicit attribute names
    List(Vec<String>),
    /// Decide per attribute; wildcard attributes are not merged in
    Predicate(AttributePredicate),
}

impl AttributeRule {
    pub fn list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributeRule::List(names.into_iter().map(Into::into).collect())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        AttributeRule::Predicate(AttributePredicate::new(f))
    }
}

// Only lists can come from a config file
impl<'de> Deserialize<'de> for AttributeRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer).map(AttributeRule::List)
    }
}

/// Allowed-attribute specification
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AllowedAttributes {
    /// Element name to rule; the [`WILDCARD`] key applies to every element
    Map(HashMap<String, AttributeRule>),
    /// One list for every element
    List(Vec<String>),
}

impl Default for AllowedAttributes {
    fn default() -> Self {
        AllowedAttributes::Map(
            ALLOWED_ATTRIBUTES
                .iter()
                .map(|(element, attrs)| (element.to_string(), AttributeRule::list(attrs.iter().copied())))
                .collect(),
        )
    }
}

/// Sanitizer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Allowed element names
    pub tags: Vec<String>,
    /// Allowed attributes
    pub attributes: AllowedAttributes,
    /// Allowed generic CSS properties
    pub styles: Vec<String>,
    /// Allowed SVG CSS properties
    pub svg_styles: Vec<String>,
    /// Allowed URL protocols (case-insensitive)
    pub protocols: Vec<String>,
    /// Drop disallowed elements instead of escaping them
    pub strip: bool,
    /// Drop HTML comments
    pub strip_comments: bool,
    /// URI-valued attributes (`name` or `prefix:name`)
    pub uri_attributes: Vec<String>,
    /// SVG attributes allowed to hold local `url()` references
    pub svg_ref_attributes: Vec<String>,
    /// SVG elements restricted to local `href`s
    pub svg_local_href_elements: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            tags: owned(ALLOWED_TAGS),
            attributes: AllowedAttributes::default(),
            styles: Vec::new(),
            svg_styles: Vec::new(),
            protocols: owned(ALLOWED_PROTOCOLS),
            strip: false,
            strip_comments: true,
            uri_attributes: owned(URI_ATTRIBUTES),
            svg_ref_attributes: owned(SVG_REF_ATTRIBUTES),
            svg_local_href_elements: owned(SVG_LOCAL_HREF_ELEMENTS),
        }
    }
}

/// Fluent [`Sanitizer`] construction
///
/// Conflicting calls are remembered and reported by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct SanitizerBuilder {
    config: SanitizerConfig,
    error: Option<ConfigError>,
}

impl SanitizerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: SanitizerConfig) -> Self {
        Self { config, error: None }
    }

    /// Replace the allowed elements
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the whole attribute specification
    pub fn attributes(mut self, attributes: AllowedAttributes) -> Self {
        self.config.attributes = attributes;
        self
    }

    /// Allow a list of attributes on `element` (or on every element with `*`)
    pub fn allow_attributes<I, S>(self, element: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_rule(element, AttributeRule::list(names))
    }

    /// Decide attributes of `element` with a predicate
    pub fn attribute_filter<F>(self, element: &str, f: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.set_rule(element, AttributeRule::predicate(f))
    }

    fn set_rule(mut self, element: &str, rule: AttributeRule) -> Self {
        if element == WILDCARD && matches!(rule, AttributeRule::Predicate(_)) {
            self.error.get_or_insert(ConfigError::WildcardPredicate);
            return self;
        }

        // A single list means "wildcard only"
        let placeholder = AllowedAttributes::Map(HashMap::new());
        let mut map = match std::mem::replace(&mut self.config.attributes, placeholder) {
            AllowedAttributes::Map(map) => map,
            AllowedAttributes::List(list) => {
                HashMap::from([(WILDCARD.to_string(), AttributeRule::List(list))])
            }
        };

        let conflict = match rule {
            AttributeRule::List(names) => match map.get_mut(element) {
                Some(AttributeRule::List(existing)) => {
                    existing.extend(names);
                    false
                }
                Some(AttributeRule::Predicate(_)) => true,
                None => {
                    map.insert(element.to_string(), AttributeRule::List(names));
                    false
                }
            },
            AttributeRule::Predicate(predicate) => match map.get(element) {
                Some(AttributeRule::List(_)) => true,
                _ => {
                    map.insert(element.to_string(), AttributeRule::Predicate(predicate));
                    false
                }
            },
        };
        if conflict {
            self.error.get_or_insert(ConfigError::ConflictingAttributeRule {
                element: element.to_string(),
            });
        }
        self.config.attributes = AllowedAttributes::Map(map);
        self
    }

    /// Replace the allowed protocols
    pub fn protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.protocols = protocols.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the allowed generic CSS properties
    pub fn styles<I, S>(mut self, styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.styles = styles.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the allowed SVG CSS properties
    pub fn svg_styles<I, S>(mut self, styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.svg_styles = styles.into_iter().map(Into::into).collect();
        self
    }

    /// Allow [`CSS_PROPERTIES`] and [`SVG_PROPERTIES`]
    pub fn standard_styles(self) -> Self {
        self.styles(CSS_PROPERTIES.iter().copied())
            .svg_styles(SVG_PROPERTIES.iter().copied())
    }

    /// Drop disallowed elements instead of escaping them
    pub fn strip(mut self, strip: bool) -> Self {
        self.config.strip = strip;
        self
    }

    /// Drop HTML comments
    pub fn strip_comments(mut self, strip: bool) -> Self {
        self.config.strip_comments = strip;
        self
    }

    /// Replace the URI-valued attributes
    pub fn uri_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.uri_attributes = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the SVG reference attributes
    pub fn svg_ref_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.svg_ref_attributes = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the SVG elements restricted to local hrefs
    pub fn svg_local_href_elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.svg_local_href_elements = names.into_iter().map(Into::into).collect();
        self
    }

    /// Validate and compile the configuration
    pub fn build(self) -> Result<Sanitizer, ConfigError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Sanitizer::new(self.config)
    }
}
