//! Compiled sanitizer policy
//!
//! An immutable, validated form of [`SanitizerConfig`] plus the attribute
//! policy resolver.

use std::collections::{HashMap, HashSet};

use crate::config::{
    AllowedAttributes, AttributePredicate, AttributeRule, ConfigError, SanitizerConfig, WILDCARD,
};
use crate::css::CssSanitizer;
use crate::token::AttrName;

/// Attribute rule resolved for one element
#[derive(Debug, Clone)]
pub enum ResolvedAttributes<'a> {
    /// Element-specific predicate, used on its own
    Predicate(&'a AttributePredicate),
    /// Element-specific names followed by the wildcard names
    List(Vec<&'a str>),
}

impl ResolvedAttributes<'_> {
    /// Does the rule keep this attribute?
    pub fn allows(&self, name: &str, value: &str) -> bool {
        match self {
            ResolvedAttributes::Predicate(predicate) => predicate.call(name, value),
            ResolvedAttributes::List(names) => names.contains(&name),
        }
    }
}

/// Validated, read-only policy
#[derive(Debug, Clone)]
pub struct Policy {
    tags: HashSet<String>,
    wildcard: Vec<String>,
    rules: HashMap<String, AttributeRule>,
    protocols: HashSet<String>,
    css: CssSanitizer,
    uri_attributes: Vec<AttrName>,
    svg_ref_attributes: Vec<AttrName>,
    svg_local_href_elements: HashSet<String>,
    strip: bool,
    strip_comments: bool,
}

fn non_empty(names: &[String], field: &'static str) -> Result<(), ConfigError> {
    if names.iter().any(|n| n.is_empty()) {
        return Err(ConfigError::EmptyName { field });
    }
    Ok(())
}

fn attr_names(names: &[String], field: &'static str) -> Result<Vec<AttrName>, ConfigError> {
    non_empty(names, field)?;
    names
        .iter()
        .map(|qualified| {
            AttrName::parse(qualified).ok_or_else(|| ConfigError::UnknownNamespacePrefix {
                attribute: qualified.clone(),
            })
        })
        .collect()
}

impl Policy {
    /// Validate a configuration and compile it
    pub fn compile(config: SanitizerConfig) -> Result<Self, ConfigError> {
        non_empty(&config.tags, "tags")?;
        non_empty(&config.protocols, "protocols")?;
        non_empty(&config.styles, "styles")?;
        non_empty(&config.svg_styles, "svg_styles")?;
        non_empty(&config.svg_local_href_elements, "svg_local_href_elements")?;

        let (wildcard, rules) = match config.attributes {
            AllowedAttributes::List(list) => (list, HashMap::new()),
            AllowedAttributes::Map(mut map) => {
                let wildcard = match map.remove(WILDCARD) {
                    Some(AttributeRule::List(list)) => list,
                    Some(AttributeRule::Predicate(_)) => return Err(ConfigError::WildcardPredicate),
                    None => Vec::new(),
                };
                (wildcard, map)
            }
        };
        non_empty(&wildcard, "attributes")?;
        for rule in rules.values() {
            if let AttributeRule::List(list) = rule {
                non_empty(list, "attributes")?;
            }
        }

        let policy = Self {
            tags: config.tags.into_iter().collect(),
            wildcard,
            rules,
            protocols: config.protocols.iter().map(|p| p.to_lowercase()).collect(),
            css: CssSanitizer::new(&config.styles, &config.svg_styles),
            uri_attributes: attr_names(&config.uri_attributes, "uri_attributes")?,
            svg_ref_attributes: attr_names(&config.svg_ref_attributes, "svg_ref_attributes")?,
            svg_local_href_elements: config.svg_local_href_elements.into_iter().collect(),
            strip: config.strip,
            strip_comments: config.strip_comments,
        };

        tracing::debug!(
            tags = policy.tags.len(),
            element_rules = policy.rules.len(),
            wildcard = policy.wildcard.len(),
            protocols = policy.protocols.len(),
            strip = policy.strip,
            strip_comments = policy.strip_comments,
            "compiled sanitizer policy"
        );
        Ok(policy)
    }

    /// Resolve the attribute rule for an element.
    ///
    /// A predicate is returned as-is; a list (or no entry) is extended with
    /// the wildcard attributes.
    pub fn resolve(&self, element: &str) -> ResolvedAttributes<'_> {
        match self.rules.get(element) {
            Some(AttributeRule::Predicate(predicate)) => ResolvedAttributes::Predicate(predicate),
            Some(AttributeRule::List(list)) => ResolvedAttributes::List(
                list.iter().chain(&self.wildcard).map(String::as_str).collect(),
            ),
            None => ResolvedAttributes::List(self.wildcard.iter().map(String::as_str).collect()),
        }
    }

    pub fn allows_element(&self, name: &str) -> bool {
        self.tags.contains(name)
    }

    pub fn protocols(&self) -> &HashSet<String> {
        &self.protocols
    }

    pub fn css(&self) -> &CssSanitizer {
        &self.css
    }

    pub fn uri_attributes(&self) -> &[AttrName] {
        &self.uri_attributes
    }

    pub fn svg_ref_attributes(&self) -> &[AttrName] {
        &self.svg_ref_attributes
    }

    /// Must `href`/`xlink:href` on this element be a local reference?
    pub fn requires_local_href(&self, element: &str) -> bool {
        self.svg_local_href_elements.contains(element)
    }

    pub fn strip(&self) -> bool {
        self.strip
    }

    pub fn strip_comments(&self) -> bool {
        self.strip_comments
    }
}
