//! Inline CSS validation
//!
//! Cleans the value of a `style` attribute. The validator is deliberately
//! conservative: any declaration containing something outside a small
//! character gauntlet rejects the whole value, and `url()` is never allowed.
//! Unknown properties are dropped one by one.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)url\s*\(\s*[^\s)]+?\s*\)\s*").expect("url pattern must compile"))
}

fn gauntlet_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^([-/:,#%.'"\sa-zA-Z0-9!]|\w-\w|'[\s\w]+'\s*|"[\s\w]+"|\([\d,%\.\s]+\))*$"#,
        )
        .expect("gauntlet pattern must compile")
    })
}

fn grammar_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([-\w]+\s*:[^:;]*(;\s*|$))*$").expect("grammar pattern must compile")
    })
}

fn declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([-\w]+)\s*:\s*([^:;]*)").expect("declaration pattern must compile")
    })
}

/// Every `'` and `"` in a declaration must be paired
fn quotes_balanced(declaration: &str) -> bool {
    declaration.matches('\'').count() % 2 == 0 && declaration.matches('"').count() % 2 == 0
}

/// Allow-list based `style` attribute cleaner
#[derive(Debug, Clone, Default)]
pub struct CssSanitizer {
    properties: HashSet<String>,
    svg_properties: HashSet<String>,
}

impl CssSanitizer {
    /// Create a cleaner from generic and SVG property allow-lists
    pub fn new<I, J, S, T>(properties: I, svg_properties: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            properties: properties.into_iter().map(|p| p.as_ref().to_lowercase()).collect(),
            svg_properties: svg_properties.into_iter().map(|p| p.as_ref().to_lowercase()).collect(),
        }
    }

    /// Is the (lower-cased) property name allowed?
    pub fn allows(&self, property: &str) -> bool {
        let property = property.to_lowercase();
        self.properties.contains(&property) || self.svg_properties.contains(&property)
    }

    /// Clean a raw `style` value.
    ///
    /// Returns `prop: value;` declarations joined by a single space, or an
    /// empty string when the value does not pass validation.
    pub fn sanitize(&self, style: &str) -> String {
        let style = url_regex().replace_all(style, " ");

        if !style.split(';').all(|part| gauntlet_regex().is_match(part) && quotes_balanced(part)) {
            return String::new();
        }

        if !grammar_regex().is_match(&style) {
            return String::new();
        }

        let mut clean = Vec::new();
        for caps in declaration_regex().captures_iter(&style) {
            let (Some(property), Some(value)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let value = value.as_str();
            if value.is_empty() {
                continue;
            }
            if self.allows(property.as_str()) {
                clean.push(format!("{}: {};", property.as_str(), value));
            }
        }

        clean.join(" ")
    }
}
