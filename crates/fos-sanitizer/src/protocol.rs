//! URI protocol validation
//!
//! Decides whether a URI-valued attribute carries an allowed scheme. Values
//! without a detectable scheme are relative and always allowed.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::escape::unescape;

fn scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([a-z0-9][-+.a-z0-9]*):").expect("scheme pattern must compile")
    })
}

/// Characters removed before scheme detection: backtick, C0 controls and
/// space, DEL through NBSP, any other whitespace, and U+FFFD.
fn is_ignored(c: char) -> bool {
    matches!(c, '`' | '\u{0}'..='\u{20}' | '\u{7f}'..='\u{a0}' | '\u{fffd}') || c.is_whitespace()
}

/// Normalize a raw attribute value for scheme detection
pub fn normalize(value: &str) -> String {
    unescape(value)
        .chars()
        .filter(|&c| !is_ignored(c))
        .collect::<String>()
        .to_lowercase()
}

/// Extract the (lower-cased) scheme of a raw attribute value, if any
pub fn scheme(value: &str) -> Option<String> {
    let normalized = normalize(value);
    scheme_regex()
        .captures(&normalized)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check a raw URI value against the allowed protocols.
///
/// `protocols` must hold lower-cased scheme names.
pub fn is_allowed_uri(value: &str, protocols: &HashSet<String>) -> bool {
    match scheme(value) {
        Some(scheme) => protocols.contains(&scheme),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocols(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scheme_detection() {
        assert_eq!(scheme("http://example.com"), Some("http".to_string()));
        assert_eq!(scheme("HTTPS://example.com"), Some("https".to_string()));
        assert_eq!(scheme("svn+ssh://host/repo"), Some("svn+ssh".to_string()));
        assert_eq!(scheme("/relative/path"), None);
        assert_eq!(scheme("#fragment"), None);
        assert_eq!(scheme("page.html?a=b:c"), None);
    }

    #[test]
    fn test_relative_always_allowed() {
        let allowed = protocols(&["http"]);
        assert!(is_allowed_uri("foo/bar.html", &allowed));
        assert!(is_allowed_uri("", &allowed));
        assert!(is_allowed_uri("//example.com/x", &allowed));
    }

    #[test]
    fn test_disallowed_scheme() {
        let allowed = protocols(&["http", "https", "mailto"]);
        assert!(!is_allowed_uri("javascript:alert(1)", &allowed));
        assert!(!is_allowed_uri("vbscript:msgbox", &allowed));
        assert!(!is_allowed_uri("data:text/html,<b>x</b>", &allowed));
        assert!(is_allowed_uri("mailto:someone@example.com", &allowed));
    }

    #[test]
    fn test_disguised_schemes() {
        let allowed = protocols(&["http", "https"]);
        assert!(!is_allowed_uri("java\tscript:alert(1)", &allowed));
        assert!(!is_allowed_uri("java\nscript:alert(1)", &allowed));
        assert!(!is_allowed_uri(" \u{1}javascript:alert(1)", &allowed));
        assert!(!is_allowed_uri("JaVaScRiPt:alert(1)", &allowed));
        assert!(!is_allowed_uri("java\u{fffd}script:alert(1)", &allowed));
        assert!(!is_allowed_uri("`javascript:alert(1)", &allowed));
    }

    #[test]
    fn test_escaped_value_is_unescaped() {
        let allowed = protocols(&["http"]);
        assert_eq!(scheme("&lt;script&gt;:x"), None);
        // `&amp;` decodes to `&`, which cannot be part of a scheme
        assert_eq!(scheme("ftp&amp;x:y"), None);
        assert!(is_allowed_uri("ftp&amp;x:y", &allowed));
    }

    #[test]
    fn test_custom_protocol() {
        let allowed = protocols(&["myprotocol"]);
        assert!(is_allowed_uri("myprotocol://more_text", &allowed));
        assert!(!is_allowed_uri("http://xx.com", &allowed));
    }
}
