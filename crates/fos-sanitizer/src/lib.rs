//! fOS HTML Sanitizer
//!
//! Allow-list HTML sanitizer built on html5ever. Untrusted markup is parsed
//! into a tree, walked as a token stream, filtered, and serialized again:
//!
//! ```text
//! html5ever -> TreeWalker -> SanitizerFilter -> HtmlSerializer
//! ```
//!
//! Only allowed elements, attributes, URL protocols and CSS declarations
//! survive. Everything else is escaped into inert text or dropped.
//!
//! ```rust
//! let sanitizer = fos_sanitizer::Sanitizer::builder()
//!     .tags(["p", "a"])
//!     .build()
//!     .unwrap();
//! assert_eq!(
//!     sanitizer.clean(r#"<p><a href="javascript:alert(1)">x</a></p>"#),
//!     "<p><a>x</a></p>"
//! );
//! ```

pub mod config;
pub mod css;
pub mod escape;
pub mod filter;
pub mod parser;
pub mod policy;
pub mod protocol;
pub mod serializer;
pub mod token;
pub mod walker;

use std::sync::{Arc, OnceLock};

pub use config::{
    AllowedAttributes, AttributePredicate, AttributeRule, ConfigError, SanitizerBuilder,
    SanitizerConfig,
};
pub use filter::SanitizerFilter;
pub use parser::HtmlParser;
pub use policy::{Policy, ResolvedAttributes};
pub use serializer::HtmlSerializer;
pub use token::{AttrName, Attribute, Tag, Token};
pub use walker::TreeWalker;

/// Configured HTML sanitizer
///
/// Holds an immutable policy; clones share it and may be used from several
/// threads at once.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    policy: Arc<Policy>,
}

impl Sanitizer {
    /// Validate `config` and build a sanitizer
    pub fn new(config: SanitizerConfig) -> Result<Self, ConfigError> {
        Ok(Self { policy: Arc::new(Policy::compile(config)?) })
    }

    pub fn builder() -> SanitizerBuilder {
        SanitizerBuilder::new()
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Lazily sanitize a token stream
    pub fn filter<I>(&self, tokens: I) -> SanitizerFilter<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Token>,
    {
        SanitizerFilter::new(tokens.into_iter(), &self.policy)
    }

    /// Sanitize an HTML fragment
    pub fn clean(&self, html: &str) -> String {
        if html.is_empty() {
            return String::new();
        }

        let dom = HtmlParser::new().parse_fragment(html);
        let tokens = TreeWalker::fragment(&dom);
        HtmlSerializer::new().serialize(self.filter(tokens))
    }
}

impl Default for Sanitizer {
    /// Sanitizer with the default configuration
    ///
    /// # Panics
    ///
    /// Panics if the built-in defaults fail validation (they never do).
    fn default() -> Self {
        Self::new(SanitizerConfig::default()).expect("default configuration must be valid")
    }
}

/// Sanitize an HTML fragment with the default configuration
pub fn clean(html: &str) -> String {
    static DEFAULT: OnceLock<Sanitizer> = OnceLock::new();
    DEFAULT.get_or_init(Sanitizer::default).clean(html)
}
