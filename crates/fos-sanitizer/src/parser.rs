//! HTML fragment parsing
//!
//! Uses html5ever's fragment parser with the built-in RcDom. Tokenizing and
//! tree construction (implied end tags, foreign content, attribute case
//! adjustment) all happen here, before any sanitizing.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_fragment, LocalName, Namespace, ParseOpts, QualName};
use markup5ever_rcdom::RcDom;

use crate::token::HTML_NAMESPACE;

/// HTML fragment parser
#[derive(Debug, Clone)]
pub struct HtmlParser {
    context: String,
}

impl HtmlParser {
    /// Parser for fragments found inside `<body>`
    pub fn new() -> Self {
        Self::with_context("body")
    }

    /// Parser for fragments found inside the given HTML element
    pub fn with_context(context: &str) -> Self {
        Self { context: context.to_string() }
    }

    /// Parse an HTML fragment; never fails, errors are recovered from
    pub fn parse_fragment(&self, html: &str) -> RcDom {
        let context = QualName::new(
            None,
            Namespace::from(HTML_NAMESPACE),
            LocalName::from(self.context.as_str()),
        );

        let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new(), false)
            .one(html);

        let errors = dom.errors.borrow();
        if !errors.is_empty() {
            tracing::trace!(count = errors.len(), first = %errors[0], "recovered from HTML parse errors");
        }
        drop(errors);

        dom
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}
