//! Tree walker
//!
//! Turns a parsed RcDom into a lazy token stream. Uses an explicit stack so
//! deeply nested input cannot overflow the call stack.

use html5ever::QualName;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::token::{AttrName, Attribute, Tag, Token, HTML_NAMESPACE};

/// Void elements (no content, no end tag)
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

enum Frame {
    Node(Handle),
    Close(Tag),
}

/// Lazy pre-order walk over a parsed tree
pub struct TreeWalker {
    stack: Vec<Frame>,
}

fn namespace(ns: &str) -> Option<String> {
    if ns.is_empty() {
        None
    } else {
        Some(ns.to_string())
    }
}

impl TreeWalker {
    /// Walk the children of `node`
    pub fn new(node: &Handle) -> Self {
        let mut walker = Self { stack: Vec::new() };
        walker.push_children(node);
        walker
    }

    /// Walk the content of a parsed fragment (children of its `html` root)
    pub fn fragment(dom: &RcDom) -> Self {
        let root = dom.document.children.borrow().first().cloned();
        match root {
            Some(root) => Self::new(&root),
            None => Self { stack: Vec::new() },
        }
    }

    fn push_children(&mut self, node: &Handle) {
        let children = node.children.borrow();
        self.stack.extend(children.iter().rev().cloned().map(Frame::Node));
    }

    fn element(&mut self, node: &Handle, name: &QualName, attrs: &[html5ever::Attribute]) -> Token {
        let tag = Tag {
            namespace: namespace(&name.ns),
            name: name.local.to_string(),
            attrs: attrs
                .iter()
                .map(|attr| {
                    let name = AttrName {
                        namespace: namespace(&attr.name.ns),
                        local: attr.name.local.to_string(),
                    };
                    Attribute::new(name, attr.value.to_string())
                })
                .collect(),
        };

        let is_void = &*name.ns == HTML_NAMESPACE && VOID_ELEMENTS.contains(&&*name.local);
        if is_void {
            return Token::EmptyTag(tag);
        }

        self.stack.push(Frame::Close(Tag {
            namespace: tag.namespace.clone(),
            name: tag.name.clone(),
            attrs: Vec::new(),
        }));
        self.push_children(node);
        Token::StartTag(tag)
    }
}

impl Iterator for TreeWalker {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let node = match self.stack.pop()? {
                Frame::Close(tag) => return Some(Token::EndTag(tag)),
                Frame::Node(node) => node,
            };

            match &node.data {
                NodeData::Element { name, attrs, template_contents, .. } => {
                    // template content lives outside the regular children
                    let content = template_contents.borrow().clone().unwrap_or_else(|| node.clone());
                    return Some(self.element(&content, name, &attrs.borrow()));
                }
                NodeData::Text { contents } => {
                    return Some(Token::Characters(contents.borrow().to_string()));
                }
                NodeData::Comment { contents } => return Some(Token::Comment(contents.to_string())),
                NodeData::Doctype { name, public_id, system_id } => {
                    return Some(Token::Doctype {
                        name: name.to_string(),
                        public_id: public_id.to_string(),
                        system_id: system_id.to_string(),
                    });
                }
                NodeData::Document => self.push_children(&node),
                NodeData::ProcessingInstruction { .. } => {}
            }
        }
    }
}
