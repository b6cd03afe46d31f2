//! Token stream tests for fos-sanitizer
//!
//! Feed hand-built token streams through `Sanitizer::filter`.

use fos_sanitizer::token::{SVG_NAMESPACE, XLINK_NAMESPACE};
use fos_sanitizer::{AttrName, Sanitizer, Tag, Token};

fn run(sanitizer: &Sanitizer, tokens: Vec<Token>) -> Vec<Token> {
    sanitizer.filter(tokens).collect()
}

#[test]
fn test_plain_tokens_pass_through() {
    let sanitizer = Sanitizer::default();
    let doctype = Token::Doctype {
        name: "html".into(),
        public_id: String::new(),
        system_id: String::new(),
    };
    let tokens = vec![doctype.clone(), Token::characters("a < b")];
    assert_eq!(run(&sanitizer, tokens), vec![doctype, Token::characters("a < b")]);
}

#[test]
fn test_allowed_tag_attributes_sorted() {
    let sanitizer = Sanitizer::default();
    let tag = Tag::new("a").with_attr("title", "t").with_attr("href", "https://e.com");
    let out = run(&sanitizer, vec![Token::StartTag(tag)]);
    assert_eq!(
        out,
        vec![Token::StartTag(Tag::new("a").with_attr("href", "https://e.com").with_attr("title", "t"))]
    );
}

#[test]
fn test_allowed_end_tag() {
    let sanitizer = Sanitizer::default();
    let out = run(&sanitizer, vec![Token::EndTag(Tag::new("em"))]);
    assert_eq!(out, vec![Token::EndTag(Tag::new("em"))]);
}

#[test]
fn test_disallowed_tags_become_text() {
    let sanitizer = Sanitizer::default();
    let start = Tag::new("div").with_attr("id", "x").with_attr("class", "a&b");
    let out = run(
        &sanitizer,
        vec![
            Token::StartTag(start),
            Token::EmptyTag(Tag::new("img").with_attr("src", "<x>")),
            Token::EndTag(Tag::new("div")),
        ],
    );
    assert_eq!(
        out,
        vec![
            Token::characters(r#"<div class="a&amp;b" id="x">"#),
            Token::characters(r#"<img src="&lt;x&gt;">"#),
            Token::characters("</div>"),
        ]
    );
}

#[test]
fn test_disallowed_markup_is_stable() {
    let sanitizer = Sanitizer::default();
    let tag = Tag::new("span").with_attr("b", "2").with_attr("a", "1");
    let first = run(&sanitizer, vec![Token::StartTag(tag.clone())]);
    let second = run(&sanitizer, vec![Token::StartTag(tag)]);
    assert_eq!(first, second);
    assert_eq!(first, vec![Token::characters(r#"<span a="1" b="2">"#)]);
}

#[test]
fn test_strip_mode_drops_tags() {
    let sanitizer = Sanitizer::builder().strip(true).build().unwrap();
    let out = run(
        &sanitizer,
        vec![
            Token::StartTag(Tag::new("div")),
            Token::characters("text"),
            Token::EndTag(Tag::new("div")),
        ],
    );
    assert_eq!(out, vec![Token::characters("text")]);
}

#[test]
fn test_comments() {
    let tokens = vec![Token::comment(" c "), Token::characters("x")];

    let default = Sanitizer::default();
    assert_eq!(run(&default, tokens.clone()), vec![Token::characters("x")]);

    let keep = Sanitizer::builder().strip_comments(false).build().unwrap();
    assert_eq!(run(&keep, tokens.clone()), tokens);
}

#[test]
fn test_predicate_sees_every_attribute() {
    let sanitizer = Sanitizer::builder()
        .tags(["img"])
        .attribute_filter("img", |name, value| name == "alt" && !value.is_empty())
        .build()
        .unwrap();
    let tag = Tag::new("img").with_attr("alt", "x").with_attr("src", "https://e.com").with_attr("title", "");
    let out = run(&sanitizer, vec![Token::EmptyTag(tag)]);
    assert_eq!(out, vec![Token::EmptyTag(Tag::new("img").with_attr("alt", "x"))]);
}

#[test]
fn test_disallowed_protocol_removed() {
    let sanitizer = Sanitizer::default();
    let tag = Tag::new("a").with_attr("href", "vbscript:msgbox(1)").with_attr("title", "t");
    let out = run(&sanitizer, vec![Token::StartTag(tag)]);
    assert_eq!(out, vec![Token::StartTag(Tag::new("a").with_attr("title", "t"))]);
}

#[test]
fn test_svg_ref_keeps_remaining_value() {
    let sanitizer = Sanitizer::builder()
        .tags(["rect"])
        .allow_attributes("rect", ["stroke", "fill"])
        .build()
        .unwrap();
    let tag = Tag::new("rect")
        .in_namespace(SVG_NAMESPACE)
        .with_attr("stroke", "url(http://evil.example/x) red")
        .with_attr("fill", "url(#grad)");
    let out = run(&sanitizer, vec![Token::EmptyTag(tag)]);
    let expected = Tag::new("rect")
        .in_namespace(SVG_NAMESPACE)
        .with_attr("fill", "url(#grad)")
        .with_attr("stroke", "red");
    assert_eq!(out, vec![Token::EmptyTag(expected)]);
}

#[test]
fn test_xlink_href_must_be_local() {
    let sanitizer = Sanitizer::builder()
        .tags(["use"])
        .allow_attributes("use", ["href"])
        .build()
        .unwrap();
    let xlink = AttrName::with_namespace(XLINK_NAMESPACE, "href");

    let mut remote = Tag::new("use").in_namespace(SVG_NAMESPACE);
    remote.set_attr(xlink.clone(), "https://e.com/sprite.svg#icon");
    let out = run(&sanitizer, vec![Token::EmptyTag(remote)]);
    assert_eq!(out, vec![Token::EmptyTag(Tag::new("use").in_namespace(SVG_NAMESPACE))]);

    let mut local = Tag::new("use").in_namespace(SVG_NAMESPACE);
    local.set_attr(xlink.clone(), "#icon");
    let out = run(&sanitizer, vec![Token::EmptyTag(local.clone())]);
    assert_eq!(out, vec![Token::EmptyTag(local)]);
}

#[test]
fn test_style_is_rewritten_not_dropped() {
    let sanitizer = Sanitizer::builder()
        .tags(["p"])
        .allow_attributes("p", ["style"])
        .styles(["color"])
        .build()
        .unwrap();
    let tag = Tag::new("p").with_attr("style", "color: red; position: fixed");
    let out = run(&sanitizer, vec![Token::StartTag(tag)]);
    assert_eq!(out, vec![Token::StartTag(Tag::new("p").with_attr("style", "color: red;"))]);

    let bad = Tag::new("p").with_attr("style", "color: red; x: expression(1+1)");
    let out = run(&sanitizer, vec![Token::StartTag(bad)]);
    assert_eq!(out, vec![Token::StartTag(Tag::new("p").with_attr("style", ""))]);
}

#[test]
fn test_output_only_contains_allowed_elements() {
    let sanitizer = Sanitizer::builder().tags(["b"]).build().unwrap();
    let tokens = vec![
        Token::StartTag(Tag::new("b")),
        Token::StartTag(Tag::new("i")),
        Token::EmptyTag(Tag::new("br")),
        Token::EndTag(Tag::new("i")),
        Token::EndTag(Tag::new("b")),
    ];
    for token in run(&sanitizer, tokens) {
        if let Some(tag) = token.tag() {
            assert_eq!(tag.name, "b");
        }
    }
}
