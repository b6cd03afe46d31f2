//! Entity escaping helpers

/// Escape text content for HTML (`&`, `<`, `>`)
pub fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Escape a double-quoted attribute value (`&`, `"`)
pub fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            _ => output.push(c),
        }
    }
}

/// Undo the basic entity escapes (`&lt;`, `&gt;`, `&amp;`).
///
/// `&amp;` is resolved last so `&amp;lt;` becomes `&lt;`, not `<`.
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}
