//! HTML escaping for tagged values.

use std::borrow::Cow;

/// Escape `&`, `"`, `'`, `<` and `>` for use in HTML text and attributes.
///
/// Returns the input unchanged (borrowed) when nothing needs escaping.
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '"', '\'', '<', '>']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
