//! XML entity escaping for text and attribute values.

use std::borrow::Cow;

fn needs_escape(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"' | '\'')
}

/// Escape the five predefined XML entities.
///
/// Borrows the input unchanged when nothing needs escaping.
pub fn escape_xml(input: &str) -> Cow<'_, str> {
    if !input.contains(needs_escape) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("<blink>", "&lt;blink&gt;")]
    #[case("a & b", "a &amp; b")]
    #[case(r#"say "hi" it's"#, "say &quot;hi&quot; it&apos;s")]
    #[case("&amp;", "&amp;amp;")]
    #[case("", "")]
    fn escapes_entities(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_xml(input), expected);
    }

    #[rstest]
    fn borrows_when_clean() {
        assert!(matches!(escape_xml("clean text"), Cow::Borrowed(_)));
    }
}
