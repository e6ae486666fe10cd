//! HTML helpers

/// Escape text for use in HTML content and attribute values
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text and turn newlines into `<br />`
pub fn escape_multiline(s: &str) -> String {
    s.lines().map(escape).collect::<Vec<_>>().join("<br />\n")
}

/// Join CSS classes, skipping empty parts
pub fn classes(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<script>"), "&lt;script&gt;");
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape(r#"say "hello""#), "say &quot;hello&quot;");
        assert_eq!(escape("it's"), "it&#039;s");
    }

    #[test]
    fn test_escape_multiline() {
        assert_eq!(escape_multiline("a\n<b>"), "a<br />\n&lt;b&gt;");
    }

    #[test]
    fn test_classes() {
        assert_eq!(classes(&["gfpdf-text", "", " gfpdf-field "]), "gfpdf-text gfpdf-field");
    }
}
