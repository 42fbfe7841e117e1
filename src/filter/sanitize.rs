//! Free-text normalization applied before storage and before comparing
//! against stored text.

/// Trim, strip markup tags (trimming again what they leave behind), then
/// escape HTML-significant characters.
pub fn sanitize(raw: &str) -> String {
    escape_html(strip_tags(raw.trim()).trim())
}

/// Remove `<...>` tag sequences. A `<` only opens a tag when the next
/// character is a letter, `/`, `!` or `?`; otherwise it is kept as text.
/// An unterminated tag swallows the rest of the input.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '<' {
            out.push(c);
            continue;
        }

        let opens_tag = matches!(chars.peek(), Some(n) if n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?'));
        if !opens_tag {
            out.push(c);
            continue;
        }

        for n in chars.by_ref() {
            if n == '>' {
                break;
            }
        }
    }

    out
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Escape LIKE wildcards so the term matches literally (backslash is the
/// default escape character in Postgres).
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_strips_and_escapes() {
        assert_eq!(sanitize("  <b>Intro</b> to \"HTML\" & CSS  "), "Intro to &quot;HTML&quot; &amp; CSS");
        assert_eq!(sanitize("O'Brien"), "O&#039;Brien");
    }

    #[test]
    fn strips_script_tags_but_keeps_their_text() {
        assert_eq!(strip_tags("<script>alert(1)</script>"), "alert(1)");
        assert_eq!(strip_tags("a<!-- note -->b"), "ab");
    }

    #[test]
    fn lone_angle_brackets_are_text() {
        assert_eq!(sanitize("1 < 2 > 0"), "1 &lt; 2 &gt; 0");
    }

    #[test]
    fn unterminated_tag_drops_remainder() {
        assert_eq!(strip_tags("safe <img src=x onerror=y"), "safe ");
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(sanitize("   \t\n"), "");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
