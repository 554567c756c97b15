//! LaTeX escaping for literal text.

use std::borrow::Cow;

/// Replacement for one of the ten characters reserved in LaTeX prose.
fn replacement(c: char) -> Option<&'static str> {
    let escaped = match c {
        '\\' => r"\textbackslash{}",
        '{' => r"\{",
        '}' => r"\}",
        '$' => r"\$",
        '&' => r"\&",
        '#' => r"\#",
        '^' => r"\^{}",
        '_' => r"\_",
        '~' => r"\~{}",
        '%' => r"\%",
        _ => return None,
    };
    Some(escaped)
}

fn is_reserved(c: char) -> bool {
    replacement(c).is_some()
}

/// Escape the ten LaTeX reserved characters in `text`.
///
/// A reserved character that is already preceded by a backslash is left as
/// it is, together with its backslash. The input is scanned once and the
/// output is never rescanned.
///
/// Returns the input unchanged (borrowed) when it contains no reserved
/// characters.
///
/// # Examples
///
/// ```
/// use mdtex_renderer::escape_latex;
///
/// assert_eq!(escape_latex("plain text"), "plain text");
/// assert_eq!(escape_latex("50% of $x_1$"), r"50\% of \$x\_1\$");
/// assert_eq!(escape_latex(r"already \& escaped"), r"already \& escaped");
/// ```
pub fn escape_latex(text: &str) -> Cow<'_, str> {
    if !text.contains(is_reserved) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + text.len() / 4);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(&next) if next != '\\' && is_reserved(next) => {
                    out.push('\\');
                    out.push(next);
                    chars.next();
                }
                _ => out.push_str(r"\textbackslash{}"),
            }
        } else if let Some(escaped) = replacement(c) {
            out.push_str(escaped);
        } else {
            out.push(c);
        }
    }

    Cow::Owned(out)
}

/// Escape a URL for use as the first argument of `\href`.
///
/// Only `%` and `#` need escaping there; everything else is read verbatim by
/// hyperref.
pub fn escape_url(url: &str) -> Cow<'_, str> {
    if !url.contains(['%', '#']) {
        return Cow::Borrowed(url);
    }
    let mut out = String::with_capacity(url.len() + 4);
    let mut prev_backslash = false;
    for c in url.chars() {
        if matches!(c, '%' | '#') && !prev_backslash {
            out.push('\\');
        }
        prev_backslash = c == '\\';
        out.push(c);
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_reserved_characters_is_identity() {
        let text = "The quick brown fox, (jumps) over 3 lazy dogs! <ok> \"yes\"";
        assert!(matches!(escape_latex(text), Cow::Borrowed(_)));
        assert_eq!(escape_latex(text), text);
    }

    #[test]
    fn test_each_reserved_character() {
        assert_eq!(escape_latex("{"), r"\{");
        assert_eq!(escape_latex("}"), r"\}");
        assert_eq!(escape_latex("$"), r"\$");
        assert_eq!(escape_latex("&"), r"\&");
        assert_eq!(escape_latex("#"), r"\#");
        assert_eq!(escape_latex("^"), r"\^{}");
        assert_eq!(escape_latex("_"), r"\_");
        assert_eq!(escape_latex("~"), r"\~{}");
        assert_eq!(escape_latex("%"), r"\%");
        assert_eq!(escape_latex("\\"), r"\textbackslash{}");
    }

    #[test]
    fn test_mixed_text() {
        assert_eq!(
            escape_latex("a_b & c^2 ~ 100%"),
            r"a\_b \& c\^{}2 \~{} 100\%"
        );
    }

    #[test]
    fn test_already_escaped_is_kept() {
        assert_eq!(escape_latex(r"\$5 and \%"), r"\$5 and \%");
        assert_eq!(escape_latex(r"\{x\}"), r"\{x\}");
    }

    #[test]
    fn test_lone_backslash() {
        assert_eq!(escape_latex(r"C:\path"), r"C:\textbackslash{}path");
        assert_eq!(escape_latex("end\\"), r"end\textbackslash{}");
    }

    #[test]
    fn test_double_backslash_is_two_backslashes() {
        assert_eq!(
            escape_latex(r"a\\b"),
            r"a\textbackslash{}\textbackslash{}b"
        );
    }

    #[test]
    fn test_escaped_output_has_no_line_break_marker() {
        let out = escape_latex(r"\\ \\{ }");
        assert!(!out.contains(r"\\"), "{out}");
    }

    #[test]
    fn test_unicode_passes_through() {
        assert_eq!(escape_latex("naïve café — ∑"), "naïve café — ∑");
        assert_eq!(escape_latex("ü_ß"), r"ü\_ß");
    }

    #[test]
    fn test_escape_url() {
        assert_eq!(escape_url("https://example.com/a_b"), "https://example.com/a_b");
        assert_eq!(
            escape_url("https://example.com/p%20q#frag"),
            r"https://example.com/p\%20q\#frag"
        );
        assert_eq!(escape_url(r"https://x.org/\#y"), r"https://x.org/\#y");
    }
}
