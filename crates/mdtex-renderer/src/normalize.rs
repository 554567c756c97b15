//! Line break and blank line normalization of rendered LaTeX.
//!
//! Rendering concatenates fragments that each carry their own trailing breaks,
//! which leaves runs LaTeX rejects (`\\` with no line to end) or renders badly.
//! The normalizer works on a token stream rather than on raw text so that
//! verbatim and math regions pass through untouched.

use std::fmt;

use crate::error::RenderError;

/// Upper bound on normalization passes before giving up.
pub const MAX_PASSES: usize = 32;

const VERBATIM_BEGIN: &str = "\\begin{verbatim}";
const VERBATIM_END: &str = "\\end{verbatim}";

/// Commands that start a new vertical block.
const SECTIONING: [&str; 5] = [
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

/// LaTeX body that has been through [`normalize`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizedBody(String);

impl NormalizedBody {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedBody {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize line breaks and blank lines until the text stops changing.
///
/// Each pass:
/// - merges two forced breaks separated only by whitespace into one `\newline`;
/// - drops a forced break that directly follows a sectioning command, `\par`,
///   an `\end{...}` or the start of the document;
/// - collapses any whitespace run holding two or more newlines into exactly
///   one blank line, keeping the indentation of the following line;
/// - trims leading and trailing whitespace.
///
/// Verbatim regions and math (`\[...\]`, `$$...$$`, `$...$`) are never
/// modified. Applying `normalize` to its own output
/// returns it unchanged.
///
/// # Errors
///
/// Returns [`RenderError::NormalizeDiverged`] if no fixed point is reached
/// within [`MAX_PASSES`] passes.
pub fn normalize(latex: &str) -> Result<NormalizedBody, RenderError> {
    let mut current = latex.to_owned();
    for passes in 1..=MAX_PASSES {
        let next = pass(&current);
        if next == current {
            tracing::debug!(passes, len = current.len(), "Normalized LaTeX body");
            return Ok(NormalizedBody(current));
        }
        current = next;
    }
    Err(RenderError::NormalizeDiverged { passes: MAX_PASSES })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    /// `\begin{verbatim}` through `\end{verbatim}`, or to end of input.
    Verbatim(&'a str),
    /// `\[...\]` or `$$...$$`.
    DisplayMath(&'a str),
    /// `$...$`.
    InlineMath(&'a str),
    /// `\\` or `\newline`.
    Break(&'a str),
    /// Sectioning command with its argument, `\par` or `\end{...}`.
    Vertical(&'a str),
    Newline,
    /// Spaces, tabs and carriage returns.
    Space(&'a str),
    Text(&'a str),
}

impl<'a> Token<'a> {
    fn as_str(&self) -> &'a str {
        match self {
            Self::Newline => "\n",
            Self::Verbatim(s)
            | Self::DisplayMath(s)
            | Self::InlineMath(s)
            | Self::Break(s)
            | Self::Vertical(s)
            | Self::Space(s)
            | Self::Text(s) => s,
        }
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, Self::Newline | Self::Space(_))
    }

    fn is_vertical(&self) -> bool {
        matches!(self, Self::Vertical(_) | Self::Verbatim(_) | Self::DisplayMath(_))
    }
}

fn pass(input: &str) -> String {
    let tokens = tokenize(input);
    let merged = merge_breaks(&tokens);
    collapse_blank_lines(&merged)
        .iter()
        .map(Token::as_str)
        .collect()
}

/// Split `input` into tokens whose concatenation is `input`.
fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < input.len() {
        let rest = &input[pos..];
        let (token, len) = if let Some(found) = math_at(rest).or_else(|| command_at(rest)) {
            found
        } else if rest.starts_with('\n') {
            (Token::Newline, 1)
        } else if rest.starts_with(is_space) {
            let len = rest.find(|c: char| !is_space(c)).unwrap_or(rest.len());
            (Token::Space(&rest[..len]), len)
        } else {
            let len = text_len(rest);
            (Token::Text(&rest[..len]), len)
        };
        tokens.push(token);
        pos += len;
    }
    tokens
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

/// Recognize a structural command at the start of `rest`.
fn command_at(rest: &str) -> Option<(Token<'_>, usize)> {
    if !rest.starts_with('\\') {
        return None;
    }
    if let Some(body) = rest.strip_prefix(VERBATIM_BEGIN) {
        let len = body
            .find(VERBATIM_END)
            .map_or(rest.len(), |i| VERBATIM_BEGIN.len() + i + VERBATIM_END.len());
        return Some((Token::Verbatim(&rest[..len]), len));
    }
    if rest.starts_with("\\\\") {
        return Some((Token::Break(&rest[..2]), 2));
    }

    let name_len = rest[1..]
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len() - 1);
    let name = &rest[1..=name_len];
    let after = 1 + name_len;

    match name {
        "newline" => Some((Token::Break(&rest[..after]), after)),
        "par" => Some((Token::Vertical(&rest[..after]), after)),
        "end" => {
            let len = after + braced_len(&rest[after..])?;
            Some((Token::Vertical(&rest[..len]), len))
        }
        _ if SECTIONING.contains(&name) => {
            let star = usize::from(rest[after..].starts_with('*'));
            let len = after + star + braced_len(&rest[after + star..])?;
            Some((Token::Vertical(&rest[..len]), len))
        }
        _ => None,
    }
}

/// Length of the brace-balanced group at the start of `s`.
fn braced_len(s: &str) -> Option<usize> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Length of the plain text run at the start of `rest`.
///
/// A backslash takes the following character with it, so escapes such as
/// `\%` stay in one token.
fn text_len(rest: &str) -> usize {
    let mut len = 0;
    while len < rest.len() {
        let tail = &rest[len..];
        let mut chars = tail.chars();
        let Some(c) = chars.next() else { break };
        if c == '\n' || is_space(c) {
            break;
        }
        if c == '\\' {
            if len > 0 && (command_at(tail).is_some() || math_at(tail).is_some()) {
                break;
            }
            len += 1;
            if let Some(next) = chars.next()
                && next != '\n'
                && !is_space(next)
            {
                len += next.len_utf8();
            }
        } else if c == '$' && len > 0 && math_at(tail).is_some() {
            break;
        } else {
            len += c.len_utf8();
        }
    }
    len
}

/// Recognize a closed math region at the start of `rest`.
///
/// An unclosed delimiter is not a region and stays in the surrounding text.
fn math_at(rest: &str) -> Option<(Token<'_>, usize)> {
    let (delimiter, display) = if rest.starts_with("\\[") {
        ("\\]", true)
    } else if rest.starts_with("$$") {
        ("$$", true)
    } else if rest.starts_with('$') {
        ("$", false)
    } else {
        return None;
    };
    let open = delimiter.len();
    let len = open + closing_at(&rest[open..], delimiter)? + delimiter.len();
    let region = &rest[..len];
    let token = if display {
        Token::DisplayMath(region)
    } else {
        Token::InlineMath(region)
    };
    Some((token, len))
}

/// Offset of the first unescaped `delimiter` in `s`.
fn closing_at(s: &str, delimiter: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if s[i..].starts_with(delimiter) {
            return Some(i);
        }
        escaped = c == '\\';
    }
    None
}

fn merge_breaks<'a>(tokens: &[Token<'a>]) -> Vec<Token<'a>> {
    let mut out: Vec<Token<'a>> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let mut token = tokens[i];
        i += 1;
        if !matches!(token, Token::Break(_)) {
            out.push(token);
            continue;
        }

        let next = i + tokens[i..].iter().take_while(|t| t.is_whitespace()).count();
        if matches!(tokens.get(next), Some(Token::Break(_))) {
            i = next + 1;
            let letter_follows = matches!(
                tokens.get(i),
                Some(Token::Text(t)) if t.starts_with(|c: char| c.is_ascii_alphabetic())
            );
            token = Token::Break(if letter_follows { "\\newline " } else { "\\newline" });
        }

        let leads_block = out
            .iter()
            .rev()
            .find(|t| !t.is_whitespace())
            .is_none_or(Token::is_vertical);
        if !leads_block {
            out.push(token);
        }
    }
    out
}

fn collapse_blank_lines<'a>(tokens: &[Token<'a>]) -> Vec<Token<'a>> {
    let start = tokens
        .iter()
        .position(|t| !t.is_whitespace())
        .unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|t| !t.is_whitespace())
        .map_or(start, |i| i + 1);
    let tokens = &tokens[start..end];

    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if !tokens[i].is_whitespace() {
            out.push(tokens[i]);
            i += 1;
            continue;
        }

        let run_len = tokens[i..].iter().take_while(|t| t.is_whitespace()).count();
        let run = &tokens[i..i + run_len];
        i += run_len;

        let newlines = run.iter().filter(|t| matches!(t, Token::Newline)).count();
        if newlines < 2 {
            out.extend_from_slice(run);
            continue;
        }
        out.push(Token::Newline);
        out.push(Token::Newline);
        if let Some(indent @ Token::Space(_)) = run.last() {
            out.push(*indent);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn norm(latex: &str) -> String {
        normalize(latex).unwrap().into_string()
    }

    #[test]
    fn test_tokenize_round_trips() {
        let input = "\\section*{A {b}}\n  x\\%y \\\\\n\\newline\\par\\end{quote}\t\\begin{verbatim}\n\\\\ \n\\end{verbatim}z";
        let tokens = tokenize(input);
        let joined: String = tokens.iter().map(Token::as_str).collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn test_tokenize_classifies_commands() {
        let tokens = tokenize("\\section{A}\\\\\\newlinex\\newline\\paragraph{B}\\parbox");
        assert_eq!(
            tokens,
            vec![
                Token::Vertical("\\section{A}"),
                Token::Break("\\\\"),
                Token::Text("\\newlinex"),
                Token::Break("\\newline"),
                Token::Vertical("\\paragraph{B}"),
                Token::Text("\\parbox"),
            ]
        );
    }

    #[test]
    fn test_unterminated_verbatim_runs_to_end() {
        let tokens = tokenize("a\\begin{verbatim}\n\\\\\n\n\n");
        assert_eq!(tokens.len(), 2);
        assert!(matches!(tokens[1], Token::Verbatim(_)));
    }

    #[test]
    fn test_merge_consecutive_breaks() {
        assert_eq!(norm("a \\\\ \n \\\\ b"), "a \\newline b");
        assert_eq!(norm("a\\\\\\newline\nb"), "a\\newline\nb");
    }

    #[test]
    fn test_merge_keeps_letter_separate() {
        assert_eq!(norm("a\\\\\\\\b"), "a\\newline b");
    }

    #[test]
    fn test_break_run_collapses_to_one() {
        let out = norm("a\\\\\n\\\\\n\\\\\n\\\\\nb");
        assert_eq!(out.matches("\\newline").count(), 1);
        assert!(!out.contains("\\\\"));
    }

    #[test]
    fn test_break_after_section_dropped() {
        assert_eq!(norm("\\section{Intro}\n\\\\\nText"), "\\section{Intro}\n\nText");
        assert_eq!(norm("\\subsection*{A}\\newline B"), "\\subsection*{A} B");
    }

    #[test]
    fn test_break_after_end_dropped() {
        assert_eq!(
            norm("\\end{itemize}\n\n\\\\\nNext"),
            "\\end{itemize}\n\nNext"
        );
    }

    #[test]
    fn test_leading_break_dropped() {
        assert_eq!(norm("\n\\\\\nStart"), "Start");
    }

    #[test]
    fn test_break_after_text_kept() {
        assert_eq!(norm("line one\\\\\nline two"), "line one\\\\\nline two");
    }

    #[test]
    fn test_blank_lines_collapse() {
        assert_eq!(norm("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(norm("a  \n \n\t\n    b"), "a\n\n    b");
        assert_eq!(norm("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_trims_document() {
        assert_eq!(norm("\n\n  body \n\n\n"), "body");
        assert_eq!(norm(" \n "), "");
    }

    #[test]
    fn test_verbatim_untouched() {
        let input = "\\begin{verbatim}\nx \\\\ \\\\\n\n\n\ny\n\\end{verbatim}";
        assert_eq!(norm(input), input);
    }

    #[test]
    fn test_tokenize_math_regions() {
        let tokens = tokenize("a$x\\$$ \\[\\end{b}\\\\\\]$$y$$\\$");
        assert_eq!(
            tokens,
            vec![
                Token::Text("a"),
                Token::InlineMath("$x\\$$"),
                Token::Space(" "),
                Token::DisplayMath("\\[\\end{b}\\\\\\]"),
                Token::DisplayMath("$$y$$"),
                Token::Text("\\$"),
            ]
        );
    }

    #[test]
    fn test_unclosed_math_delimiter_is_text() {
        assert_eq!(
            tokenize("cost $5"),
            vec![Token::Text("cost"), Token::Space(" "), Token::Text("$5")]
        );
        assert_eq!(norm("a $ b\\\\\\\\c"), "a $ b\\newline c");
    }

    #[test]
    fn test_display_math_rows_untouched() {
        let input = "\\[\n\\begin{aligned}\nA &= \\begin{pmatrix}1 & 2\\end{pmatrix} \\\\\n\\\\\n\n\n\nB &= 3\n\\end{aligned}\n\\]";
        assert_eq!(norm(input), input);
    }

    #[test]
    fn test_inline_math_untouched() {
        let input = "x $\\end{a}\\\\ \\\\ b$ y";
        assert_eq!(norm(input), input);
    }

    #[test]
    fn test_break_after_display_math_dropped() {
        assert_eq!(norm("\\[x\\]\n\\\\\nText"), "\\[x\\]\n\nText");
        assert_eq!(norm("$x$\\\\\nText"), "$x$\\\\\nText");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "\\section{A}\n\\\\\n\\\\ text\\\\  \\\\next\n\n\n\\end{quote}\\\\",
            "a\\\\\n\n\n\\\\\n\n\\subsection{B}\n\n\n\n\\begin{verbatim}\n\\\\\n\n\n\\end{verbatim}\n\\\\",
            "\\par\\noindent\n\\parbox{x}\\newline\n\\parbox{y}\n\\par\n\n\n",
        ];
        for input in inputs {
            let once = norm(input);
            assert_eq!(norm(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_no_three_newlines_outside_verbatim() {
        let out = norm("a\n\n\n\n\\\\\n\n\n\nb\n\n\n\n\\section{C}\n\n\n\n\\\\\n\n\n");
        assert!(!out.contains("\n\n\n"));
    }

    #[test]
    fn test_display() {
        let body = normalize("  x  ").unwrap();
        assert_eq!(body.to_string(), "x");
        assert!(!body.is_empty());
    }
}
