//! Styled status lines on stderr.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};

/// Kind of status line; decides its color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tone {
    Plain,
    Done,
    Caution,
    Failure,
    Artifact,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Done => Style::new().green(),
            Self::Caution => Style::new().yellow(),
            Self::Failure => Style::new().red(),
            Self::Artifact => Style::new().cyan().bold(),
        }
    }
}

/// File produced by a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Written {
    Latex,
    Pdf,
}

/// Terminal reporter for command progress.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn line(&self, tone: Tone, msg: impl Display) {
        let _ = self.term.write_line(&tone.style().apply_to(msg).to_string());
    }

    pub(crate) fn info(&self, msg: impl Display) {
        self.line(Tone::Plain, msg);
    }

    pub(crate) fn warning(&self, msg: impl Display) {
        self.line(Tone::Caution, msg);
    }

    pub(crate) fn error(&self, msg: impl Display) {
        self.line(Tone::Failure, msg);
    }

    /// Report a file written to disk.
    pub(crate) fn wrote(&self, kind: Written, path: &Path) {
        match kind {
            Written::Latex => self.line(Tone::Artifact, format_args!("LaTeX written to {}", path.display())),
            Written::Pdf => self.line(Tone::Done, format_args!("PDF written to {}", path.display())),
        }
    }

    /// Print render warnings under a count header; nothing when empty.
    pub(crate) fn warnings(&self, warnings: &[String]) {
        for line in warning_lines(warnings) {
            self.warning(line);
        }
    }
}

fn warning_lines(warnings: &[String]) -> Vec<String> {
    if warnings.is_empty() {
        return Vec::new();
    }
    let mut lines = Vec::with_capacity(warnings.len() + 1);
    lines.push(format!("{} warning(s):", warnings.len()));
    lines.extend(warnings.iter().map(|w| format!("  {w}")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_warning_lines() {
        assert!(warning_lines(&[]).is_empty());
        let warnings = vec![
            "[unsupported tag: video] <video/>".to_owned(),
            "9709-s20-qp-12-1: table without header cells skipped".to_owned(),
        ];
        assert_eq!(
            warning_lines(&warnings),
            vec![
                "2 warning(s):",
                "  [unsupported tag: video] <video/>",
                "  9709-s20-qp-12-1: table without header cells skipped",
            ]
        );
    }
}
