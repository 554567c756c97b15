//! PDF compilation with an external LaTeX engine.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::CliError;

/// Engine passes; the second resolves labels and references.
const PASSES: usize = 2;

/// Lines of engine output kept in a compile error.
const LOG_TAIL_LINES: usize = 40;

/// Compile `tex_path` into a PDF next to it.
///
/// Returns the path of the produced PDF.
pub(crate) fn compile(engine: &str, tex_path: &Path) -> Result<PathBuf, CliError> {
    let output_dir = tex_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    for pass in 1..=PASSES {
        tracing::info!(engine, pass, file = %tex_path.display(), "Running LaTeX engine");
        let result = Command::new(engine)
            .arg("-interaction=nonstopmode")
            .arg("-output-directory")
            .arg(output_dir)
            .arg(tex_path)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => CliError::EngineNotFound(engine.to_owned()),
                _ => CliError::Io(err),
            })?;

        if !result.status.success() {
            let mut log = String::from_utf8_lossy(&result.stdout).into_owned();
            log.push_str(&String::from_utf8_lossy(&result.stderr));
            return Err(CliError::Compile {
                engine: engine.to_owned(),
                pass,
                log: log_tail(&log, LOG_TAIL_LINES),
            });
        }
    }

    Ok(tex_path.with_extension("pdf"))
}

/// Last `lines` lines of `log`.
fn log_tail(log: &str, lines: usize) -> String {
    let all: Vec<&str> = log.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_log_tail() {
        assert_eq!(log_tail("a\nb\nc\n", 2), "b\nc");
        assert_eq!(log_tail("a", 5), "a");
        assert_eq!(log_tail("", 5), "");
    }

    #[test]
    fn test_missing_engine() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("doc.tex");
        std::fs::write(&tex, "").unwrap();

        let err = compile("mdtex-no-such-engine", &tex).unwrap_err();
        assert!(matches!(err, CliError::EngineNotFound(ref name) if name == "mdtex-no-such-engine"));
    }
}
