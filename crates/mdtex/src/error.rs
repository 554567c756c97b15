//! CLI error types.

use std::path::PathBuf;

use mdtex_config::ConfigError;
use mdtex_renderer::RenderError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("invalid document tree: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("LaTeX engine `{0}` not found in PATH")]
    EngineNotFound(String),

    #[error("{engine} failed on pass {pass}:\n{log}")]
    Compile {
        engine: String,
        pass: usize,
        log: String,
    },

    #[error("{0}")]
    Validation(String),
}
