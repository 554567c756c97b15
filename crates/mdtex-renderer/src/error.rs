//! Renderer error types.

/// Error raised while rendering a document tree.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    /// A link or image node has no target URL.
    #[error("{kind} node is missing its url")]
    MissingUrl {
        /// Node kind (`link` or `image`).
        kind: &'static str,
    },
    /// The normalizer did not reach a fixed point within its pass budget.
    #[error("line break normalization did not converge after {passes} passes")]
    NormalizeDiverged {
        /// Number of passes performed.
        passes: usize,
    },
    /// Rendering one exercise of a paper failed.
    #[error("exercise {id}: {source}")]
    Exercise {
        id: String,
        #[source]
        source: Box<RenderError>,
    },
}
