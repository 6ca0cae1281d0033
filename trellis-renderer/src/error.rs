//! Error types for trellis-renderer.

use thiserror::Error;

/// All errors that can arise from template rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// minijinja error: template not found, compile failure, a payload that
    /// failed to serialize, undefined access in strict mode, or a failed
    /// write to the output.
    #[error(transparent)]
    Engine(#[from] minijinja::Error),

    /// The render payload did not serialize to a string-keyed map.
    #[error("incorrect data format: expected a string-keyed map, found {found}")]
    DataFormat { found: String },
}

impl RenderError {
    /// The underlying engine error kind, if this came from minijinja.
    pub fn engine_kind(&self) -> Option<minijinja::ErrorKind> {
        match self {
            RenderError::Engine(err) => Some(err.kind()),
            _ => None,
        }
    }
}
