use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating, provisioning or parsing a language model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model not found at {0}")]
    NotFound(PathBuf),

    #[error("source {source_name} has no model named {model}")]
    UnknownModel { source_name: String, model: String },

    #[error("malformed model file {file}, line {line}: {reason}")]
    Malformed {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("invalid model metadata: {0}")]
    Meta(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}
