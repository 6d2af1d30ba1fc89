use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the entire Recall workspace.
#[derive(Error, Debug)]
pub enum RecallError {
    // ── Store errors ───────────────────────────────────────────
    #[error("memory error: {0}")]
    Memory(String),

    // ── Persistence errors ─────────────────────────────────────
    #[error("failed to persist {}: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },

    #[error("import from {} failed: {reason}", path.display())]
    Import { path: PathBuf, reason: String },

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RecallError {
    /// Shorthand for a validation failure on a named field.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecallError>;
