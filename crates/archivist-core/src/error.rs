//! Error types for the digest engine.

use thiserror::Error;

/// Errors returned by the cursor store.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors returned by digest orchestrator operations.
#[derive(Debug, Error)]
pub enum DigestError {
    /// The archive or cursor store could not be read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    /// A pattern table or redactor failed to build.
    #[error("setup error: {0}")]
    Setup(String),
}

impl DigestError {
    /// Wrap a storage failure from the archive or cursor store.
    pub(crate) fn storage(err: impl std::fmt::Display) -> Self {
        DigestError::StorageUnavailable(err.to_string())
    }
}
