//! Error types for archive operations.

/// Errors returned by archives and helpers.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Regex compilation error.
    #[error("regex error: {0}")]
    Regex(String),
}
