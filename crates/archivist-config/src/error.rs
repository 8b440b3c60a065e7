//! Config errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file or the working directory could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON5 syntax error in the named layer.
    #[error("malformed JSON5 in {layer}: {source}")]
    Syntax {
        layer: String,
        #[source]
        source: json5::Error,
    },
    #[error("config does not match the schema: {0}")]
    Decode(#[from] serde_json::Error),
    /// A key or value rejected by the layer schema.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// A window or character limit configured as zero.
    #[error("{field} must be positive")]
    ZeroLimit { field: &'static str },
    /// A storage location left blank.
    #[error("{field} must not be empty")]
    EmptyPath { field: &'static str },
}

impl ConfigError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn syntax(layer: impl Into<String>, source: json5::Error) -> Self {
        Self::Syntax {
            layer: layer.into(),
            source,
        }
    }
}
