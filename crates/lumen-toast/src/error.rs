//! Error types for the toast system.

use std::path::PathBuf;

/// Result type alias for toast operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the toast API boundary.
///
/// The queue itself never fails; these are caller-contract and configuration
/// errors reported before anything reaches the manager.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A toast was requested with an empty label.
    #[error("Toast label must not be empty")]
    EmptyLabel,

    /// Configuration file could not be read.
    #[error("Failed to read toast config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed.
    #[error("Invalid toast config{}: {source}", quoted_path(.path))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration parsed but holds an unusable value.
    #[error("Invalid value for toast config field '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl Error {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(path: Option<PathBuf>, source: toml::de::Error) -> Self {
        Self::Parse { path, source }
    }

    /// Create a value error.
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

fn quoted_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" '{}'", p.display()))
        .unwrap_or_default()
}
