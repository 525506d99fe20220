//! Network loading error types.

use std::path::PathBuf;

use crate::domain::DomainError;

/// Errors that can occur when loading network data.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The data source could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data source is not valid JSON for a transport
    #[error("JSON parse error in {path}: {message}")]
    Json { path: PathBuf, message: String },

    /// The data parsed but describes an invalid network
    #[error("invalid network data: {0}")]
    Invalid(#[from] DomainError),

    /// No data sources were given
    #[error("no transports to load")]
    Empty,
}
