//! Provider error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching posts.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The payload file does not exist.
    #[error("source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// The payload file exists but could not be read.
    #[error("source unreadable: {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed payload.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A record references an asset that is not in the catalog.
    #[error("data corrupted at {field_path}: asset '{asset}' could not be resolved")]
    DataCorrupted { asset: String, field_path: String },

    /// The source refused to answer.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
