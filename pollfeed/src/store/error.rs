//! Store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A vote needs an identified voter and none has been established.
    #[error("no current user: load posts or set a user before voting")]
    NoCurrentUser,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
