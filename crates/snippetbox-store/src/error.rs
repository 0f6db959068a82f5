//! Error types for the Snippetbox snippet store.

use thiserror::Error;

/// Result type alias for snippet store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during snippet store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("schema bootstrap failed: {0}")]
    Migrate(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("expiry of {0} days is out of range")]
    ExpiryOutOfRange(i64),

    #[error("no matching snippet: {0}")]
    NotFound(i64),
}

impl StoreError {
    /// True when the error means "no such (non-expired) record".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
