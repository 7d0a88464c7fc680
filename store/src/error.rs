//! Store error types.

use thiserror::Error;

/// Errors that can occur while persisting or querying quotes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
