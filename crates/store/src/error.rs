//! Storage error types.

use thiserror::Error;

/// Errors that can occur when interacting with the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness or integrity constraint was violated.
    #[error("constraint violated: {0}")]
    Constraint(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
