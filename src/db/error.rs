//! Database-specific error types
//!
//! Errors from the sled document store, its bincode key/value encoding, and
//! the JSON document sources it holds.

use thiserror::Error;

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Represents a sled database error
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),

    /// Represents a bincode decoding error
    #[error("Error while decoding data: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// Represents a bincode encoding error
    #[error("Error while encoding data: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    /// A document source is not valid JSON
    #[error("Invalid document source: {0}")]
    Json(#[from] serde_json::Error),

    /// No document under this identifier
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Invalid input provided (e.g., a hit without `_index`)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
