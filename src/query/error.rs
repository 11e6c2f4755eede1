//! Errors raised while querying the search backend

use thiserror::Error;

/// Result query errors
#[derive(Debug, Error)]
pub enum QueryError {
    /// Page size of zero was requested
    #[error("Page size must be greater than zero")]
    InvalidPageSize,

    /// The backend failed to answer
    #[error("Search backend error: {0}")]
    Backend(String),

    /// Local document store error
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),
}
