//! Database error types for wf-db.

use thiserror::Error;

/// Errors from SoT store operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// A stored row violates the SoT schema (bad daystamp or value).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The database directory could not be created.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}
