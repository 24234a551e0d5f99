//! Cross-cutting error types for wakefocus.
//!
//! Domain-specific errors (`DatabaseError`, `FeedError`, ...) live in their
//! own crates. `wf-sync` converges them into `SyncError`.

use thiserror::Error;

/// Errors that can be raised by core parsing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A daystamp string was not a valid `YYYYMMDD` calendar date.
    #[error("Invalid daystamp '{0}' (expected YYYYMMDD)")]
    InvalidDaystamp(String),

    /// A time zone name is not in the IANA database.
    #[error("Unknown time zone '{0}'")]
    UnknownTimeZone(String),
}
