//! # wf-db
//!
//! Durable source-of-truth store for wakefocus.
//!
//! One row per local calendar day holding the last computed outcome. Rows
//! are upserted on every run (last write wins) and never deleted; the table
//! is a cache of the most recent computation, not a log.
//!
//! Uses the `libsql` crate in local-only mode with WAL journaling, so readers
//! are not blocked while a run writes.

pub mod error;
pub mod helpers;
mod migrations;
mod store;

use std::path::Path;

use error::DatabaseError;
use libsql::Builder;

/// Handle to the SoT database.
pub struct SotDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl SotDb {
    /// Open (creating if needed) a local database at `path`.
    ///
    /// Creates missing parent directories, switches the journal to WAL, and
    /// runs migrations. Pass `":memory:"` for a throwaway database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created, the
    /// database cannot be opened, or migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        if path != ":memory:"
            && let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // journal_mode returns a row, so it has to go through query().
        conn.query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA journal_mode: {e}")))?;

        let sot_db = Self { db, conn };
        sot_db.run_migrations().await?;
        tracing::debug!(path, "opened SoT database");
        Ok(sot_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
