//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::SotDb;
use crate::error::DatabaseError;

/// The `records` table: daystamp key, 0/1 value, last-updated time.
const MIGRATION_001: &str = include_str!("../migrations/001_records.sql");

impl SotDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_records: {e}")))?;
        Ok(())
    }
}
