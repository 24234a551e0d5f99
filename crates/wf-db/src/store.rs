//! SoT store operations: upsert, bulk upsert, lookups.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use wf_core::{Daystamp, SotEntry, SotMap};

use crate::SotDb;
use crate::error::DatabaseError;
use crate::helpers::row_to_entry;

const UPSERT_SQL: &str = "INSERT INTO records (daystamp, value, updated_at) VALUES (?1, ?2, ?3)
     ON CONFLICT(daystamp) DO UPDATE SET
       value = excluded.value,
       updated_at = excluded.updated_at";

fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Error for a failed bulk write. The write error is always kept; a failed
/// rollback is appended rather than replacing it.
fn bulk_failure<W: fmt::Display, R: fmt::Display>(
    day: Daystamp,
    write: &W,
    rollback: Option<&R>,
) -> DatabaseError {
    match rollback {
        None => DatabaseError::Query(format!("bulk upsert failed at {day}, rolled back: {write}")),
        Some(rollback) => {
            tracing::error!(
                daystamp = %day,
                error = %write,
                rollback_error = %rollback,
                "bulk upsert failed and rollback failed"
            );
            DatabaseError::Query(format!(
                "bulk upsert failed at {day}: {write}; rollback also failed: {rollback}"
            ))
        }
    }
}

impl SotDb {
    /// Insert or overwrite the value for `day`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the write fails.
    pub async fn upsert(&self, day: Daystamp, value: bool) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                UPSERT_SQL,
                libsql::params![day.to_string(), i64::from(value), now_utc()],
            )
            .await?;
        tracing::debug!(daystamp = %day, value, "SoT upserted");
        Ok(())
    }

    /// Upsert every entry of `mapping` in a single transaction.
    ///
    /// Either all days are written or none are. All rows share one
    /// `updated_at`. Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any write fails; the transaction is rolled
    /// back first.
    pub async fn upsert_bulk(&self, mapping: &SotMap) -> Result<usize, DatabaseError> {
        let now = now_utc();
        let tx = self.conn.transaction().await?;
        for (day, value) in mapping {
            let written = tx
                .execute(
                    UPSERT_SQL,
                    libsql::params![day.to_string(), i64::from(*value), now.as_str()],
                )
                .await;
            if let Err(e) = written {
                let rollback = tx.rollback().await.err();
                return Err(bulk_failure(*day, &e, rollback.as_ref()));
            }
        }
        tx.commit().await?;
        tracing::debug!(rows = mapping.len(), "SoT bulk upsert committed");
        Ok(mapping.len())
    }

    /// The stored entry for `day`, or `None` if the day was never computed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or the row is corrupt.
    pub async fn get(&self, day: Daystamp) -> Result<Option<SotEntry>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT daystamp, value, updated_at FROM records WHERE daystamp = ?1",
                [day.to_string()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    /// Every stored entry, oldest day first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row is corrupt.
    pub async fn get_all(&self) -> Result<Vec<SotEntry>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT daystamp, value, updated_at FROM records ORDER BY daystamp",
                (),
            )
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// Every stored value as a daystamp map.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row is corrupt.
    pub async fn load_map(&self) -> Result<SotMap, DatabaseError> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .map(|entry| (entry.daystamp, entry.value))
            .collect())
    }
}
