//! Target-goal reconciliation.
//!
//! For every day in the SoT mapping the target goal must end up with exactly
//! one datapoint whose value and comment match the canonical form. Writes are
//! kept minimal so that a second run over a converged goal issues none.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono_tz::Tz;
use serde::Serialize;
use wf_beeminder::{DatapointFeed, DatapointUpdate, NewDatapoint};
use wf_core::{Datapoint, Daystamp, SotMap, canonical_comment, group_by_day, request_id};

use crate::error::SyncError;

/// Mutations issued (or deliberately not issued) by one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
    /// Creates the remote rejected because the request id was already used.
    pub duplicates_swallowed: usize,
    /// Records that needed a delete or update but had no remote id.
    pub skipped: usize,
}

impl ReconcileStats {
    #[must_use]
    pub const fn mutations(&self) -> usize {
        self.creates + self.updates + self.deletes
    }
}

/// Reconciles one target goal against SoT values.
pub struct Reconciler<'a, F> {
    feed: &'a F,
    goal: &'a str,
    tz: Tz,
    strict_purge: bool,
}

impl<'a, F: DatapointFeed> Reconciler<'a, F> {
    #[must_use]
    pub const fn new(feed: &'a F, goal: &'a str, tz: Tz) -> Self {
        Self {
            feed,
            goal,
            tz,
            strict_purge: false,
        }
    }

    /// Also delete target datapoints on days absent from the SoT mapping.
    #[must_use]
    pub const fn strict_purge(mut self, enabled: bool) -> Self {
        self.strict_purge = enabled;
        self
    }

    /// Bring every day of `sot` in line, given the full target collection.
    ///
    /// Days are processed in ascending order. With strict purge enabled, days
    /// present in `target` but not in `sot` are emptied afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first fatal feed error; the duplicate-create rejection is
    /// not fatal.
    pub async fn reconcile_history(
        &self,
        sot: &SotMap,
        target: &[Datapoint],
    ) -> Result<ReconcileStats, SyncError> {
        let by_day = group_by_day(target, self.tz);
        let mut stats = ReconcileStats::default();

        for (&day, &value) in sot {
            let existing = by_day.get(&day).map_or(&[][..], Vec::as_slice);
            self.reconcile_records(day, value, existing, &mut stats).await?;
        }

        if self.strict_purge {
            self.purge(sot, &by_day, &mut stats).await?;
        }

        tracing::info!(
            goal = self.goal,
            days = sot.len(),
            creates = stats.creates,
            updates = stats.updates,
            deletes = stats.deletes,
            "reconciled target goal"
        );
        Ok(stats)
    }

    /// Bring a single day in line, given the target collection.
    ///
    /// Records on other days are ignored and never purged.
    ///
    /// # Errors
    ///
    /// Returns the first fatal feed error.
    pub async fn reconcile_day(
        &self,
        day: Daystamp,
        value: bool,
        target: &[Datapoint],
    ) -> Result<ReconcileStats, SyncError> {
        let existing: Vec<&Datapoint> = target
            .iter()
            .filter(|dp| dp.day(self.tz) == Some(day))
            .collect();
        let mut stats = ReconcileStats::default();
        self.reconcile_records(day, value, &existing, &mut stats).await?;
        Ok(stats)
    }

    async fn reconcile_records(
        &self,
        day: Daystamp,
        value: bool,
        existing: &[&Datapoint],
        stats: &mut ReconcileStats,
    ) -> Result<(), SyncError> {
        let comment = canonical_comment(value, day);
        let wanted = i64::from(value);

        let sorted = select_keeper(existing);
        let Some((&keeper, extras)) = sorted.split_first() else {
            return self.create(day, wanted, comment, stats).await;
        };

        for extra in extras {
            match extra.remote_id() {
                Some(id) => {
                    tracing::debug!(daystamp = %day, id, "deleting duplicate datapoint");
                    self.feed.delete(self.goal, id).await?;
                    stats.deletes += 1;
                }
                None => {
                    tracing::warn!(daystamp = %day, "duplicate datapoint has no id; skipping");
                    stats.skipped += 1;
                }
            }
        }

        if keeper.rounded_value() == wanted && keeper.comment_text() == comment {
            return Ok(());
        }
        let Some(id) = keeper.remote_id() else {
            tracing::warn!(daystamp = %day, "datapoint to correct has no id; skipping");
            stats.skipped += 1;
            return Ok(());
        };

        tracing::debug!(daystamp = %day, id, value = wanted, "updating datapoint");
        let update = DatapointUpdate {
            value: wanted,
            comment,
            daystamp: Some(day),
        };
        self.feed.update(self.goal, id, &update).await?;
        stats.updates += 1;
        Ok(())
    }

    async fn create(
        &self,
        day: Daystamp,
        value: i64,
        comment: String,
        stats: &mut ReconcileStats,
    ) -> Result<(), SyncError> {
        let new = NewDatapoint {
            value,
            comment,
            daystamp: day,
            requestid: Some(request_id(self.goal, day)),
        };
        tracing::debug!(daystamp = %day, value, "creating missing datapoint");
        match self.feed.create(self.goal, &new).await {
            Ok(_) => {
                stats.creates += 1;
                Ok(())
            }
            Err(e) if e.is_duplicate() => {
                tracing::info!(daystamp = %day, "create already applied by an earlier run");
                stats.duplicates_swallowed += 1;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn purge(
        &self,
        sot: &SotMap,
        by_day: &HashMap<Daystamp, Vec<&Datapoint>>,
        stats: &mut ReconcileStats,
    ) -> Result<(), SyncError> {
        let mut stale: Vec<_> = by_day
            .iter()
            .filter(|(day, _)| !sot.contains_key(*day))
            .collect();
        stale.sort_by_key(|(day, _)| **day);

        for (day, records) in stale {
            for dp in records {
                if let Some(id) = dp.remote_id() {
                    tracing::info!(daystamp = %day, id, "strict purge: deleting datapoint");
                    self.feed.delete(self.goal, id).await?;
                    stats.deletes += 1;
                } else {
                    tracing::warn!(daystamp = %day, "strict purge: datapoint has no id; skipping");
                    stats.skipped += 1;
                }
            }
        }
        Ok(())
    }
}

/// Order a day's records newest first.
///
/// The sort is stable, so records with equal recency keep fetch order and
/// the earliest fetched of them wins.
fn select_keeper<'d>(records: &[&'d Datapoint]) -> Vec<&'d Datapoint> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        b.recency_key()
            .partial_cmp(&a.recency_key())
            .unwrap_or(Ordering::Equal)
    });
    sorted
}
