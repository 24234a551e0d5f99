//! In-memory datapoint feed.
//!
//! Behaves like the remote for the parts reconciliation relies on: ids are
//! assigned on create, a reused `requestid` is rejected as a duplicate, and
//! every call is recorded so callers can assert on what was sent.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use wf_core::{Datapoint, Stamp};

use crate::error::FeedError;
use crate::feed::{DatapointFeed, DatapointUpdate, NewDatapoint};

/// One recorded call against a [`MemoryFeed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCall {
    FetchAll {
        goal: String,
    },
    Create {
        goal: String,
        daystamp: String,
        requestid: Option<String>,
    },
    Update {
        goal: String,
        id: String,
    },
    Delete {
        goal: String,
        id: String,
    },
}

impl FeedCall {
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !matches!(self, Self::FetchAll { .. })
    }
}

#[derive(Default)]
struct State {
    goals: HashMap<String, Vec<Datapoint>>,
    seen_request_ids: HashSet<(String, String)>,
    calls: Vec<FeedCall>,
    next_id: u64,
    clock: f64,
}

impl State {
    fn tick(&mut self) -> f64 {
        self.clock += 1.0;
        self.clock
    }
}

pub struct MemoryFeed {
    state: Mutex<State>,
}

impl Default for MemoryFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Logical clock origin for `updated_at` on writes; later than any
/// realistic seeded stamp.
const CLOCK_ORIGIN: f64 = 4_000_000_000.0;

impl MemoryFeed {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                clock: CLOCK_ORIGIN,
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a datapoint as-is. Its `requestid`, if any, counts as used.
    pub fn insert(&self, goal: &str, datapoint: Datapoint) {
        let mut state = self.lock();
        if let Some(requestid) = &datapoint.requestid {
            state
                .seen_request_ids
                .insert((goal.to_string(), requestid.clone()));
        }
        state.goals.entry(goal.to_string()).or_default().push(datapoint);
    }

    /// Mark a `requestid` as used without storing a datapoint, as when the
    /// remote accepted a create whose record was later deleted.
    pub fn burn_request_id(&self, goal: &str, requestid: &str) {
        self.lock()
            .seen_request_ids
            .insert((goal.to_string(), requestid.to_string()));
    }

    /// Current datapoints of `goal`.
    #[must_use]
    pub fn datapoints(&self, goal: &str) -> Vec<Datapoint> {
        self.lock().goals.get(goal).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<FeedCall> {
        self.lock().calls.clone()
    }

    /// Creates, updates, and deletes recorded so far.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.lock().calls.iter().filter(|c| c.is_mutation()).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

fn not_found(request: String) -> FeedError {
    FeedError::Api {
        request,
        status: 404,
        body: "datapoint not found".to_string(),
    }
}

impl DatapointFeed for MemoryFeed {
    async fn fetch_all(&self, goal: &str) -> Result<Vec<Datapoint>, FeedError> {
        let mut state = self.lock();
        state.calls.push(FeedCall::FetchAll {
            goal: goal.to_string(),
        });
        Ok(state.goals.get(goal).cloned().unwrap_or_default())
    }

    async fn create(&self, goal: &str, datapoint: &NewDatapoint) -> Result<Datapoint, FeedError> {
        let mut state = self.lock();
        state.calls.push(FeedCall::Create {
            goal: goal.to_string(),
            daystamp: datapoint.daystamp.to_string(),
            requestid: datapoint.requestid.clone(),
        });

        if let Some(requestid) = &datapoint.requestid
            && !state
                .seen_request_ids
                .insert((goal.to_string(), requestid.clone()))
        {
            return Err(FeedError::DuplicateRequest {
                requestid: requestid.clone(),
                body: "Duplicate request".to_string(),
            });
        }

        state.next_id += 1;
        let id = format!("mem{}", state.next_id);
        let updated_at = state.tick();
        #[allow(clippy::cast_precision_loss)]
        let created = Datapoint {
            id: Some(id),
            daystamp: Some(datapoint.daystamp.to_string()),
            value: Some(datapoint.value as f64),
            comment: Some(datapoint.comment.clone()),
            updated_at: Some(Stamp::Epoch(updated_at)),
            requestid: datapoint.requestid.clone(),
            ..Datapoint::default()
        };
        state
            .goals
            .entry(goal.to_string())
            .or_default()
            .insert(0, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        goal: &str,
        id: &str,
        update: &DatapointUpdate,
    ) -> Result<Datapoint, FeedError> {
        let mut state = self.lock();
        state.calls.push(FeedCall::Update {
            goal: goal.to_string(),
            id: id.to_string(),
        });
        let updated_at = state.tick();
        let existing = state
            .goals
            .get_mut(goal)
            .and_then(|dps| dps.iter_mut().find(|dp| dp.remote_id() == Some(id)))
            .ok_or_else(|| not_found(format!("PUT {goal} {id}")))?;

        #[allow(clippy::cast_precision_loss)]
        {
            existing.value = Some(update.value as f64);
        }
        existing.comment = Some(update.comment.clone());
        if let Some(day) = update.daystamp {
            existing.daystamp = Some(day.to_string());
        }
        existing.updated_at = Some(Stamp::Epoch(updated_at));
        Ok(existing.clone())
    }

    async fn delete(&self, goal: &str, id: &str) -> Result<(), FeedError> {
        let mut state = self.lock();
        state.calls.push(FeedCall::Delete {
            goal: goal.to_string(),
            id: id.to_string(),
        });
        let dps = state.goals.entry(goal.to_string()).or_default();
        let before = dps.len();
        dps.retain(|dp| dp.remote_id() != Some(id));
        if dps.len() == before {
            return Err(not_found(format!("DELETE {goal} {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wf_core::Daystamp;

    fn new_dp(day: &str, requestid: &str) -> NewDatapoint {
        NewDatapoint {
            value: 1,
            comment: "c".into(),
            daystamp: day.parse::<Daystamp>().unwrap(),
            requestid: Some(requestid.into()),
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_rejects_reused_tokens() {
        let feed = MemoryFeed::new();
        let first = feed.create("g", &new_dp("20250101", "r1")).await.unwrap();
        assert_eq!(first.remote_id(), Some("mem1"));

        let err = feed.create("g", &new_dp("20250101", "r1")).await.unwrap_err();
        assert!(err.is_duplicate());

        // Tokens are scoped per goal.
        assert!(feed.create("other", &new_dp("20250101", "r1")).await.is_ok());
        assert_eq!(feed.datapoints("g").len(), 1);
    }

    #[tokio::test]
    async fn burned_token_survives_delete() {
        let feed = MemoryFeed::new();
        let created = feed.create("g", &new_dp("20250101", "r1")).await.unwrap();
        feed.delete("g", created.remote_id().unwrap()).await.unwrap();
        assert!(feed.datapoints("g").is_empty());

        let err = feed.create("g", &new_dp("20250101", "r1")).await.unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids_fail() {
        let feed = MemoryFeed::new();
        let update = DatapointUpdate {
            value: 0,
            comment: "c".into(),
            daystamp: None,
        };
        assert!(matches!(
            feed.update("g", "missing", &update).await,
            Err(FeedError::Api { status: 404, .. })
        ));
        assert!(matches!(
            feed.delete("g", "missing").await,
            Err(FeedError::Api { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn update_bumps_recency() {
        let feed = MemoryFeed::new();
        feed.insert(
            "g",
            Datapoint {
                id: Some("a".into()),
                updated_at: Some(Stamp::Epoch(1_700_000_000.0)),
                ..Datapoint::default()
            },
        );
        let updated = feed
            .update(
                "g",
                "a",
                &DatapointUpdate {
                    value: 1,
                    comment: "new".into(),
                    daystamp: None,
                },
            )
            .await
            .unwrap();
        assert!(updated.recency_key() > 1_700_000_000.0);
        assert_eq!(updated.comment_text(), "new");
    }

    #[tokio::test]
    async fn calls_are_recorded_in_order() {
        let feed = MemoryFeed::new();
        feed.fetch_all("g").await.unwrap();
        feed.create("g", &new_dp("20250101", "r1")).await.unwrap();
        feed.delete("g", "mem1").await.unwrap();

        let calls = feed.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0],
            FeedCall::FetchAll {
                goal: "g".into()
            }
        );
        assert_eq!(feed.mutation_count(), 2);

        feed.clear_calls();
        assert!(feed.calls().is_empty());
    }
}
