//! The datapoint feed capability.
//!
//! Reconciliation only needs four operations against a named goal. The trait
//! lets the same algorithm run against the live API, the dry-run decorator,
//! or the in-memory feed used in tests.

use serde::Serialize;
use wf_core::{Datapoint, Daystamp};

use crate::error::FeedError;

/// A datapoint to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDatapoint {
    pub value: i64,
    pub comment: String,
    pub daystamp: Daystamp,
    /// Idempotency token; a repeat is rejected with
    /// [`FeedError::DuplicateRequest`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requestid: Option<String>,
}

/// Replacement value and comment for an existing datapoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatapointUpdate {
    pub value: i64,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daystamp: Option<Daystamp>,
}

/// Read and mutate the datapoints of a goal.
///
/// Calls are issued strictly one at a time; implementations need not be
/// safe for concurrent use.
#[allow(async_fn_in_trait)]
pub trait DatapointFeed {
    /// Every datapoint of `goal`, newest first, across all pages.
    async fn fetch_all(&self, goal: &str) -> Result<Vec<Datapoint>, FeedError>;

    async fn create(&self, goal: &str, datapoint: &NewDatapoint) -> Result<Datapoint, FeedError>;

    async fn update(
        &self,
        goal: &str,
        id: &str,
        update: &DatapointUpdate,
    ) -> Result<Datapoint, FeedError>;

    async fn delete(&self, goal: &str, id: &str) -> Result<(), FeedError>;
}
