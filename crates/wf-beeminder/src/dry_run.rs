//! Dry-run decorator.
//!
//! Wraps any [`DatapointFeed`]. Reads pass through when the inner feed has a
//! credential to read with; mutations are logged and reported as successful
//! without reaching the inner feed.

use wf_core::Datapoint;

use crate::error::FeedError;
use crate::feed::{DatapointFeed, DatapointUpdate, NewDatapoint};

pub struct DryRunFeed<F> {
    inner: F,
    reads_enabled: bool,
}

impl<F: DatapointFeed> DryRunFeed<F> {
    /// With `reads_enabled == false` every fetch returns an empty list, so a
    /// run without a credential still computes and stores outcomes.
    #[must_use]
    pub const fn new(inner: F, reads_enabled: bool) -> Self {
        Self {
            inner,
            reads_enabled,
        }
    }

    #[must_use]
    pub const fn inner(&self) -> &F {
        &self.inner
    }
}

#[allow(clippy::cast_precision_loss)]
impl<F: DatapointFeed> DatapointFeed for DryRunFeed<F> {
    async fn fetch_all(&self, goal: &str) -> Result<Vec<Datapoint>, FeedError> {
        if self.reads_enabled {
            self.inner.fetch_all(goal).await
        } else {
            tracing::info!(goal, dry_run = true, "no credential; treating goal as empty");
            Ok(Vec::new())
        }
    }

    async fn create(&self, goal: &str, datapoint: &NewDatapoint) -> Result<Datapoint, FeedError> {
        tracing::info!(
            goal,
            daystamp = %datapoint.daystamp,
            value = datapoint.value,
            requestid = datapoint.requestid.as_deref().unwrap_or("-"),
            dry_run = true,
            "would create datapoint"
        );
        Ok(Datapoint {
            daystamp: Some(datapoint.daystamp.to_string()),
            value: Some(datapoint.value as f64),
            comment: Some(datapoint.comment.clone()),
            requestid: datapoint.requestid.clone(),
            ..Datapoint::default()
        })
    }

    async fn update(
        &self,
        goal: &str,
        id: &str,
        update: &DatapointUpdate,
    ) -> Result<Datapoint, FeedError> {
        tracing::info!(
            goal,
            id,
            value = update.value,
            comment = update.comment.as_str(),
            dry_run = true,
            "would update datapoint"
        );
        Ok(Datapoint {
            id: Some(id.to_string()),
            daystamp: update.daystamp.map(|d| d.to_string()),
            value: Some(update.value as f64),
            comment: Some(update.comment.clone()),
            ..Datapoint::default()
        })
    }

    async fn delete(&self, goal: &str, id: &str) -> Result<(), FeedError> {
        tracing::info!(goal, id, dry_run = true, "would delete datapoint");
        Ok(())
    }
}
