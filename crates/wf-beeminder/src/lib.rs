//! # wf-beeminder
//!
//! Beeminder datapoint client for wakefocus.
//!
//! - [`BeeminderClient`]: the live API (paginated listing, create with an
//!   idempotency token, update, delete)
//! - [`DatapointFeed`]: the capability the reconciler is written against
//! - [`DryRunFeed`]: decorator that logs mutations instead of sending them
//! - `MemoryFeed` (feature `test-util`): an in-memory goal store honouring
//!   the same contract, for tests

mod datapoints;
mod dry_run;
mod error;
mod feed;
mod http;
#[cfg(any(test, feature = "test-util"))]
mod memory;

pub use dry_run::DryRunFeed;
pub use error::FeedError;
pub use feed::{DatapointFeed, DatapointUpdate, NewDatapoint};
#[cfg(any(test, feature = "test-util"))]
pub use memory::{FeedCall, MemoryFeed};

use std::time::Duration;

use wf_config::BeeminderConfig;

/// HTTP client for one Beeminder account.
pub struct BeeminderClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    auth_token: String,
    per_page: u32,
}

impl BeeminderClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client` fails
    /// to build (e.g. no TLS backend).
    pub fn new(config: &BeeminderConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("wakefocus/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            auth_token: config.auth_token.clone(),
            per_page: config.per_page.max(1),
        })
    }

    fn goal_url(&self, goal: &str) -> String {
        format!(
            "{}/users/{}/goals/{}/datapoints.json",
            self.base_url,
            urlencoding::encode(&self.username),
            urlencoding::encode(goal)
        )
    }

    fn datapoint_url(&self, goal: &str, id: &str) -> String {
        format!(
            "{}/users/{}/goals/{}/datapoints/{}.json",
            self.base_url,
            urlencoding::encode(&self.username),
            urlencoding::encode(goal),
            urlencoding::encode(id)
        )
    }
}
