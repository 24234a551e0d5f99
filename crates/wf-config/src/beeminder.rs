//! Beeminder API configuration.

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "https://www.beeminder.com/api/v1".to_string()
}

fn default_username() -> String {
    "zarathustra".to_string()
}

/// Default per-request timeout in seconds.
const fn default_timeout_secs() -> u64 {
    30
}

/// Default page size for datapoint listing.
const fn default_per_page() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BeeminderConfig {
    /// API root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Account whose goals are read and written.
    #[serde(default = "default_username")]
    pub username: String,

    /// Personal auth token, sent as the `auth_token` parameter.
    #[serde(default)]
    pub auth_token: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for BeeminderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: default_username(),
            auth_token: String::new(),
            timeout_secs: default_timeout_secs(),
            per_page: default_per_page(),
        }
    }
}

impl BeeminderConfig {
    /// Whether a credential is available.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.auth_token.is_empty()
    }
}
