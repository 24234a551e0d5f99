//! Source and target goal names.

use serde::{Deserialize, Serialize};

fn default_source() -> String {
    "focusmate".to_string()
}

fn default_target() -> String {
    "wakeandfocus".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoalsConfig {
    /// Goal whose datapoints are the session records.
    #[serde(default = "default_source")]
    pub source: String,

    /// Goal reconciled against the SoT.
    #[serde(default = "default_target")]
    pub target: String,
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            target: default_target(),
        }
    }
}
