//! Run behaviour: range selection, safety switches, and local storage.

use serde::{Deserialize, Serialize};
use wf_core::RangeMode;

fn default_timezone() -> String {
    "America/New_York".to_string()
}

/// Longest accepted trailing window, a little over a century.
pub const MAX_HISTORY_DAYS: u32 = 36_600;

/// Default trailing window length in days.
const fn default_history_days() -> u32 {
    90
}

fn default_db_path() -> String {
    "data/wake_focus_sot.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// IANA zone that defines calendar days.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Log intended mutations instead of sending them.
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub verbose: bool,

    /// Reconcile only today, against today's target datapoints.
    #[serde(default)]
    pub today_only: bool,

    /// Cover every day since the earliest source datapoint.
    #[serde(default)]
    pub full_history: bool,

    /// Trailing window length; ignored with `full_history` or `today_only`.
    #[serde(default = "default_history_days")]
    pub history_days: u32,

    /// Delete target datapoints on days outside the computed range.
    #[serde(default)]
    pub strict_purge: bool,

    /// SQLite file holding the SoT table.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            dry_run: false,
            verbose: false,
            today_only: false,
            full_history: false,
            history_days: default_history_days(),
            strict_purge: false,
            db_path: default_db_path(),
        }
    }
}

impl SyncConfig {
    /// The range mode selected by the flags. `today_only` wins over
    /// `full_history`, which wins over the trailing window.
    #[must_use]
    pub const fn range_mode(&self) -> RangeMode {
        if self.today_only {
            RangeMode::Today
        } else if self.full_history {
            RangeMode::FullHistory
        } else {
            RangeMode::Trailing {
                days: self.history_days,
            }
        }
    }
}
