//! # wf-config
//!
//! Layered configuration loading for wakefocus using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`WAKEFOCUS_*` prefix, `__` as separator)
//! 2. Legacy variables `BM_AUTH_TOKEN` and `BM_USERNAME`
//! 3. An explicit TOML file passed by the caller (`--config`)
//! 4. Project-level `.wakefocus/config.toml`
//! 5. User-level `~/.config/wakefocus/config.toml`
//! 6. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `WAKEFOCUS_BEEMINDER__AUTH_TOKEN` -> `beeminder.auth_token`,
//! `WAKEFOCUS_SYNC__HISTORY_DAYS` -> `sync.history_days`, etc.
//!
//! The resulting [`WfConfig`] is built once at startup and passed by reference;
//! no other crate reads the process environment.

mod beeminder;
mod error;
mod goals;
mod sync;

pub use beeminder::BeeminderConfig;
pub use error::ConfigError;
pub use goals::GoalsConfig;
pub use sync::{MAX_HISTORY_DAYS, SyncConfig};

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WfConfig {
    #[serde(default)]
    pub beeminder: BeeminderConfig,
    #[serde(default)]
    pub goals: GoalsConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl WfConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed.
    pub fn load(extra_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(extra_file).extract().map_err(ConfigError::from)
    }

    /// Load `.env` from the current directory, then all other sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed.
    pub fn load_with_dotenv(extra_file: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load(extra_file)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer providers on top.
    #[must_use]
    pub fn figment(extra_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".wakefocus/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        if let Some(path) = extra_file {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Self::legacy_env());
        figment.merge(Env::prefixed("WAKEFOCUS_").split("__"))
    }

    /// Variables understood by the original cron setup.
    fn legacy_env() -> Env {
        Env::raw()
            .only(&["BM_AUTH_TOKEN", "BM_USERNAME"])
            .map(|key| {
                if key.as_str().eq_ignore_ascii_case("BM_AUTH_TOKEN") {
                    "beeminder.auth_token".into()
                } else {
                    "beeminder.username".into()
                }
            })
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("wakefocus").join("config.toml"))
    }

    /// Check the invariants every run depends on.
    ///
    /// Must pass before any remote call is made.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingCredential`] when mutations are enabled and no
    ///   auth token is set.
    /// - [`ConfigError::InvalidValue`] for an unknown time zone, an empty goal
    ///   name, a zero page size, or a trailing window outside
    ///   `1..=MAX_HISTORY_DAYS`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sync.dry_run && !self.beeminder.is_configured() {
            return Err(ConfigError::MissingCredential);
        }
        self.timezone()?;
        if self.sync.history_days == 0 {
            return Err(invalid("sync.history_days", "must be at least 1"));
        }
        if self.sync.history_days > MAX_HISTORY_DAYS {
            return Err(invalid(
                "sync.history_days",
                &format!("must be at most {MAX_HISTORY_DAYS}"),
            ));
        }
        if self.beeminder.per_page == 0 {
            return Err(invalid("beeminder.per_page", "must be at least 1"));
        }
        if self.goals.source.trim().is_empty() {
            return Err(invalid("goals.source", "must not be empty"));
        }
        if self.goals.target.trim().is_empty() {
            return Err(invalid("goals.target", "must not be empty"));
        }
        Ok(())
    }

    /// The configured local time zone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the zone name is unknown.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        wf_core::parse_time_zone(&self.sync.timezone)
            .map_err(|e| invalid("sync.timezone", &e.to_string()))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
