//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// No Beeminder credential while remote mutations are enabled.
    #[error(
        "Beeminder auth token is not set (WAKEFOCUS_BEEMINDER__AUTH_TOKEN or BM_AUTH_TOKEN); \
         set it or run with --dry-run"
    )]
    MissingCredential,

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

