use thiserror::Error;
use wf_beeminder::FeedError;
use wf_config::ConfigError;
use wf_core::CoreError;
use wf_db::error::DatabaseError;

/// Any failure that aborts a run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
}
