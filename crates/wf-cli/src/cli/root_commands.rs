use clap::{ArgGroup, Args, Subcommand};
use wf_config::MAX_HISTORY_DAYS;
use wf_core::Daystamp;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Compute outcomes, store them, and reconcile the target goal.
    Sync(SyncArgs),
    /// Show stored outcomes.
    Sot(SotArgs),
}

#[derive(Clone, Debug, Default, Args)]
#[command(group(ArgGroup::new("range").args(["today", "days", "full_history"])))]
pub struct SyncArgs {
    /// Only today, reconciled against today's target datapoints.
    #[arg(long)]
    pub today: bool,

    /// Trailing window of N days ending today.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_HISTORY_DAYS)))]
    pub days: Option<u32>,

    /// Every day since the earliest session.
    #[arg(long)]
    pub full_history: bool,

    /// Delete target datapoints on days outside the computed range.
    #[arg(long)]
    pub strict_purge: bool,

    /// Log mutations instead of sending them.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, Debug, Default, Args)]
pub struct SotArgs {
    /// A single day (YYYYMMDD); all days when omitted.
    #[arg(long, value_name = "YYYYMMDD")]
    pub day: Option<Daystamp>,
}
