use anyhow::Context;
use wf_config::WfConfig;

use crate::cli::{Commands, GlobalFlags, SyncArgs};

/// Load layered configuration and fold command-line switches over it.
pub fn load_config(flags: &GlobalFlags, command: &Commands) -> anyhow::Result<WfConfig> {
    let mut config = WfConfig::load_with_dotenv(flags.config.as_deref())
        .context("failed to load configuration")?;

    if flags.verbose {
        config.sync.verbose = true;
    }
    if let Commands::Sync(args) = command {
        apply_sync_args(&mut config, args);
    }
    Ok(config)
}

/// Flags only ever switch behaviour on; a range flag replaces whatever range
/// the files selected.
fn apply_sync_args(config: &mut WfConfig, args: &SyncArgs) {
    if args.today {
        config.sync.today_only = true;
        config.sync.full_history = false;
    } else if args.full_history {
        config.sync.today_only = false;
        config.sync.full_history = true;
    } else if let Some(days) = args.days {
        config.sync.today_only = false;
        config.sync.full_history = false;
        config.sync.history_days = days;
    }
    config.sync.strict_purge |= args.strict_purge;
    config.sync.dry_run |= args.dry_run;
}
