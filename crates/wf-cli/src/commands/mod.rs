mod sot;
mod sync;

use wf_config::WfConfig;

use crate::cli::{Commands, GlobalFlags};

pub async fn dispatch(
    command: &Commands,
    config: &WfConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Sync(_) => sync::handle(config, flags).await,
        Commands::Sot(args) => sot::handle(args, config, flags).await,
    }
}
