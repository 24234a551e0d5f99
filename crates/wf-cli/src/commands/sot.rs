use anyhow::Context;
use wf_config::WfConfig;
use wf_db::SotDb;

use crate::cli::{GlobalFlags, SotArgs};
use crate::output::output;

pub async fn handle(args: &SotArgs, config: &WfConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let store = SotDb::open_local(&config.sync.db_path)
        .await
        .with_context(|| format!("failed to open SoT database at {}", config.sync.db_path))?;

    match args.day {
        Some(day) => {
            let entry = store.get(day).await?;
            if entry.is_none() {
                tracing::info!(daystamp = %day, "no stored outcome for day");
            }
            output(&entry, flags.format)
        }
        None => output(&store.get_all().await?, flags.format),
    }
}
