use anyhow::Context;
use wf_beeminder::{BeeminderClient, DryRunFeed};
use wf_config::WfConfig;
use wf_core::Daystamp;
use wf_db::SotDb;

use crate::cli::GlobalFlags;
use crate::output::output;

pub async fn handle(config: &WfConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    config.validate()?;
    let tz = config.timezone()?;
    let today = Daystamp::today(tz);

    let store = SotDb::open_local(&config.sync.db_path)
        .await
        .with_context(|| format!("failed to open SoT database at {}", config.sync.db_path))?;
    let client = BeeminderClient::new(&config.beeminder)?;

    let report = if config.sync.dry_run {
        let feed = DryRunFeed::new(client, config.beeminder.is_configured());
        wf_sync::run(config, &feed, &store, today).await?
    } else {
        wf_sync::run(config, &client, &store, today).await?
    };

    tracing::info!(
        creates = report.stats.creates,
        updates = report.stats.updates,
        deletes = report.stats.deletes,
        dry_run = report.dry_run,
        "sync complete"
    );
    output(&report, flags.format)
}
