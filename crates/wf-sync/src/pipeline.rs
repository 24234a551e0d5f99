//! One end-to-end run.

use serde::Serialize;
use wf_beeminder::DatapointFeed;
use wf_config::WfConfig;
use wf_core::{Daystamp, QualificationRule, RangeMode, build_range, compute_outcomes};
use wf_db::SotDb;

use crate::error::SyncError;
use crate::reconciler::{ReconcileStats, Reconciler};

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub range_start: Daystamp,
    pub range_end: Daystamp,
    pub days_computed: usize,
    pub days_qualifying: usize,
    #[serde(flatten)]
    pub stats: ReconcileStats,
    pub dry_run: bool,
}

/// Fetch sessions, compute and store outcomes, then reconcile the target.
///
/// `today` is the current day in the configured zone; it is a parameter so
/// callers control the clock.
///
/// # Errors
///
/// Fails on an invalid time zone, any storage error, or any feed error other
/// than the duplicate-create rejection. The run stops at the first failure;
/// outcomes already stored stay stored.
pub async fn run<F: DatapointFeed>(
    config: &WfConfig,
    feed: &F,
    store: &SotDb,
    today: Daystamp,
) -> Result<RunReport, SyncError> {
    let tz = config.timezone()?;
    let source_goal = config.goals.source.as_str();
    let target_goal = config.goals.target.as_str();
    let mode = config.sync.range_mode();

    let sessions = feed.fetch_all(source_goal).await?;
    let range = build_range(mode, today, &sessions, tz);
    tracing::info!(
        start = %range.start,
        end = %range.end,
        days = range.day_count(),
        ?mode,
        sessions = sessions.len(),
        "computing outcomes"
    );

    let sot = compute_outcomes(&sessions, range, &QualificationRule::default(), tz);
    let written = store.upsert_bulk(&sot).await?;
    let days_qualifying = sot.values().filter(|v| **v).count();
    tracing::info!(days = written, qualifying = days_qualifying, "stored outcomes");

    let target = feed.fetch_all(target_goal).await?;
    let reconciler =
        Reconciler::new(feed, target_goal, tz).strict_purge(config.sync.strict_purge);

    let stats = if mode == RangeMode::Today {
        if config.sync.strict_purge {
            tracing::warn!("strict purge needs a history run; ignored for today-only");
        }
        let value = sot.get(&today).copied().unwrap_or(false);
        reconciler.reconcile_day(today, value, &target).await?
    } else {
        reconciler.reconcile_history(&sot, &target).await?
    };

    Ok(RunReport {
        range_start: range.start,
        range_end: range.end,
        days_computed: sot.len(),
        days_qualifying,
        stats,
        dry_run: config.sync.dry_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wf_beeminder::{DryRunFeed, MemoryFeed};
    use wf_core::{Datapoint, canonical_comment};

    fn ds(s: &str) -> Daystamp {
        s.parse().unwrap()
    }

    fn session(day: &str, comment: &str) -> Datapoint {
        Datapoint {
            id: Some(format!("fm-{day}-{comment}")),
            daystamp: Some(day.into()),
            value: Some(1.0),
            comment: Some(comment.into()),
            ..Datapoint::default()
        }
    }

    fn config() -> WfConfig {
        let mut config = WfConfig::default();
        config.beeminder.auth_token = "t".into();
        config.sync.history_days = 3;
        config
    }

    async fn store() -> SotDb {
        SotDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn trailing_run_stores_and_reconciles_every_day() {
        let feed = MemoryFeed::new();
        feed.insert("focusmate", session("20250310", "50 minutes session at 8:30"));
        feed.insert("focusmate", session("20250309", "60 minutes session at 9:20"));
        let db = store().await;

        let report = run(&config(), &feed, &db, ds("20250310")).await.unwrap();
        assert_eq!(report.range_start, ds("20250308"));
        assert_eq!(report.range_end, ds("20250310"));
        assert_eq!(report.days_computed, 3);
        assert_eq!(report.days_qualifying, 1);
        assert_eq!(report.stats.creates, 3);

        let stored = db.load_map().await.unwrap();
        assert_eq!(stored.get(&ds("20250310")), Some(&true));
        assert_eq!(stored.get(&ds("20250309")), Some(&false));
        assert_eq!(stored.get(&ds("20250308")), Some(&false));

        let today = feed
            .datapoints("wakeandfocus")
            .into_iter()
            .find(|dp| dp.daystamp.as_deref() == Some("20250310"))
            .unwrap();
        assert_eq!(today.comment_text(), canonical_comment(true, ds("20250310")));
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let feed = MemoryFeed::new();
        feed.insert("focusmate", session("20250310", "50 minutes session at 8:30"));
        let db = store().await;

        run(&config(), &feed, &db, ds("20250310")).await.unwrap();
        feed.clear_calls();
        let report = run(&config(), &feed, &db, ds("20250310")).await.unwrap();

        assert_eq!(report.stats.mutations(), 0);
        assert_eq!(feed.mutation_count(), 0);
    }

    #[tokio::test]
    async fn late_session_flips_stored_outcome() {
        let feed = MemoryFeed::new();
        let db = store().await;
        let mut cfg = config();
        cfg.sync.today_only = true;

        run(&cfg, &feed, &db, ds("20250310")).await.unwrap();
        assert!(!db.get(ds("20250310")).await.unwrap().unwrap().value);

        feed.insert("focusmate", session("20250310", "55 minutes session at 7:00"));
        let report = run(&cfg, &feed, &db, ds("20250310")).await.unwrap();
        assert_eq!(report.stats.updates, 1);
        assert!(db.get(ds("20250310")).await.unwrap().unwrap().value);
    }

    #[tokio::test]
    async fn full_history_without_sessions_covers_today_only() {
        let feed = MemoryFeed::new();
        let db = store().await;
        let mut cfg = config();
        cfg.sync.full_history = true;

        let report = run(&cfg, &feed, &db, ds("20250310")).await.unwrap();
        assert_eq!(report.range_start, ds("20250310"));
        assert_eq!(report.range_end, ds("20250310"));
        assert_eq!(report.days_computed, 1);
    }

    #[tokio::test]
    async fn full_history_reaches_back_to_first_session() {
        let feed = MemoryFeed::new();
        feed.insert("focusmate", session("20250301", "50 minutes session at 8:30"));
        let db = store().await;
        let mut cfg = config();
        cfg.sync.full_history = true;

        let report = run(&cfg, &feed, &db, ds("20250310")).await.unwrap();
        assert_eq!(report.range_start, ds("20250301"));
        assert_eq!(report.days_computed, 10);
        assert_eq!(db.get_all().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn dry_run_stores_outcomes_but_sends_nothing() {
        let inner = MemoryFeed::new();
        inner.insert("focusmate", session("20250310", "50 minutes session at 8:30"));
        let feed = DryRunFeed::new(inner, true);
        let db = store().await;
        let mut cfg = config();
        cfg.sync.dry_run = true;

        let report = run(&cfg, &feed, &db, ds("20250310")).await.unwrap();
        assert!(report.dry_run);
        assert_eq!(report.stats.creates, 3);
        assert_eq!(feed.inner().mutation_count(), 0);
        assert!(feed.inner().datapoints("wakeandfocus").is_empty());
        assert_eq!(db.get_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn today_only_never_purges() {
        let feed = MemoryFeed::new();
        feed.insert(
            "wakeandfocus",
            Datapoint {
                id: Some("old".into()),
                daystamp: Some("20250101".into()),
                value: Some(1.0),
                ..Datapoint::default()
            },
        );
        let db = store().await;
        let mut cfg = config();
        cfg.sync.today_only = true;
        cfg.sync.strict_purge = true;

        let report = run(&cfg, &feed, &db, ds("20250310")).await.unwrap();
        assert_eq!(report.stats.deletes, 0);
        assert_eq!(report.stats.creates, 1);
    }

    #[tokio::test]
    async fn invalid_zone_fails_before_any_call() {
        let feed = MemoryFeed::new();
        let db = store().await;
        let mut cfg = config();
        cfg.sync.timezone = "Mars/Olympus".into();

        let err = run(&cfg, &feed, &db, ds("20250310")).await.unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
        assert!(feed.calls().is_empty());
    }
}
