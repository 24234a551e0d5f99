//! Per-day outcome computation.
//!
//! Outcomes are always recomputed from the full source history for every day
//! in range; nothing is derived incrementally from earlier runs.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::datapoint::Datapoint;
use crate::daystamp::Daystamp;
use crate::range::DayRange;
use crate::rule::QualificationRule;

/// Daystamp → SoT value for the days in scope.
pub type SotMap = BTreeMap<Daystamp, bool>;

/// One persisted SoT row: the last computed outcome for a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SotEntry {
    pub daystamp: Daystamp,
    pub value: bool,
    pub updated_at: DateTime<Utc>,
}

/// Bucket datapoints by local day, preserving fetch order inside each bucket.
///
/// Datapoints with neither a valid daystamp nor a timestamp are dropped.
#[must_use]
pub fn group_by_day(datapoints: &[Datapoint], tz: Tz) -> HashMap<Daystamp, Vec<&Datapoint>> {
    let mut by_day: HashMap<Daystamp, Vec<&Datapoint>> = HashMap::new();
    for dp in datapoints {
        match dp.day(tz) {
            Some(day) => by_day.entry(day).or_default().push(dp),
            None => tracing::debug!(
                id = dp.id.as_deref().unwrap_or("-"),
                "datapoint has no usable day; ignoring"
            ),
        }
    }
    by_day
}

/// Compute the SoT value for every day in `range`.
///
/// Days without any session record are `false`.
#[must_use]
pub fn compute_outcomes(
    sessions: &[Datapoint],
    range: DayRange,
    rule: &QualificationRule,
    tz: Tz,
) -> SotMap {
    let by_day = group_by_day(sessions, tz);
    range
        .days()
        .map(|day| {
            let value = by_day
                .get(&day)
                .is_some_and(|records| rule.evaluate_day(records.iter().copied()));
            (day, value)
        })
        .collect()
}
