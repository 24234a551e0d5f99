//! Day-range builder.
//!
//! Decides which calendar days a run computes and reconciles.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::datapoint::Datapoint;
use crate::daystamp::Daystamp;

/// How far back a run reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    /// Only the current local day.
    Today,
    /// The last `days` days, ending today.
    Trailing { days: u32 },
    /// From the earliest source record through today.
    FullHistory,
}

/// An inclusive, non-empty span of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub start: Daystamp,
    pub end: Daystamp,
}

impl DayRange {
    #[must_use]
    pub const fn single(day: Daystamp) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// Days from `start` to `end`, inclusive.
    pub fn days(self) -> impl Iterator<Item = Daystamp> {
        std::iter::successors(Some(self.start), move |day| {
            day.succ().filter(|next| *next <= self.end)
        })
    }

    /// Number of days covered.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn day_count(self) -> usize {
        (self.end.date() - self.start.date()).num_days() as usize + 1
    }
}

/// Build the range for `mode` ending at `today`.
///
/// `sources` is only consulted for [`RangeMode::FullHistory`]; with no dated
/// source records the range degenerates to `today` alone. A trailing window
/// of zero days is treated as one day.
#[must_use]
pub fn build_range(mode: RangeMode, today: Daystamp, sources: &[Datapoint], tz: Tz) -> DayRange {
    match mode {
        RangeMode::Today => DayRange::single(today),
        RangeMode::Trailing { days } => {
            let back = u64::from(days.max(1) - 1);
            let start = today.minus_days(back).unwrap_or(today);
            DayRange { start, end: today }
        }
        RangeMode::FullHistory => {
            let earliest = sources.iter().filter_map(|dp| dp.day(tz)).min();
            match earliest {
                Some(start) if start < today => DayRange { start, end: today },
                _ => DayRange::single(today),
            }
        }
    }
}
