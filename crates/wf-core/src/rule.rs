//! The wake-and-focus qualification rule.
//!
//! A day qualifies when at least one session lasted `min_session_minutes` or
//! longer and started inside the morning window: no earlier than
//! `earliest_hour:00` and no later than the cutoff (both inclusive).

use crate::comment::{SessionComment, parse_session_comment};
use crate::datapoint::Datapoint;

/// Earliest qualifying start hour (local, inclusive).
pub const EARLIEST_HOUR: u32 = 6;
/// Minimum qualifying session length in minutes.
pub const MIN_SESSION_MINUTES: u32 = 50;
/// Latest qualifying start hour (local).
pub const CUTOFF_HOUR: u32 = 9;
/// Latest qualifying start minute within [`CUTOFF_HOUR`] (inclusive).
pub const CUTOFF_MINUTE: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualificationRule {
    pub min_session_minutes: u32,
    pub earliest_hour: u32,
    pub cutoff_hour: u32,
    pub cutoff_minute: u32,
}

impl Default for QualificationRule {
    fn default() -> Self {
        Self {
            min_session_minutes: MIN_SESSION_MINUTES,
            earliest_hour: EARLIEST_HOUR,
            cutoff_hour: CUTOFF_HOUR,
            cutoff_minute: CUTOFF_MINUTE,
        }
    }
}

impl QualificationRule {
    /// Whether a session starting at `hour:minute` falls in the window.
    #[must_use]
    pub const fn qualifies_time(&self, hour: u32, minute: u32) -> bool {
        hour >= self.earliest_hour
            && (hour < self.cutoff_hour
                || (hour == self.cutoff_hour && minute <= self.cutoff_minute))
    }

    #[must_use]
    pub const fn qualifies(&self, session: &SessionComment) -> bool {
        session.minutes >= self.min_session_minutes
            && self.qualifies_time(session.hour, session.minute)
    }

    /// Evaluate one day's session records.
    ///
    /// True iff any record parses and qualifies. Stops at the first
    /// qualifying record; record order never changes the result.
    pub fn evaluate_day<'a, I>(&self, records: I) -> bool
    where
        I: IntoIterator<Item = &'a Datapoint>,
    {
        records.into_iter().any(|dp| {
            let Some(session) = parse_session_comment(dp.comment.as_deref()) else {
                tracing::debug!(
                    id = dp.id.as_deref().unwrap_or("-"),
                    comment = dp.comment_text(),
                    "session comment did not parse; not qualifying"
                );
                return false;
            };
            let qualifies = self.qualifies(&session);
            if qualifies {
                tracing::debug!(
                    minutes = session.minutes,
                    start = %format!("{}:{:02}", session.hour, session.minute),
                    "qualifying session found"
                );
            }
            qualifies
        })
    }
}
