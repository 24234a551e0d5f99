//! Session comment parser.
//!
//! Source-feed datapoints carry a free-text comment such as
//! `"50 minute session at 8:30"`. Only the leading session length and start
//! time matter; anything after them is ignored.

use std::sync::LazyLock;

use regex::Regex;

static SESSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([0-9]+)\s*minutes?\s+session\s+at\s+([0-9]{1,2}):([0-9]{2})\b")
        .expect("session comment pattern is valid")
});

/// Length and local start time of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionComment {
    pub minutes: u32,
    pub hour: u32,
    pub minute: u32,
}

/// Extract the session length and start time from a comment.
///
/// Returns `None` when the comment is absent, does not match, or names an
/// impossible clock time (hour > 23 or minute > 59). A non-match is not an
/// error; callers treat it as a non-qualifying session.
#[must_use]
pub fn parse_session_comment(comment: Option<&str>) -> Option<SessionComment> {
    let caps = SESSION_RE.captures(comment?)?;
    let minutes = caps[1].parse().ok()?;
    let hour: u32 = caps[2].parse().ok()?;
    let minute: u32 = caps[3].parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(SessionComment {
        minutes,
        hour,
        minute,
    })
}
