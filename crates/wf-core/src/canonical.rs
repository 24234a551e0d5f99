//! Canonical strings written to the target goal.
//!
//! Both strings are part of the remote contract: the comment is compared
//! byte-for-byte on every run, and the request id is the idempotency token
//! the remote uses to reject repeated creates.

use crate::daystamp::Daystamp;

/// Version suffix of the idempotency token.
pub const REQUEST_ID_VERSION: &str = "sot-v1";

/// The comment every target datapoint must carry for `day`.
#[must_use]
pub fn canonical_comment(value: bool, day: Daystamp) -> String {
    format!("Auto: SoT={} for {day} (≥50m by 09:15 check).", u8::from(value))
}

/// Deterministic idempotency token for creating `goal`'s datapoint on `day`.
#[must_use]
pub fn request_id(goal: &str, day: Daystamp) -> String {
    format!("{goal}-{day}-{REQUEST_ID_VERSION}")
}
