//! # wf-core
//!
//! Core types and pure logic for wakefocus.
//!
//! This crate provides the pieces shared by every other wakefocus crate:
//! - [`Daystamp`] calendar-day keys (`YYYYMMDD` in a fixed local zone)
//! - [`Datapoint`], the wire shape of a goal datapoint on either feed
//! - The session comment parser and the wake-and-focus qualification rule
//! - The day-range builder (today, trailing window, full history)
//! - Canonical comment and idempotency-token formatting
//! - Cross-cutting error types

pub mod canonical;
pub mod comment;
pub mod datapoint;
pub mod daystamp;
pub mod errors;
pub mod outcome;
pub mod range;
pub mod rule;

pub use canonical::{canonical_comment, request_id};
pub use comment::{SessionComment, parse_session_comment};
pub use datapoint::{Datapoint, Stamp};
pub use daystamp::{Daystamp, parse_time_zone};
pub use errors::CoreError;
pub use outcome::{SotEntry, SotMap, compute_outcomes, group_by_day};
pub use range::{DayRange, RangeMode, build_range};
pub use rule::QualificationRule;
