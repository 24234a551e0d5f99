//! # wf-sync
//!
//! Ties the wakefocus pieces into one run: fetch sessions, compute the
//! per-day outcome, persist it, and reconcile the target goal so exactly
//! one correct datapoint exists per day.

mod error;
pub mod pipeline;
pub mod reconciler;

pub use error::SyncError;
pub use pipeline::{RunReport, run};
pub use reconciler::{ReconcileStats, Reconciler};
