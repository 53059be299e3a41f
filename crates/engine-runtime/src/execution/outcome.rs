use chrono::{DateTime, Utc};
use engine_core::summary::ReconcileSummary;
use serde::Serialize;

/// What a finished pass reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    /// Inclusive lower bound applied to both sides, if any.
    pub window_start: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub summary: ReconcileSummary,
}

impl RunOutcome {
    pub fn new(window_start: Option<DateTime<Utc>>, dry_run: bool, summary: ReconcileSummary) -> Self {
        Self {
            window_start,
            dry_run,
            summary,
        }
    }

    /// `0` when the trigger was never invoked, `1` otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.summary.triggered() { 1 } else { 0 }
    }
}
