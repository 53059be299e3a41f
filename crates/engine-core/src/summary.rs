use serde::Serialize;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Records pulled from the left (catalog) stream.
    pub left_records: u64,
    /// Records pulled from the right (search index) stream.
    pub right_records: u64,
    /// Pairs present on both sides with the same timestamp.
    pub matched: u64,
    /// Left records with no identical counterpart on the right.
    pub left_only: u64,
    /// Right records with no identical counterpart on the left.
    pub right_only: u64,
    /// Calls made to the update trigger, one per flagged record.
    pub notified: u64,
    /// Notifications the trigger reported as failed.
    pub notification_failures: u64,
}

impl ReconcileSummary {
    /// Records flagged by the merge.
    pub fn drift(&self) -> u64 {
        self.left_only + self.right_only
    }

    /// Whether the update trigger was invoked at least once.
    pub fn triggered(&self) -> bool {
        self.notified > 0
    }
}
