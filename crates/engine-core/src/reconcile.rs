use crate::{
    error::ReconcileError, stream::RecordStream, summary::ReconcileSummary,
    trigger::TriggerDispatcher,
};
use connectors::trigger::UpdateTrigger;
use model::records::record::Record;
use std::cmp::Ordering;
use tracing::{debug, info};

/// Log a progress line every this many classifications.
const PROGRESS_INTERVAL: u64 = 100_000;

/// Verdict for one position of the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Only the left side holds this exact `(modified_at, id)` pair.
    LeftOnly(Record),
    /// Only the right side holds this exact `(modified_at, id)` pair.
    RightOnly(Record),
    /// Both sides agree.
    Matched(Record),
}

impl Classification {
    /// The record to re-index, if this position drifted.
    pub fn drifted(&self) -> Option<&Record> {
        match self {
            Classification::LeftOnly(record) | Classification::RightOnly(record) => Some(record),
            Classification::Matched(_) => None,
        }
    }
}

/// Sorted merge-join of two record streams.
///
/// Both inputs must be sorted by `(modified_at, id)`. At each step the head with
/// the smaller key is flagged and advanced; equal heads match and both advance.
/// Once one side runs dry every remaining record on the other is flagged.
pub struct MergeReconciler<L, R> {
    left: L,
    right: R,
    left_head: Option<Record>,
    right_head: Option<Record>,
    primed: bool,
    summary: ReconcileSummary,
}

impl<L: RecordStream, R: RecordStream> MergeReconciler<L, R> {
    pub fn new(left: L, right: R) -> Self {
        Self {
            left,
            right,
            left_head: None,
            right_head: None,
            primed: false,
            summary: ReconcileSummary::default(),
        }
    }

    async fn advance_left(&mut self) -> Result<(), ReconcileError> {
        self.left_head = self
            .left
            .next_record()
            .await
            .map_err(ReconcileError::left)?;
        if self.left_head.is_some() {
            self.summary.left_records += 1;
        }
        Ok(())
    }

    async fn advance_right(&mut self) -> Result<(), ReconcileError> {
        self.right_head = self
            .right
            .next_record()
            .await
            .map_err(ReconcileError::right)?;
        if self.right_head.is_some() {
            self.summary.right_records += 1;
        }
        Ok(())
    }

    /// Classifies the next position, or returns `None` once both sides are done.
    pub async fn step(&mut self) -> Result<Option<Classification>, ReconcileError> {
        if !self.primed {
            self.advance_left().await?;
            self.advance_right().await?;
            self.primed = true;
        }

        let classification = match (self.left_head.take(), self.right_head.take()) {
            (None, None) => return Ok(None),
            (Some(left), None) => {
                self.advance_left().await?;
                Classification::LeftOnly(left)
            }
            (None, Some(right)) => {
                self.advance_right().await?;
                Classification::RightOnly(right)
            }
            (Some(left), Some(right)) => match left.cmp(&right) {
                Ordering::Less => {
                    self.right_head = Some(right);
                    self.advance_left().await?;
                    Classification::LeftOnly(left)
                }
                Ordering::Greater => {
                    self.left_head = Some(left);
                    self.advance_right().await?;
                    Classification::RightOnly(right)
                }
                Ordering::Equal => {
                    self.advance_left().await?;
                    self.advance_right().await?;
                    Classification::Matched(left)
                }
            },
        };

        match &classification {
            Classification::LeftOnly(_) => self.summary.left_only += 1,
            Classification::RightOnly(_) => self.summary.right_only += 1,
            Classification::Matched(_) => self.summary.matched += 1,
        }

        Ok(Some(classification))
    }

    /// Drives the merge to completion, notifying every drifting identifier in
    /// discovery order.
    pub async fn run<T: UpdateTrigger>(
        mut self,
        dispatcher: &mut TriggerDispatcher<T>,
    ) -> Result<ReconcileSummary, ReconcileError> {
        info!(
            left = self.left.name(),
            right = self.right.name(),
            "Starting reconciliation"
        );

        let mut positions = 0u64;
        while let Some(classification) = self.step().await? {
            positions += 1;

            match &classification {
                Classification::LeftOnly(record) => debug!(
                    pid = %record.id,
                    modified_at = %record.modified_at,
                    "{} older or alone, update",
                    self.left.name()
                ),
                Classification::RightOnly(record) => debug!(
                    pid = %record.id,
                    modified_at = %record.modified_at,
                    "{} older or alone, update",
                    self.right.name()
                ),
                Classification::Matched(record) => {
                    debug!(pid = %record.id, "Docs appear equal")
                }
            }

            if let Some(record) = classification.drifted() {
                dispatcher.dispatch(&record.id).await;
            }

            if positions % PROGRESS_INTERVAL == 0 {
                info!(
                    positions,
                    matched = self.summary.matched,
                    drift = self.summary.drift(),
                    "Reconciliation progress"
                );
            }
        }

        let mut summary = self.summary;
        summary.notified = dispatcher.notified();
        summary.notification_failures = dispatcher.failures();

        info!(
            left_records = summary.left_records,
            right_records = summary.right_records,
            matched = summary.matched,
            left_only = summary.left_only,
            right_only = summary.right_only,
            notified = summary.notified,
            notification_failures = summary.notification_failures,
            "Reconciliation finished"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::StreamError, stream::VecStream};
    use async_trait::async_trait;
    use chrono::DateTime;
    use connectors::{error::TriggerError, trigger::log_only::LogOnlyTrigger};

    fn rec(id: &str, secs: i64) -> Record {
        Record::new(id, DateTime::from_timestamp(secs, 0).unwrap())
    }

    async fn classify_all(left: Vec<Record>, right: Vec<Record>) -> Vec<Classification> {
        let mut reconciler =
            MergeReconciler::new(VecStream::new("left", left), VecStream::new("right", right));
        let mut out = Vec::new();
        while let Some(c) = reconciler.step().await.unwrap() {
            out.push(c);
        }
        out
    }

    #[tokio::test]
    async fn identical_inputs_flag_nothing() {
        let records = vec![rec("a", 1), rec("b", 1), rec("c", 2)];
        let result = classify_all(records.clone(), records.clone()).await;

        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|c| c.drifted().is_none()));
    }

    #[tokio::test]
    async fn older_side_is_flagged_first() {
        let result = classify_all(vec![rec("x", 2)], vec![rec("x", 1)]).await;
        assert_eq!(
            result,
            vec![
                Classification::RightOnly(rec("x", 1)),
                Classification::LeftOnly(rec("x", 2)),
            ]
        );
    }

    #[tokio::test]
    async fn equal_timestamps_fall_back_to_identifier_order() {
        let left = vec![rec("a", 1), rec("b", 1)];
        let right = vec![rec("b", 1), rec("c", 1)];

        let result = classify_all(left, right).await;
        assert_eq!(
            result,
            vec![
                Classification::LeftOnly(rec("a", 1)),
                Classification::Matched(rec("b", 1)),
                Classification::RightOnly(rec("c", 1)),
            ]
        );
    }

    #[tokio::test]
    async fn trailing_records_drain_in_order() {
        let left = vec![rec("a", 1), rec("b", 2), rec("c", 3), rec("d", 4)];
        let right = vec![rec("a", 1)];

        let result = classify_all(left, right).await;
        let flagged: Vec<_> = result
            .iter()
            .filter_map(|c| c.drifted().map(|r| r.id.as_str()))
            .collect();
        assert_eq!(flagged, vec!["b", "c", "d"]);
    }

    #[tokio::test]
    async fn flags_the_symmetric_difference_in_key_order() {
        let left = vec![rec("a", 1), rec("b", 3), rec("d", 5), rec("e", 7)];
        let right = vec![rec("b", 3), rec("c", 4), rec("d", 6), rec("e", 7)];

        let result = classify_all(left, right).await;
        let flagged: Vec<Record> = result.iter().filter_map(|c| c.drifted().cloned()).collect();

        assert_eq!(
            flagged,
            vec![rec("a", 1), rec("c", 4), rec("d", 5), rec("d", 6)]
        );
        let mut sorted = flagged.clone();
        sorted.sort();
        assert_eq!(flagged, sorted);
    }

    #[tokio::test]
    async fn empty_inputs_terminate_immediately() {
        assert!(classify_all(Vec::new(), Vec::new()).await.is_empty());
    }

    #[tokio::test]
    async fn run_counts_and_notifies_every_flagged_record() {
        let left = vec![rec("x", 2), rec("y", 3)];
        let right = vec![rec("x", 1), rec("y", 3)];
        let reconciler =
            MergeReconciler::new(VecStream::new("left", left), VecStream::new("right", right));
        let mut dispatcher = TriggerDispatcher::new(LogOnlyTrigger);

        let summary = reconciler.run(&mut dispatcher).await.unwrap();

        assert_eq!(summary.left_records, 2);
        assert_eq!(summary.right_records, 2);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.left_only, 1);
        assert_eq!(summary.right_only, 1);
        assert_eq!(summary.notified, 2);
        assert_eq!(summary.notification_failures, 0);
        assert!(summary.triggered());
    }

    struct BrokenStream;

    #[async_trait]
    impl RecordStream for BrokenStream {
        fn name(&self) -> &str {
            "broken"
        }

        async fn next_record(&mut self) -> Result<Option<Record>, StreamError> {
            Err(StreamError::Stalled {
                stream: "broken".to_string(),
                cursor: Default::default(),
                offset: 0,
            })
        }
    }

    struct FailingTrigger;

    #[async_trait]
    impl UpdateTrigger for FailingTrigger {
        async fn notify(&self, id: &str) -> Result<(), TriggerError> {
            Err(TriggerError::Status {
                id: id.to_string(),
                status: 503,
            })
        }
    }

    #[tokio::test]
    async fn stream_errors_name_the_side() {
        let reconciler = MergeReconciler::new(VecStream::new("left", vec![rec("a", 1)]), BrokenStream);
        let mut dispatcher = TriggerDispatcher::new(LogOnlyTrigger);

        let err = reconciler.run(&mut dispatcher).await.unwrap_err();
        assert_eq!(err.side, crate::error::Side::Right);
        assert!(!dispatcher.invoked());
    }

    #[tokio::test]
    async fn trigger_failures_do_not_stop_the_pass() {
        let reconciler = MergeReconciler::new(
            VecStream::new("left", vec![rec("a", 1), rec("b", 2)]),
            VecStream::new("right", Vec::new()),
        );
        let mut dispatcher = TriggerDispatcher::new(FailingTrigger);

        let summary = reconciler.run(&mut dispatcher).await.unwrap();
        assert_eq!(summary.left_only, 2);
        assert_eq!(summary.notified, 2);
        assert_eq!(summary.notification_failures, 2);
    }
}
