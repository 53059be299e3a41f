use crate::{
    error::RunError,
    execution::{
        factory::{create_catalog_stream, create_search_index_stream, create_trigger},
        outcome::RunOutcome,
    },
};
use chrono::{DateTime, Utc};
use connectors::trigger::UpdateTrigger;
use engine_config::settings::validated::ReconcileSettings;
use engine_core::{
    error::ReconcileError, reconcile::MergeReconciler, stream::RecordStream,
    summary::ReconcileSummary, trigger::TriggerDispatcher,
};
use model::core::time::format_timestamp;
use tracing::info;

/// Runs one full pass against the configured services.
///
/// `now` anchors relative windows so callers control the clock.
pub async fn run(settings: ReconcileSettings, now: DateTime<Utc>) -> Result<RunOutcome, RunError> {
    ReconcileExecutor::new(settings, now)?.execute().await
}

/// Merges two sorted streams and notifies `trigger` of every drifting identifier.
pub async fn reconcile<L, R, T>(
    left: L,
    right: R,
    trigger: T,
) -> Result<ReconcileSummary, ReconcileError>
where
    L: RecordStream,
    R: RecordStream,
    T: UpdateTrigger,
{
    let mut dispatcher = TriggerDispatcher::new(trigger);
    MergeReconciler::new(left, right).run(&mut dispatcher).await
}

struct ReconcileExecutor {
    settings: ReconcileSettings,
    window_start: Option<DateTime<Utc>>,
}

impl ReconcileExecutor {
    fn new(settings: ReconcileSettings, now: DateTime<Utc>) -> Result<Self, RunError> {
        let window_start = settings.window_start(now)?;
        Ok(Self {
            settings,
            window_start,
        })
    }

    async fn execute(self) -> Result<RunOutcome, RunError> {
        match self.window_start {
            Some(start) => info!(
                window = ?self.settings.window,
                since = %format_timestamp(&start),
                "Reconciling objects modified since window start"
            ),
            None => info!("Reconciling all objects"),
        }
        info!(
            catalog = %self.settings.catalog.url,
            search_index = %self.settings.search_index.url,
            page_size = self.settings.page_size,
            "Opening sources"
        );

        let catalog = create_catalog_stream(&self.settings, self.window_start)?;
        let search_index = create_search_index_stream(&self.settings, self.window_start)?;
        let trigger = create_trigger(&self.settings)?;

        let start_time = std::time::Instant::now();
        let summary = reconcile(catalog, search_index, trigger).await?;

        info!(
            "Pass completed in {:.2}s, {} objects flagged",
            start_time.elapsed().as_secs_f64(),
            summary.notified
        );

        Ok(RunOutcome::new(
            self.window_start,
            self.settings.is_dry_run(),
            summary,
        ))
    }
}
