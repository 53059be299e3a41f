use super::UpdateTrigger;
use crate::error::TriggerError;
use async_trait::async_trait;
use tracing::info;

/// Dry-run trigger: reports what would be re-indexed and touches nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyTrigger;

#[async_trait]
impl UpdateTrigger for LogOnlyTrigger {
    async fn notify(&self, id: &str) -> Result<(), TriggerError> {
        info!(pid = id, "Dry run, would update");
        Ok(())
    }
}
