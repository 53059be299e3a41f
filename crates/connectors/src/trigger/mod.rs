use crate::error::TriggerError;
use async_trait::async_trait;

pub mod gsearch;
pub mod log_only;

/// Asks the indexing service to rebuild the search document of one object.
#[async_trait]
pub trait UpdateTrigger: Send + Sync {
    async fn notify(&self, id: &str) -> Result<(), TriggerError>;
}

#[async_trait]
impl<T: UpdateTrigger + ?Sized> UpdateTrigger for Box<T> {
    async fn notify(&self, id: &str) -> Result<(), TriggerError> {
        (**self).notify(id).await
    }
}
