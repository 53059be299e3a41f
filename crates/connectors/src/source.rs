use crate::error::FetchError;
use async_trait::async_trait;
use model::pagination::page::{FetchResult, PageRequest};

/// One side of the comparison: a remote service that can return a page of
/// records sorted ascending by `(modified_at, id)`.
///
/// Implementations must honour `lower_bound` inclusively and apply `offset`
/// after sorting and filtering.
#[async_trait]
pub trait PageSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_page(&self, request: &PageRequest) -> Result<FetchResult, FetchError>;
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<FetchResult, FetchError> {
        (**self).fetch_page(request).await
    }
}
