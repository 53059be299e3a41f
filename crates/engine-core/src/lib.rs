pub mod error;
pub mod reconcile;
pub mod retry;
pub mod stream;
pub mod summary;
pub mod trigger;
