use connectors::error::FetchError;
use engine_config::settings::error::SettingsError;
use engine_core::error::ReconcileError;
use thiserror::Error;

/// Top-level errors for a reconciliation run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Setting error.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// A source or the trigger could not be constructed.
    #[error("Connector error: {0}")]
    Connector(#[from] FetchError),

    /// A stream failed mid-pass.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}
