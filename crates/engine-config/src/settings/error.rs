use thiserror::Error;

/// Errors raised while turning raw options into [`super::validated::ReconcileSettings`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// An endpoint URL could not be parsed.
    #[error("Invalid {name} URL '{url}': {reason}")]
    InvalidUrl {
        name: &'static str,
        url: String,
        reason: String,
    },

    /// Pages must hold at least one row.
    #[error("Page size must be greater than zero")]
    ZeroPageSize,

    /// Requests need a timeout to bound a hung call.
    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,

    /// A field name was configured as an empty string.
    #[error("The {0} field name must not be empty")]
    EmptyField(&'static str),

    /// The window boundary does not fit in a timestamp.
    #[error("Window boundary is out of range: {0}")]
    WindowOutOfRange(String),
}
