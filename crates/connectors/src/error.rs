use std::fmt;
use thiserror::Error;

/// The remote services this crate talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Resource index of the repository (source of truth).
    Catalog,
    /// Solr search index derived from the catalog.
    SearchIndex,
    /// Re-index trigger endpoint.
    Trigger,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Catalog => write!(f, "resource index"),
            Service::SearchIndex => write!(f, "search index"),
            Service::Trigger => write!(f, "update trigger"),
        }
    }
}

/// Errors raised while fetching one page from a query service.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The service answered with a non-success HTTP status.
    #[error("{service} returned HTTP {status}")]
    Status { service: Service, status: u16 },

    /// The request never produced a response (connect, timeout, body read).
    #[error("Request to {service} failed: {source}")]
    Transport {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    /// The response could not be decoded into records.
    #[error("Malformed {service} response: {reason}")]
    Malformed { service: Service, reason: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    pub fn malformed(service: Service, reason: impl Into<String>) -> Self {
        FetchError::Malformed {
            service,
            reason: reason.into(),
        }
    }
}

/// Errors raised by a single re-index notification.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Update trigger returned HTTP {status} for '{id}'")]
    Status { id: String, status: u16 },

    #[error("Update trigger request for '{id}' failed: {source}")]
    Transport {
        id: String,
        #[source]
        source: reqwest::Error,
    },
}
