use connectors::error::FetchError;
use model::pagination::cursor::Cursor;
use std::fmt;
use thiserror::Error;

/// Errors that end a sorted stream. None of them are recoverable within a pass:
/// a truncated stream would misclassify every record after it.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Fetch from {stream} failed at cursor {cursor:?}: {source}")]
    Fetch {
        stream: String,
        cursor: Cursor,
        #[source]
        source: FetchError,
    },

    #[error("Retry attempts exhausted for {stream} at cursor {cursor:?}: {source}")]
    RetriesExhausted {
        stream: String,
        cursor: Cursor,
        #[source]
        source: FetchError,
    },

    #[error(
        "{stream} returned the same rows at offset {offset} past cursor {cursor:?}; the service is not honouring the page offset"
    )]
    Stalled {
        stream: String,
        cursor: Cursor,
        offset: usize,
    },
}

/// Which input of the merge an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, Error)]
#[error("Reconciliation aborted reading the {side} stream: {source}")]
pub struct ReconcileError {
    pub side: Side,
    #[source]
    pub source: StreamError,
}

impl ReconcileError {
    pub fn left(source: StreamError) -> Self {
        Self {
            side: Side::Left,
            source,
        }
    }

    pub fn right(source: StreamError) -> Self {
        Self {
            side: Side::Right,
            source,
        }
    }
}
