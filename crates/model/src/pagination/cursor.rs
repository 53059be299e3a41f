use crate::records::record::Record;
use chrono::{DateTime, Utc};

/// Represents the pagination cursor of one sorted stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cursor {
    /// No record has been yielded yet.
    #[default]
    None,

    /// Composite cursor for TIMESTAMP + identifier (tie-break).
    CompositeTsId { ts: DateTime<Utc>, id: String },
}

impl Cursor {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Cursor::None => None,
            Cursor::CompositeTsId { ts, .. } => Some(*ts),
        }
    }

    /// Inclusive lower bound for the next page request.
    ///
    /// Falls back to the window boundary until the first record has been seen.
    pub fn lower_bound(&self, window: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        self.timestamp().or(window)
    }

    /// Whether `record` sorts strictly after everything yielded so far.
    pub fn admits(&self, record: &Record) -> bool {
        match self {
            Cursor::None => true,
            Cursor::CompositeTsId { ts, id } => record.key() > (ts, id.as_str()),
        }
    }

    /// Moves the cursor onto `record`, which must have been admitted.
    pub fn advance(&mut self, record: &Record) {
        *self = Cursor::CompositeTsId {
            ts: record.modified_at,
            id: record.id.clone(),
        };
    }
}
