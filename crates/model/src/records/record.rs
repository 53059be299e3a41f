use crate::core::time::{TimestampError, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

/// One object as seen by either side of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub modified_at: DateTime<Utc>,
}

impl Record {
    pub fn new(id: impl Into<String>, modified_at: DateTime<Utc>) -> Self {
        Record {
            id: id.into(),
            modified_at,
        }
    }

    /// Builds a record from the raw identifier and timestamp strings of a response.
    pub fn parse(id: impl Into<String>, modified_at: &str) -> Result<Self, TimestampError> {
        Ok(Record::new(id, parse_timestamp(modified_at)?))
    }

    /// Sort key shared by both services: timestamp first, identifier as tie-breaker.
    pub fn key(&self) -> (&DateTime<Utc>, &str) {
        (&self.modified_at, self.id.as_str())
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.modified_at.to_rfc3339())
    }
}
