use crate::records::record::Record;
use chrono::{DateTime, Utc};

/// One page request against a sorted source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Inclusive lower bound on the last-modified timestamp.
    pub lower_bound: Option<DateTime<Utc>>,
    /// Rows to skip server-side, after sorting and filtering.
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(lower_bound: Option<DateTime<Utc>>, offset: usize, limit: usize) -> Self {
        PageRequest {
            lower_bound,
            offset,
            limit,
        }
    }
}

/// The records returned for one page, in the order the service sorted them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResult {
    pub records: Vec<Record>,
    pub took_ms: u128,
}

impl FetchResult {
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A full page means the service may hold more rows past this one.
    pub fn is_full(&self, limit: usize) -> bool {
        self.records.len() >= limit
    }
}
