use async_trait::async_trait;
use chrono::DateTime;
use connectors::{
    error::{FetchError, Service, TriggerError},
    source::PageSource,
    trigger::UpdateTrigger,
};
use engine_core::{retry::RetryPolicy, stream::SortedStream};
use model::{
    core::time::format_timestamp,
    pagination::page::{FetchResult, PageRequest},
    records::record::Record,
};
use serde_json::json;
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

pub fn rec(id: &str, secs: i64) -> Record {
    Record::new(id, DateTime::from_timestamp(secs, 0).unwrap())
}

/// In-memory stand-in for a sorted remote service.
///
/// Applies the inclusive lower bound, then offset, then limit, like the real
/// services do. `slack` widens the lower bound to mimic a server that
/// re-sends rows from before the cursor.
pub struct MemorySource {
    name: String,
    records: Vec<Record>,
    requests: Arc<Mutex<Vec<PageRequest>>>,
    failures: Vec<(usize, u16)>,
    slack_secs: i64,
}

impl MemorySource {
    pub fn new(name: &str, mut records: Vec<Record>) -> Self {
        records.sort();
        Self {
            name: name.to_string(),
            records,
            requests: Arc::new(Mutex::new(Vec::new())),
            failures: Vec::new(),
            slack_secs: 0,
        }
    }

    /// Fails the `call`-th request (1-based) with `status`.
    pub fn failing_on(mut self, call: usize, status: u16) -> Self {
        self.failures.push((call, status));
        self
    }

    pub fn with_slack(mut self, secs: i64) -> Self {
        self.slack_secs = secs;
        self
    }

    /// Shared log of the requests this source has received.
    pub fn request_log(&self) -> Arc<Mutex<Vec<PageRequest>>> {
        self.requests.clone()
    }

    pub fn into_stream(self, page_size: usize, retry: RetryPolicy) -> SortedStream<Self> {
        SortedStream::new(self, None, page_size, retry)
    }
}

#[async_trait]
impl PageSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<FetchResult, FetchError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if let Some((_, status)) = self.failures.iter().find(|(n, _)| *n == call) {
            return Err(FetchError::Status {
                service: Service::Catalog,
                status: *status,
            });
        }

        let floor = request
            .lower_bound
            .map(|lb| lb - chrono::TimeDelta::seconds(self.slack_secs));

        let records = self
            .records
            .iter()
            .filter(|r| floor.is_none_or(|lb| r.modified_at >= lb))
            .skip(request.offset)
            .take(request.limit)
            .cloned()
            .collect();

        Ok(FetchResult {
            records,
            took_ms: 0,
        })
    }
}

/// Remembers every identifier it is asked to update.
#[derive(Clone, Default)]
pub struct RecordingTrigger {
    calls: Arc<Mutex<Vec<String>>>,
    failing: HashSet<String>,
}

impl RecordingTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports failure for these identifiers, after recording the call.
    pub fn failing_for(mut self, ids: &[&str]) -> Self {
        self.failing = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateTrigger for RecordingTrigger {
    async fn notify(&self, id: &str) -> Result<(), TriggerError> {
        self.calls.lock().unwrap().push(id.to_string());
        if self.failing.contains(id) {
            return Err(TriggerError::Status {
                id: id.to_string(),
                status: 500,
            });
        }
        Ok(())
    }
}

/// A resource-index tuple response holding `records`.
pub fn catalog_body(records: &[Record]) -> String {
    let results: Vec<_> = records
        .iter()
        .map(|r| {
            json!({
                "obj": format!("info:fedora/{}", r.id),
                "timestamp": format_timestamp(&r.modified_at),
            })
        })
        .collect();
    json!({ "results": results }).to_string()
}

/// A Solr select response holding `records` under the default field names.
pub fn solr_body(records: &[Record]) -> String {
    let docs: Vec<_> = records
        .iter()
        .map(|r| {
            json!({
                "PID": r.id,
                "fgs_lastModifiedDate_dt": format_timestamp(&r.modified_at),
            })
        })
        .collect();
    json!({
        "responseHeader": { "status": 0 },
        "response": { "numFound": records.len(), "start": 0, "docs": docs },
    })
    .to_string()
}
