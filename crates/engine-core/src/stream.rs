use crate::{
    error::StreamError,
    retry::{RetryError, RetryPolicy, classify_fetch_error},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use connectors::source::PageSource;
use model::{
    pagination::{
        cursor::Cursor,
        page::{FetchResult, PageRequest},
    },
    records::record::Record,
};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10_000;

/// A forward-only sequence of records sorted by `(modified_at, id)`.
#[async_trait]
pub trait RecordStream: Send {
    fn name(&self) -> &str;

    /// Pulls the next record, or `None` once the stream is exhausted.
    async fn next_record(&mut self) -> Result<Option<Record>, StreamError>;
}

#[derive(Debug)]
enum StreamState {
    /// The buffer is drained; the next pull issues a page request.
    Fetching,
    /// Records of the last page that sort after the cursor.
    Buffered(VecDeque<Record>),
    /// Terminal. The source has been released.
    Exhausted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub pages_fetched: u64,
    pub records_yielded: u64,
    /// Rows returned again at the inclusive page boundary and dropped.
    pub boundary_rereads: u64,
}

/// Turns a [`PageSource`] into a lazy [`RecordStream`].
///
/// Every page after the first is requested with an inclusive lower bound on the
/// last yielded timestamp, so records sharing that instant are never lost at a
/// page boundary. Rows at or before the cursor are dropped on arrival. While the
/// lower bound stays put, the next request skips every row the service already
/// returned for it, so a tie run longer than a page still moves forward even
/// when the service hands back rows from below the bound.
///
/// Not restartable: build a new stream to iterate again.
pub struct SortedStream<S> {
    name: String,
    source: Option<S>,
    window: Option<DateTime<Utc>>,
    page_size: usize,
    retry: RetryPolicy,
    cursor: Cursor,
    /// Lower bound of the last request and the offset that resumes after it.
    resume: Option<(Option<DateTime<Utc>>, usize)>,
    /// Last row of the previous page that brought nothing new.
    stale_tail: Option<Record>,
    state: StreamState,
    stats: StreamStats,
}

impl<S: PageSource> SortedStream<S> {
    pub fn new(
        source: S,
        window: Option<DateTime<Utc>>,
        page_size: usize,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            name: source.name().to_string(),
            source: Some(source),
            window,
            page_size: page_size.max(1),
            retry,
            cursor: Cursor::None,
            resume: None,
            stale_tail: None,
            state: StreamState::Fetching,
            stats: StreamStats::default(),
        }
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, StreamState::Exhausted)
    }

    async fn pull(&mut self) -> Result<Option<Record>, StreamError> {
        loop {
            match &mut self.state {
                StreamState::Exhausted => return Ok(None),
                StreamState::Buffered(buffer) => match buffer.pop_front() {
                    Some(record) => {
                        self.cursor.advance(&record);
                        self.stats.records_yielded += 1;
                        return Ok(Some(record));
                    }
                    None => self.state = StreamState::Fetching,
                },
                StreamState::Fetching => match self.fetch_next().await {
                    Ok(StreamState::Exhausted) => {
                        self.state = StreamState::Exhausted;
                        self.release();
                    }
                    Ok(next) => self.state = next,
                    Err(err) => {
                        self.state = StreamState::Exhausted;
                        self.release();
                        return Err(err);
                    }
                },
            }
        }
    }

    /// Requests one page and decides the next state from what came back.
    async fn fetch_next(&mut self) -> Result<StreamState, StreamError> {
        let Some(source) = self.source.as_ref() else {
            return Ok(StreamState::Exhausted);
        };

        let lower_bound = self.cursor.lower_bound(self.window);
        let offset = match self.resume {
            Some((bound, offset)) if bound == lower_bound => offset,
            _ => 0,
        };
        let request = PageRequest::new(lower_bound, offset, self.page_size);

        let page = self.fetch_with_retry(source, &request).await?;
        self.stats.pages_fetched += 1;

        if page.is_empty() {
            return Ok(StreamState::Exhausted);
        }

        let full = page.is_full(self.page_size);
        let fetched = page.row_count();
        self.resume = Some((lower_bound, offset + fetched));

        let tail = page.records.last().cloned();
        let fresh: VecDeque<Record> = page
            .records
            .into_iter()
            .filter(|record| self.cursor.admits(record))
            .collect();
        self.stats.boundary_rereads += (fetched - fresh.len()) as u64;

        if !fresh.is_empty() {
            self.stale_tail = None;
            return Ok(StreamState::Buffered(fresh));
        }

        if !full {
            return Ok(StreamState::Exhausted);
        }

        // Sorted rows at a growing offset cannot end on the same row twice.
        if offset > 0 && tail == self.stale_tail {
            return Err(StreamError::Stalled {
                stream: self.name.clone(),
                cursor: self.cursor.clone(),
                offset,
            });
        }

        debug!(
            stream = %self.name,
            cursor = ?self.cursor,
            next_offset = offset + fetched,
            "A full page held only rows already seen, skipping past it"
        );
        self.stale_tail = tail;
        Ok(StreamState::Fetching)
    }

    async fn fetch_with_retry(
        &self,
        source: &S,
        request: &PageRequest,
    ) -> Result<FetchResult, StreamError> {
        match self
            .retry
            .run(|| source.fetch_page(request), classify_fetch_error)
            .await
        {
            Ok(page) => Ok(page),
            Err(RetryError::Fatal(err)) => Err(StreamError::Fetch {
                stream: self.name.clone(),
                cursor: self.cursor.clone(),
                source: err,
            }),
            Err(RetryError::AttemptsExceeded(err)) => Err(StreamError::RetriesExhausted {
                stream: self.name.clone(),
                cursor: self.cursor.clone(),
                source: err,
            }),
        }
    }

    /// Drops the source and its HTTP client.
    fn release(&mut self) {
        if self.source.take().is_some() {
            info!(
                stream = %self.name,
                pages = self.stats.pages_fetched,
                records = self.stats.records_yielded,
                boundary_rereads = self.stats.boundary_rereads,
                "Stream finished"
            );
        }
    }
}

#[async_trait]
impl<S: PageSource> RecordStream for SortedStream<S> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_record(&mut self) -> Result<Option<Record>, StreamError> {
        self.pull().await
    }
}

/// A stream over records already in memory. They must be sorted.
pub struct VecStream {
    name: String,
    records: std::vec::IntoIter<Record>,
}

impl VecStream {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records: records.into_iter(),
        }
    }
}

#[async_trait]
impl RecordStream for VecStream {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_record(&mut self) -> Result<Option<Record>, StreamError> {
        Ok(self.records.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::error::{FetchError, Service};
    use std::sync::Mutex;

    /// Serves sorted records the way the remote services do: inclusive lower
    /// bound, then offset, then limit.
    struct MemorySource {
        records: Vec<Record>,
        requests: Mutex<Vec<PageRequest>>,
        fail_on_call: Option<(usize, u16)>,
        slack_secs: i64,
        ignore_offset: bool,
    }

    impl MemorySource {
        fn new(mut records: Vec<Record>) -> Self {
            records.sort();
            Self {
                records,
                requests: Mutex::new(Vec::new()),
                fail_on_call: None,
                slack_secs: 0,
                ignore_offset: false,
            }
        }

        /// Widens every lower bound by `secs`, re-sending older rows.
        fn with_slack(mut self, secs: i64) -> Self {
            self.slack_secs = secs;
            self
        }

        fn ignoring_offset(mut self) -> Self {
            self.ignore_offset = true;
            self
        }

        fn failing_on(mut self, call: usize, status: u16) -> Self {
            self.fail_on_call = Some((call, status));
            self
        }
    }

    #[async_trait]
    impl<'a> PageSource for &'a MemorySource {
        fn name(&self) -> &str {
            "memory"
        }

        async fn fetch_page(&self, request: &PageRequest) -> Result<FetchResult, FetchError> {
            let call = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(request.clone());
                requests.len()
            };

            if let Some((fail_call, status)) = self.fail_on_call
                && fail_call == call
            {
                return Err(FetchError::Status {
                    service: Service::Catalog,
                    status,
                });
            }

            let slack = chrono::TimeDelta::seconds(self.slack_secs);
            let offset = if self.ignore_offset { 0 } else { request.offset };
            let records = self
                .records
                .iter()
                .filter(|r| request.lower_bound.is_none_or(|lb| r.modified_at >= lb - slack))
                .skip(offset)
                .take(request.limit)
                .cloned()
                .collect();

            Ok(FetchResult {
                records,
                took_ms: 0,
            })
        }
    }

    fn rec(id: &str, secs: i64) -> Record {
        Record::new(id, DateTime::from_timestamp(secs, 0).unwrap())
    }

    async fn drain<S: PageSource>(stream: &mut SortedStream<S>) -> Vec<Record> {
        let mut out = Vec::new();
        while let Some(record) = stream.next_record().await.unwrap() {
            out.push(record);
        }
        out
    }

    #[tokio::test]
    async fn yields_everything_in_order_across_pages() {
        let records: Vec<_> = (0..10).map(|i| rec(&format!("o:{i}"), i)).collect();
        let source = MemorySource::new(records.clone());
        let mut stream = SortedStream::new(&source, None, 3, RetryPolicy::none());

        assert_eq!(drain(&mut stream).await, records);
        assert!(stream.is_exhausted());

        let requests = source.requests.lock().unwrap();
        assert_eq!(requests[0].lower_bound, None);
        assert_eq!(requests[1].lower_bound, Some(records[2].modified_at));
        assert!(requests.iter().all(|r| r.limit == 3));
    }

    #[tokio::test]
    async fn tie_run_spanning_a_page_boundary_is_yielded_once() {
        let records = vec![
            rec("a", 1),
            rec("b", 2),
            rec("c", 2),
            rec("d", 2),
            rec("e", 3),
        ];
        let source = MemorySource::new(records.clone());
        let mut stream = SortedStream::new(&source, None, 2, RetryPolicy::none());

        assert_eq!(drain(&mut stream).await, records);
        assert!(stream.stats().boundary_rereads > 0);
    }

    #[tokio::test]
    async fn tie_run_longer_than_a_page_is_yielded_completely() {
        let mut records = vec![rec("first", 1)];
        records.extend((0..7).map(|i| rec(&format!("t:{i}"), 5)));
        records.push(rec("last", 9));
        let source = MemorySource::new(records.clone());
        let mut stream = SortedStream::new(&source, None, 3, RetryPolicy::none());

        assert_eq!(drain(&mut stream).await, records);

        let requests = source.requests.lock().unwrap();
        assert!(requests.iter().any(|r| r.offset > 0));
    }

    #[tokio::test]
    async fn dense_ties_survive_a_service_that_resends_older_rows() {
        let records: Vec<_> = (0..40).map(|i| rec(&format!("o:{i:02}"), i / 10)).collect();
        let mut expected = records.clone();
        expected.sort();

        for page_size in 1..=7 {
            let source = MemorySource::new(records.clone()).with_slack(1);
            let mut stream = SortedStream::new(&source, None, page_size, RetryPolicy::none());

            assert_eq!(drain(&mut stream).await, expected, "page size {page_size}");
            assert_eq!(stream.stats().records_yielded, 40);
        }
    }

    #[tokio::test]
    async fn service_ignoring_the_offset_is_reported_as_stalled() {
        let records: Vec<_> = (0..6).map(|i| rec(&format!("t:{i}"), 5)).collect();
        let source = MemorySource::new(records).ignoring_offset();
        let mut stream = SortedStream::new(&source, None, 2, RetryPolicy::none());

        assert!(stream.next_record().await.unwrap().is_some());
        assert!(stream.next_record().await.unwrap().is_some());
        let err = stream.next_record().await.unwrap_err();

        assert!(matches!(err, StreamError::Stalled { offset, .. } if offset > 0));
        assert!(err.to_string().contains("not honouring the page offset"));
        assert!(stream.is_exhausted());
    }

    #[tokio::test]
    async fn window_is_the_first_lower_bound() {
        let records = vec![rec("old", 1), rec("edge", 5), rec("new", 9)];
        let source = MemorySource::new(records);
        let window = DateTime::from_timestamp(5, 0);
        let mut stream = SortedStream::new(&source, window, 10, RetryPolicy::none());

        let ids: Vec<_> = drain(&mut stream).await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["edge", "new"]);
        assert_eq!(source.requests.lock().unwrap()[0].lower_bound, window);
    }

    #[tokio::test]
    async fn empty_source_exhausts_after_one_request() {
        let source = MemorySource::new(Vec::new());
        let mut stream = SortedStream::new(&source, None, 10, RetryPolicy::none());

        assert_eq!(stream.next_record().await.unwrap(), None);
        assert_eq!(stream.next_record().await.unwrap(), None);
        assert_eq!(source.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_ends_the_stream_with_an_error() {
        let records: Vec<_> = (0..6).map(|i| rec(&format!("o:{i}"), i)).collect();
        let source = MemorySource::new(records).failing_on(2, 404);
        let mut stream = SortedStream::new(&source, None, 3, RetryPolicy::none());

        for _ in 0..3 {
            assert!(stream.next_record().await.unwrap().is_some());
        }
        let err = stream.next_record().await.unwrap_err();
        assert!(matches!(err, StreamError::Fetch { .. }));
        assert!(stream.is_exhausted());
        assert_eq!(stream.next_record().await.unwrap(), None);
    }

    #[tokio::test]
    async fn transient_failure_is_retried() {
        let records: Vec<_> = (0..4).map(|i| rec(&format!("o:{i}"), i)).collect();
        let source = MemorySource::new(records.clone()).failing_on(1, 503);
        let retry = RetryPolicy::new(2, std::time::Duration::ZERO, std::time::Duration::ZERO);
        let mut stream = SortedStream::new(&source, None, 10, retry);

        assert_eq!(drain(&mut stream).await, records);
    }

    #[tokio::test]
    async fn vec_stream_replays_its_records() {
        let records = vec![rec("a", 1), rec("b", 2)];
        let mut stream = VecStream::new("fixed", records.clone());
        assert_eq!(stream.name(), "fixed");
        assert_eq!(stream.next_record().await.unwrap(), Some(records[0].clone()));
        assert_eq!(stream.next_record().await.unwrap(), Some(records[1].clone()));
        assert_eq!(stream.next_record().await.unwrap(), None);
    }
}
