use super::{
    defaults,
    endpoint::Endpoint,
    error::SettingsError,
    window::WindowMode,
};
use chrono::{DateTime, Utc};
use connectors::solr::SolrFields;
use engine_core::retry::RetryPolicy;
use std::time::Duration;

/// Immutable, validated configuration for one reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    /// Resource index queried with SPARQL
    pub catalog: Endpoint,
    /// Solr core holding the derived index
    pub search_index: Endpoint,
    /// Identifier and last-modified field names in the search index
    pub solr_fields: SolrFields,
    /// GSearch REST endpoint asked to re-index drifting objects
    pub trigger: Endpoint,
    /// Slice of history to compare
    pub window: WindowMode,
    /// Rows requested per page on both sides
    pub page_size: usize,
    /// Per-request timeout for every HTTP client
    pub request_timeout: Duration,
    /// Backoff applied to failing page fetches
    pub retry: RetryPolicy,
    /// Whether to log drift without calling the trigger service
    pub dry_run: bool,
}

impl ReconcileSettings {
    pub fn from_builder(builder: ReconcileSettingsBuilder) -> Result<Self, SettingsError> {
        let catalog = builder.catalog.unwrap_or_else(|| {
            RawEndpoint::new(
                defaults::CATALOG_URL,
                Some(defaults::CATALOG_USER.to_string()),
                Some(defaults::CATALOG_PASSWORD.to_string()),
            )
        });
        let search_index = builder
            .search_index
            .unwrap_or_else(|| RawEndpoint::new(defaults::SOLR_URL, None, None));
        let trigger = builder.trigger.unwrap_or_else(|| {
            RawEndpoint::new(
                defaults::TRIGGER_URL,
                Some(defaults::TRIGGER_USER.to_string()),
                Some(defaults::TRIGGER_PASSWORD.to_string()),
            )
        });

        let solr_fields = builder.solr_fields.unwrap_or_default();
        if solr_fields.id.trim().is_empty() {
            return Err(SettingsError::EmptyField("identifier"));
        }
        if solr_fields.last_modified.trim().is_empty() {
            return Err(SettingsError::EmptyField("last-modified"));
        }

        let page_size = builder.page_size.unwrap_or(defaults::PAGE_SIZE);
        if page_size == 0 {
            return Err(SettingsError::ZeroPageSize);
        }

        let request_timeout = builder
            .request_timeout
            .unwrap_or(Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS));
        if request_timeout.is_zero() {
            return Err(SettingsError::ZeroTimeout);
        }

        Ok(Self {
            catalog: catalog.parse("catalog")?,
            search_index: search_index.parse("search index")?,
            solr_fields,
            trigger: trigger.parse("trigger")?,
            window: builder.window.unwrap_or(WindowMode::All),
            page_size,
            request_timeout,
            retry: builder
                .retry
                .unwrap_or_else(|| RetryPolicy::with_attempts(defaults::FETCH_ATTEMPTS)),
            dry_run: builder.dry_run,
        })
    }

    /// Inclusive lower bound both sources are filtered on, if any.
    pub fn window_start(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, SettingsError> {
        self.window.resolve(now)
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[derive(Debug, Clone)]
struct RawEndpoint {
    url: String,
    user: Option<String>,
    password: Option<String>,
}

impl RawEndpoint {
    fn new(url: impl Into<String>, user: Option<String>, password: Option<String>) -> Self {
        Self {
            url: url.into(),
            user,
            password,
        }
    }

    fn parse(self, name: &'static str) -> Result<Endpoint, SettingsError> {
        Endpoint::parse(name, &self.url, self.user, self.password)
    }
}

#[derive(Debug, Default)]
pub struct ReconcileSettingsBuilder {
    catalog: Option<RawEndpoint>,
    search_index: Option<RawEndpoint>,
    solr_fields: Option<SolrFields>,
    trigger: Option<RawEndpoint>,
    window: Option<WindowMode>,
    page_size: Option<usize>,
    request_timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    dry_run: bool,
}

impl ReconcileSettingsBuilder {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn catalog(
        mut self,
        url: impl Into<String>,
        user: Option<String>,
        password: Option<String>,
    ) -> Self {
        self.catalog = Some(RawEndpoint::new(url, user, password));
        self
    }

    pub fn search_index(
        mut self,
        url: impl Into<String>,
        user: Option<String>,
        password: Option<String>,
    ) -> Self {
        self.search_index = Some(RawEndpoint::new(url, user, password));
        self
    }

    pub fn solr_fields(mut self, id: impl Into<String>, last_modified: impl Into<String>) -> Self {
        self.solr_fields = Some(SolrFields {
            id: id.into(),
            last_modified: last_modified.into(),
        });
        self
    }

    pub fn trigger(
        mut self,
        url: impl Into<String>,
        user: Option<String>,
        password: Option<String>,
    ) -> Self {
        self.trigger = Some(RawEndpoint::new(url, user, password));
        self
    }

    pub fn window(mut self, window: WindowMode) -> Self {
        self.window = Some(window);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn build(self) -> Result<ReconcileSettings, SettingsError> {
        ReconcileSettings::from_builder(self)
    }
}
