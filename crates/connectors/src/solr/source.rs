use super::{SolrFields, params::form_fields, response::parse_select};
use crate::{
    auth::Credentials,
    error::{FetchError, Service},
    http::{build_client, post_form},
    source::PageSource,
};
use async_trait::async_trait;
use model::pagination::page::{FetchResult, PageRequest};
use reqwest::{Client, Url};
use std::time::{Duration, Instant};
use tracing::debug;

/// Pages through a Solr core sorted by last-modified date and identifier.
pub struct SolrSource {
    client: Client,
    select_url: Url,
    fields: SolrFields,
    credentials: Option<Credentials>,
}

impl SolrSource {
    /// `base` is the core (or default core) URL; requests go to `<base>/select`.
    pub fn new(
        base: &Url,
        fields: SolrFields,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(timeout)?,
            select_url: select_url(base)?,
            fields,
            credentials,
        })
    }
}

/// Appends the `select` handler to a base URL, with or without a trailing slash.
pub fn select_url(base: &Url) -> Result<Url, FetchError> {
    let joined = format!("{}/select", base.as_str().trim_end_matches('/'));
    Url::parse(&joined).map_err(|e| FetchError::malformed(Service::SearchIndex, e.to_string()))
}

#[async_trait]
impl PageSource for SolrSource {
    fn name(&self) -> &str {
        "search-index"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<FetchResult, FetchError> {
        let start = Instant::now();
        let form = form_fields(&self.fields, request);

        let body = post_form(
            &self.client,
            &self.select_url,
            self.credentials.as_ref(),
            &form,
            Service::SearchIndex,
        )
        .await?;
        let records = parse_select(&body, &self.fields)?;

        let took_ms = start.elapsed().as_millis();
        debug!(
            lower_bound = ?request.lower_bound,
            offset = request.offset,
            rows = records.len(),
            took_ms,
            "Fetched search index page"
        );

        Ok(FetchResult { records, took_ms })
    }
}
