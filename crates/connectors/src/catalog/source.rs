use crate::{
    auth::Credentials,
    catalog::{query::form_fields, response::parse_tuples},
    error::{FetchError, Service},
    http::{build_client, post_form},
    source::PageSource,
};
use async_trait::async_trait;
use model::pagination::page::{FetchResult, PageRequest};
use reqwest::{Client, Url};
use std::time::{Duration, Instant};
use tracing::debug;

/// Pages through the resource index with SPARQL tuple queries.
pub struct CatalogSource {
    client: Client,
    url: Url,
    credentials: Option<Credentials>,
}

impl CatalogSource {
    pub fn new(
        url: Url,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(timeout)?,
            url,
            credentials,
        })
    }
}

#[async_trait]
impl PageSource for CatalogSource {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<FetchResult, FetchError> {
        let start = Instant::now();
        let form = form_fields(request);

        let body = post_form(
            &self.client,
            &self.url,
            self.credentials.as_ref(),
            &form,
            Service::Catalog,
        )
        .await?;
        let records = parse_tuples(&body)?;

        let took_ms = start.elapsed().as_millis();
        debug!(
            lower_bound = ?request.lower_bound,
            offset = request.offset,
            rows = records.len(),
            took_ms,
            "Fetched resource index page"
        );

        Ok(FetchResult { records, took_ms })
    }
}
