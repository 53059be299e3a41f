use chrono::{DateTime, Utc};
use connectors::{
    catalog::source::CatalogSource,
    error::FetchError,
    solr::source::SolrSource,
    trigger::{UpdateTrigger, gsearch::GSearchTrigger, log_only::LogOnlyTrigger},
};
use engine_config::settings::validated::ReconcileSettings;
use engine_core::stream::SortedStream;
use tracing::info;

pub fn create_catalog_stream(
    settings: &ReconcileSettings,
    window_start: Option<DateTime<Utc>>,
) -> Result<SortedStream<CatalogSource>, FetchError> {
    let source = CatalogSource::new(
        settings.catalog.url.clone(),
        settings.catalog.credentials.clone(),
        settings.request_timeout,
    )?;
    Ok(SortedStream::new(
        source,
        window_start,
        settings.page_size,
        settings.retry.clone(),
    ))
}

pub fn create_search_index_stream(
    settings: &ReconcileSettings,
    window_start: Option<DateTime<Utc>>,
) -> Result<SortedStream<SolrSource>, FetchError> {
    let source = SolrSource::new(
        &settings.search_index.url,
        settings.solr_fields.clone(),
        settings.search_index.credentials.clone(),
        settings.request_timeout,
    )?;
    Ok(SortedStream::new(
        source,
        window_start,
        settings.page_size,
        settings.retry.clone(),
    ))
}

/// GSearch for real runs, a logging stand-in for dry runs.
pub fn create_trigger(settings: &ReconcileSettings) -> Result<Box<dyn UpdateTrigger>, FetchError> {
    if settings.is_dry_run() {
        info!("Dry run: the update trigger will not be called");
        return Ok(Box::new(LogOnlyTrigger));
    }

    let trigger = GSearchTrigger::new(
        settings.trigger.url.clone(),
        settings.trigger.credentials.clone(),
        settings.request_timeout,
    )?;
    Ok(Box::new(trigger))
}
