use super::SolrFields;
use chrono::{DateTime, Utc};
use model::{core::time::format_timestamp, pagination::page::PageRequest};

/// Inclusive range filter on the last-modified field.
pub fn range_filter(field: &str, lower_bound: &DateTime<Utc>) -> String {
    format!("{field}:[{} TO *]", format_timestamp(lower_bound))
}

/// Form fields posted to `<solr>/select` for one page.
pub fn form_fields(fields: &SolrFields, request: &PageRequest) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("q", "*:*".to_string()),
        (
            "sort",
            format!("{} asc, {} asc", fields.last_modified, fields.id),
        ),
        ("wt", "json".to_string()),
        ("fl", format!("{} {}", fields.id, fields.last_modified)),
        ("rows", request.limit.to_string()),
        ("start", request.offset.to_string()),
    ];

    if let Some(lower_bound) = &request.lower_bound {
        form.push(("fq", range_filter(&fields.last_modified, lower_bound)));
    }

    form
}
