use chrono::{DateTime, Utc};
use model::{core::time::format_timestamp, pagination::page::PageRequest};

const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

/// Renders the `FILTER` line bounding `?timestamp` from below (inclusive).
pub fn timestamp_filter(lower_bound: &DateTime<Utc>) -> String {
    format!(
        "FILTER(?timestamp >= \"{}\"^^<{XSD_DATE_TIME}>)",
        format_timestamp(lower_bound)
    )
}

/// Renders the tuple query for one page.
///
/// Selects active objects that are not content models or service definitions,
/// sorted the same way the merge consumes them.
pub fn render_query(request: &PageRequest) -> String {
    let filter = request
        .lower_bound
        .as_ref()
        .map(timestamp_filter)
        .unwrap_or_default();

    let mut query = format!(
        r#"
SELECT ?obj ?timestamp
FROM <#ri>
WHERE {{
  ?obj <fedora-model:hasModel> <info:fedora/fedora-system:FedoraObject-3.0> ;
       <fedora-model:state> <fedora-model:Active> ;
       <fedora-view:lastModifiedDate> ?timestamp .
  OPTIONAL {{
    ?obj <fedora-view:disseminates> ?exclude .
    {{
      ?exclude <fedora-view:disseminationType> <info:fedora/*/DS-COMPOSITE-MODEL> .
    }} UNION {{
      ?exclude <fedora-view:disseminationType> <info:fedora/*/METHODMAP> .
    }}
  }}
  FILTER(!bound(?exclude))
  {filter}
}}
ORDER BY ?timestamp ?obj
"#
    );

    if request.offset > 0 {
        query.push_str(&format!("OFFSET {}\n", request.offset));
    }

    query
}

/// Form fields posted to the resource-index search endpoint.
pub fn form_fields(request: &PageRequest) -> Vec<(&'static str, String)> {
    vec![
        ("type", "tuples".to_string()),
        ("format", "json".to_string()),
        ("lang", "sparql".to_string()),
        ("query", render_query(request)),
        ("limit", request.limit.to_string()),
    ]
}
