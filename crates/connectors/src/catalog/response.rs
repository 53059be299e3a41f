use crate::error::{FetchError, Service};
use model::records::record::Record;
use serde::Deserialize;

/// URI prefix the resource index puts in front of every object identifier.
pub const OBJECT_URI_PREFIX: &str = "info:fedora/";

#[derive(Debug, Deserialize)]
struct TupleResponse {
    results: Vec<Tuple>,
}

#[derive(Debug, Deserialize)]
struct Tuple {
    obj: String,
    timestamp: String,
}

/// Decodes a JSON tuple response into records, in response order.
pub fn parse_tuples(body: &str) -> Result<Vec<Record>, FetchError> {
    let response: TupleResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::malformed(Service::Catalog, e.to_string()))?;

    response
        .results
        .into_iter()
        .map(|tuple| {
            let id = tuple.obj.strip_prefix(OBJECT_URI_PREFIX).ok_or_else(|| {
                FetchError::malformed(
                    Service::Catalog,
                    format!("object '{}' lacks the {OBJECT_URI_PREFIX} prefix", tuple.obj),
                )
            })?;

            Record::parse(id, &tuple.timestamp)
                .map_err(|e| FetchError::malformed(Service::Catalog, e.to_string()))
        })
        .collect()
}
