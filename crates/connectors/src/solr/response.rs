use super::SolrFields;
use crate::error::{FetchError, Service};
use model::records::record::Record;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: ResultSet,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    #[serde(rename = "numFound")]
    num_found: u64,
    #[serde(default)]
    docs: Vec<Map<String, Value>>,
}

fn string_field<'a>(doc: &'a Map<String, Value>, field: &str) -> Result<&'a str, FetchError> {
    doc.get(field).and_then(Value::as_str).ok_or_else(|| {
        FetchError::malformed(
            Service::SearchIndex,
            format!("document lacks a string '{field}' field"),
        )
    })
}

/// Decodes a select response into records, in response order.
///
/// A zero `numFound` is an empty page regardless of what `docs` holds.
pub fn parse_select(body: &str, fields: &SolrFields) -> Result<Vec<Record>, FetchError> {
    let response: SelectResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::malformed(Service::SearchIndex, e.to_string()))?;

    if response.response.num_found == 0 {
        return Ok(Vec::new());
    }

    response
        .response
        .docs
        .iter()
        .map(|doc| {
            let id = string_field(doc, &fields.id)?;
            let modified_at = string_field(doc, &fields.last_modified)?;
            Record::parse(id, modified_at)
                .map_err(|e| FetchError::malformed(Service::SearchIndex, e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_configured_fields() {
        let body = r#"{"responseHeader":{"status":0},"response":{"numFound":2,"start":0,"docs":[
            {"PID":"a:1","fgs_lastModifiedDate_dt":"2020-01-01T00:00:00Z"},
            {"PID":"a:2","fgs_lastModifiedDate_dt":"2020-01-01T00:00:00.5Z"}
        ]}}"#;

        let records = parse_select(body, &SolrFields::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a:1");
        assert!(records[0].modified_at < records[1].modified_at);
    }

    #[test]
    fn zero_matches_is_an_empty_page() {
        let body = r#"{"response":{"numFound":0,"start":0,"docs":[]}}"#;
        assert!(parse_select(body, &SolrFields::default()).unwrap().is_empty());
    }

    #[test]
    fn missing_fields_are_malformed() {
        let body = r#"{"response":{"numFound":1,"docs":[{"PID":"a:1"}]}}"#;
        let err = parse_select(body, &SolrFields::default()).unwrap_err();
        assert!(matches!(
            err,
            FetchError::Malformed {
                service: Service::SearchIndex,
                ..
            }
        ));

        let numeric_id = r#"{"response":{"numFound":1,"docs":[{"PID":5,"fgs_lastModifiedDate_dt":"2020-01-01T00:00:00Z"}]}}"#;
        assert!(parse_select(numeric_id, &SolrFields::default()).is_err());
    }

    #[test]
    fn rejects_non_json_bodies() {
        assert!(parse_select("Service Unavailable", &SolrFields::default()).is_err());
    }
}
