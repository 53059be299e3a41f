//! Search-index side of the comparison, paged through Solr's select handler.

pub mod params;
pub mod response;
pub mod source;

/// Field names a Solr core uses for the identifier and the last-modified date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolrFields {
    pub id: String,
    pub last_modified: String,
}

impl Default for SolrFields {
    fn default() -> Self {
        Self {
            id: "PID".to_string(),
            last_modified: "fgs_lastModifiedDate_dt".to_string(),
        }
    }
}
