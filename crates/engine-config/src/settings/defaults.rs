//! Out-of-the-box values for a single-host repository stack.

pub const CATALOG_URL: &str = "http://localhost:8080/fedora/risearch";
pub const CATALOG_USER: &str = "fedoraAdmin";
pub const CATALOG_PASSWORD: &str = "islandora";

pub const SOLR_URL: &str = "http://localhost:8080/solr";
pub const SOLR_ID_FIELD: &str = "PID";
pub const SOLR_LAST_MODIFIED_FIELD: &str = "fgs_lastModifiedDate_dt";

pub const TRIGGER_URL: &str = "http://localhost:8080/fedoragsearch/rest";
pub const TRIGGER_USER: &str = "fedoraAdmin";
pub const TRIGGER_PASSWORD: &str = "islandora";

pub const PAGE_SIZE: usize = engine_core::stream::DEFAULT_PAGE_SIZE;
pub const REQUEST_TIMEOUT_SECS: u64 = 300;
pub const FETCH_ATTEMPTS: usize = 3;
