use clap::{ArgAction, ArgGroup, Parser};
use engine_config::settings::{
    defaults,
    error::SettingsError,
    validated::{ReconcileSettings, ReconcileSettingsBuilder},
    window::WindowMode,
};
use engine_core::retry::RetryPolicy;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "index-drift",
    version,
    about = "Finds objects whose search-index entry has drifted from the repository and asks GSearch to re-index them"
)]
#[command(group(
    ArgGroup::new("window")
        .required(true)
        .args(["all", "last_n_days", "last_n_seconds", "since"])
))]
pub struct Cli {
    #[arg(long, help = "Compare every object")]
    pub all: bool,

    #[arg(long, value_name = "N", help = "Compare objects modified in the last N days")]
    pub last_n_days: Option<u64>,

    #[arg(long, value_name = "N", help = "Compare objects modified in the last N seconds")]
    pub last_n_seconds: Option<u64>,

    #[arg(long, value_name = "EPOCH", help = "Compare objects modified at or after this Unix timestamp")]
    pub since: Option<i64>,

    #[arg(long, default_value = defaults::CATALOG_URL, help = "Resource index search endpoint")]
    pub ri: String,

    #[arg(long, default_value = defaults::CATALOG_USER)]
    pub ri_user: String,

    #[arg(long, default_value = defaults::CATALOG_PASSWORD)]
    pub ri_pass: String,

    #[arg(long, default_value = defaults::SOLR_URL, help = "Solr core URL; queries go to <url>/select")]
    pub solr: String,

    #[arg(long, help = "Solr basic-auth user, if the core is protected")]
    pub solr_user: Option<String>,

    #[arg(long, requires = "solr_user")]
    pub solr_pass: Option<String>,

    #[arg(long, default_value = defaults::SOLR_LAST_MODIFIED_FIELD)]
    pub solr_last_modified_field: String,

    #[arg(long, default_value = defaults::SOLR_ID_FIELD)]
    pub solr_id_field: String,

    #[arg(long, default_value = defaults::TRIGGER_URL, help = "GSearch REST endpoint")]
    pub gsearch: String,

    #[arg(long, default_value = defaults::TRIGGER_USER)]
    pub gsearch_user: String,

    #[arg(long, default_value = defaults::TRIGGER_PASSWORD)]
    pub gsearch_pass: String,

    #[arg(long, default_value_t = defaults::PAGE_SIZE, help = "Rows requested per page")]
    pub query_limit: usize,

    #[arg(long, default_value_t = defaults::REQUEST_TIMEOUT_SECS, help = "Per-request HTTP timeout")]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = defaults::FETCH_ATTEMPTS, help = "Total attempts per page fetch, the first one included")]
    pub max_attempts: usize,

    #[arg(long, help = "Log drifting objects without calling GSearch")]
    pub dry_run: bool,

    #[arg(long, value_name = "PATH", help = "Write the JSON run report to this file")]
    pub report: Option<String>,

    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet", help = "More output, repeatable")]
    pub verbose: u8,

    #[arg(short, long, action = ArgAction::Count, help = "Less output, repeatable")]
    pub quiet: u8,
}

impl Cli {
    pub fn window(&self) -> WindowMode {
        if let Some(days) = self.last_n_days {
            WindowMode::LastNDays(days)
        } else if let Some(secs) = self.last_n_seconds {
            WindowMode::LastNSeconds(secs)
        } else if let Some(epoch) = self.since {
            WindowMode::Since(epoch)
        } else {
            WindowMode::All
        }
    }

    /// Net verbosity: positive for `-v`, negative for `-q`.
    pub fn verbosity(&self) -> i8 {
        self.verbose.min(2) as i8 - self.quiet.min(3) as i8
    }

    pub fn settings(&self) -> Result<ReconcileSettings, SettingsError> {
        ReconcileSettingsBuilder::new(self.dry_run)
            .catalog(
                &self.ri,
                Some(self.ri_user.clone()),
                Some(self.ri_pass.clone()),
            )
            .search_index(&self.solr, self.solr_user.clone(), self.solr_pass.clone())
            .solr_fields(&self.solr_id_field, &self.solr_last_modified_field)
            .trigger(
                &self.gsearch,
                Some(self.gsearch_user.clone()),
                Some(self.gsearch_pass.clone()),
            )
            .window(self.window())
            .page_size(self.query_limit)
            .request_timeout(Duration::from_secs(self.timeout_secs))
            .retry(RetryPolicy::with_attempts(self.max_attempts))
            .build()
    }
}
