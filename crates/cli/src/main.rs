use crate::{commands::Cli, error::CliError};
use chrono::Utc;
use clap::Parser;
use engine_runtime::execution::{executor, outcome::RunOutcome};
use std::process::ExitCode;
use tracing::{error, info};

mod commands;
mod error;
mod logging;
mod output;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbosity());

    match reconcile(&cli).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn reconcile(cli: &Cli) -> Result<RunOutcome, CliError> {
    let settings = cli.settings()?;
    let outcome = executor::run(settings, Utc::now()).await?;

    if let Some(path) = &cli.report {
        output::write_report(&outcome, path).await?;
        info!("Report written to {path}");
    }

    Ok(outcome)
}
