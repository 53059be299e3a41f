use crate::error::CliError;
use engine_runtime::execution::outcome::RunOutcome;

fn generate_report_json(outcome: &RunOutcome) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(outcome)?;
    Ok(json)
}

pub async fn write_report(outcome: &RunOutcome, path: &str) -> Result<(), CliError> {
    let report_json = generate_report_json(outcome)?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}
