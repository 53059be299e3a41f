use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

/// Layout accepted for timestamps that carry no UTC offset.
const NAIVE_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid timestamp '{value}'")]
pub struct TimestampError {
    pub value: String,
}

/// Parses an ISO-8601 instant as reported by the catalog or the search index.
///
/// Values with an explicit offset are normalised to UTC. Values without one are
/// taken to be UTC already. Fractional seconds are kept at full precision since
/// ties between the two sides are decided on exact equality.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(trimmed, NAIVE_LAYOUT)
        .map(|naive| naive.and_utc())
        .map_err(|_| TimestampError {
            value: value.to_string(),
        })
}

/// Renders an instant for use in an outbound query filter.
///
/// Always `Z`-suffixed, with only as many fractional digits as the instant needs.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
