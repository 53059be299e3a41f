use super::error::SettingsError;
use chrono::{DateTime, TimeDelta, Utc};

const SECONDS_PER_DAY: u64 = 24 * 3600;

/// Which slice of history a pass compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// Every object, regardless of age.
    All,
    /// Objects modified within the last `n` days.
    LastNDays(u64),
    /// Objects modified within the last `n` seconds.
    LastNSeconds(u64),
    /// Objects modified at or after a Unix timestamp.
    Since(i64),
}

impl WindowMode {
    /// Resolves the inclusive lower bound of the window relative to `now`.
    ///
    /// The boundary is truncated to whole seconds. `All` has no boundary.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, SettingsError> {
        let epoch_secs = match *self {
            WindowMode::All => return Ok(None),
            WindowMode::LastNDays(days) => {
                let secs = days.checked_mul(SECONDS_PER_DAY).ok_or_else(|| {
                    SettingsError::WindowOutOfRange(format!("{days} days"))
                })?;
                seconds_before(now, secs)?
            }
            WindowMode::LastNSeconds(secs) => seconds_before(now, secs)?,
            WindowMode::Since(epoch_secs) => epoch_secs,
        };

        DateTime::from_timestamp(epoch_secs, 0)
            .map(Some)
            .ok_or_else(|| SettingsError::WindowOutOfRange(format!("{epoch_secs} seconds")))
    }
}

fn seconds_before(now: DateTime<Utc>, secs: u64) -> Result<i64, SettingsError> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| now.checked_sub_signed(delta))
        .map(|ts| ts.timestamp())
        .ok_or_else(|| SettingsError::WindowOutOfRange(format!("{secs} seconds")))
}
