use super::UpdateTrigger;
use crate::{
    auth::{Credentials, authorize},
    error::{FetchError, TriggerError},
    http::build_client,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

/// Re-index trigger backed by the GSearch REST servlet.
pub struct GSearchTrigger {
    client: Client,
    url: Url,
    credentials: Option<Credentials>,
}

impl GSearchTrigger {
    pub fn new(
        url: Url,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(timeout)?,
            url,
            credentials,
        })
    }
}

/// Form fields for an `updateIndex` call on one object.
pub fn update_form(id: &str) -> [(&'static str, &str); 3] {
    [
        ("operation", "updateIndex"),
        ("action", "fromPid"),
        ("value", id),
    ]
}

#[async_trait]
impl UpdateTrigger for GSearchTrigger {
    async fn notify(&self, id: &str) -> Result<(), TriggerError> {
        debug!(pid = id, "Attempting to update");

        let request = authorize(
            self.client.post(self.url.clone()).form(&update_form(id)),
            self.credentials.as_ref(),
        );

        let response = request
            .send()
            .await
            .map_err(|source| TriggerError::Transport {
                id: id.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriggerError::Status {
                id: id.to_string(),
                status: status.as_u16(),
            });
        }

        debug!(pid = id, "Updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_form_targets_one_pid() {
        let form = update_form("islandora:42");
        assert_eq!(form[0], ("operation", "updateIndex"));
        assert_eq!(form[1], ("action", "fromPid"));
        assert_eq!(form[2], ("value", "islandora:42"));
    }
}
