use crate::{
    auth::{Credentials, authorize},
    error::{FetchError, Service},
};
use reqwest::{Client, Url};
use std::time::Duration;

/// Builds the client owned by one source or trigger.
pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(FetchError::Client)
}

/// POSTs a urlencoded form and returns the body of a 2xx response as text.
///
/// The body is read as text and decoded by the caller, since the services do
/// not reliably label their JSON with the right content type.
pub async fn post_form(
    client: &Client,
    url: &Url,
    credentials: Option<&Credentials>,
    form: &[(&str, String)],
    service: Service,
) -> Result<String, FetchError> {
    let request = authorize(client.post(url.clone()).form(form), credentials);

    let response = request
        .send()
        .await
        .map_err(|source| FetchError::Transport { service, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            service,
            status: status.as_u16(),
        });
    }

    response
        .text()
        .await
        .map_err(|source| FetchError::Transport { service, source })
}
