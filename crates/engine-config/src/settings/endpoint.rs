use super::error::SettingsError;
use connectors::auth::Credentials;
use reqwest::Url;

/// Location and credentials of one remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: Url,
    pub credentials: Option<Credentials>,
}

impl Endpoint {
    /// Parses `url` and attaches basic-auth credentials when a non-empty user is given.
    pub fn parse(
        name: &'static str,
        url: &str,
        user: Option<String>,
        password: Option<String>,
    ) -> Result<Self, SettingsError> {
        let url = Url::parse(url).map_err(|e| SettingsError::InvalidUrl {
            name,
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SettingsError::InvalidUrl {
                name,
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let credentials = user
            .filter(|user| !user.is_empty())
            .map(|user| Credentials::new(user, password));

        Ok(Self { url, credentials })
    }
}
