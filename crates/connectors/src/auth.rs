use reqwest::RequestBuilder;
use std::fmt;

/// HTTP basic-auth credentials for one service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: Option<String>) -> Self {
        Credentials {
            user: user.into(),
            password,
        }
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.user, self.password.as_ref())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Attaches credentials to a request when there are any.
pub fn authorize(request: RequestBuilder, credentials: Option<&Credentials>) -> RequestBuilder {
    match credentials {
        Some(credentials) => credentials.apply(request),
        None => request,
    }
}
