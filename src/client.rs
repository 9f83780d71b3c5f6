use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::Credentials;
use crate::error::AuthError;
use crate::token::TokenResponse;

pub const DEFAULT_AUTH_URL: &str = "https://owner-api.teslamotors.com/oauth/token";

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Where the exchange gets its credentials from.
///
/// `Lookup` is only consulted when an exchange actually happens, so a valid
/// cached token never needs the variables to be set.
#[derive(Clone)]
enum CredentialSource {
    Fixed(Credentials),
    Lookup(Lookup),
}

impl CredentialSource {
    fn resolve(&self) -> Result<Credentials, AuthError> {
        match self {
            CredentialSource::Fixed(credentials) => Ok(credentials.clone()),
            CredentialSource::Lookup(lookup) => Credentials::from_lookup(|key| (**lookup)(key))
                .map_err(|e| AuthError::Credentials(e.to_string())),
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Fixed(credentials) => {
                f.debug_tuple("Fixed").field(credentials).finish()
            }
            CredentialSource::Lookup(_) => f.write_str("Lookup"),
        }
    }
}

/// Password-grant exchange against the authorization endpoint.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    auth_url: String,
    credentials: CredentialSource,
}

impl AuthClient {
    pub fn new(http: Client, credentials: Credentials) -> Self {
        Self::with_source(http, CredentialSource::Fixed(credentials))
    }

    /// Read `TESLA_*` variables from the process environment at exchange time.
    pub fn from_env(http: Client) -> Self {
        Self::with_lookup(http, |key| std::env::var(key).ok())
    }

    pub fn with_lookup<F>(http: Client, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self::with_source(http, CredentialSource::Lookup(Arc::new(lookup)))
    }

    fn with_source(http: Client, credentials: CredentialSource) -> Self {
        Self {
            http,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            credentials,
        }
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    /// One POST, no retry. Any transport, status or decoding problem is returned as is.
    pub(crate) async fn exchange(&self) -> Result<TokenResponse, AuthError> {
        let credentials = self.credentials.resolve()?;
        let body = TokenRequest {
            grant_type: "password",
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
            email: &credentials.email,
            password: &credentials.password,
        };

        debug!(url = %self.auth_url, "requesting access token");
        let res = self.http.post(&self.auth_url).json(&body).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!(%status, "token exchange rejected");
            return Err(AuthError::Status { status, body });
        }

        let text = res.text().await?;
        serde_json::from_str(&text).map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }
}
