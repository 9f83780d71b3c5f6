use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// One OAuth2 access grant as issued by the authorization server.
///
/// Fields are private: a token is never edited after it is built, a refresh
/// produces a new value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Token {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
    #[serde(default)]
    created_at: u64,
    // remaining response fields (refresh_token, token_type, ...) are kept
    // so the cache blob mirrors what the server sent
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Token {
    pub fn new(access_token: impl Into<String>, expires_in: u64, created_at: u64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in,
            created_at,
            extra: Map::new(),
        }
    }

    /// Parse a cached blob. Anything that is not a usable token is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let token: Token = serde_json::from_str(raw).ok()?;
        if token.access_token.is_empty() {
            return None;
        }
        Some(token)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(self.expires_in)
    }

    pub fn is_valid_at(&self, now: u64) -> bool {
        self.expires_at() > now
    }
}

/// Token payload returned by the authorization endpoint.
///
/// `created_at` is optional on the wire; the provider stamps it from its
/// clock when the server leaves it out.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub created_at: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenResponse {
    pub fn into_token(self, now: u64) -> Token {
        Token {
            access_token: self.access_token,
            expires_in: self.expires_in,
            created_at: self.created_at.unwrap_or(now),
            extra: self.extra,
        }
    }
}

/// Source of the current time in epoch seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
