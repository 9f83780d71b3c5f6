use std::sync::Arc;

use tracing::{debug, info};

use crate::client::AuthClient;
use crate::error::{AuthError, TokenError};
use crate::store::TokenStore;
use crate::token::{Clock, SystemClock, Token};

/// Hands out a bearer token, exchanging credentials only when the cached one
/// is missing or expired.
///
/// Every call re-reads the store and re-checks expiry; nothing is remembered
/// in memory between calls.
pub struct TokenProvider {
    client: AuthClient,
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
}

impl TokenProvider {
    pub fn new(client: AuthClient, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Return a currently valid access token.
    ///
    /// A still-valid cached token is returned without touching the network.
    /// Otherwise one exchange is made and its result overwrites the cache.
    /// If that write fails the call fails with [`TokenError::CacheWrite`],
    /// which still carries the new token.
    pub async fn get_token(&self) -> Result<String, TokenError> {
        let now = self.clock.now();

        if let Some(token) = self.cached_token() {
            if token.is_valid_at(now) {
                info!("found stored key");
                return Ok(token.access_token().to_string());
            }
            debug!(expired_at = token.expires_at(), now, "cached token expired");
        }

        let token = self.refresh(now).await?;
        self.persist(&token)?;
        Ok(token.access_token().to_string())
    }

    fn cached_token(&self) -> Option<Token> {
        let raw = match self.store.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(location = %self.store.location(), "no cached token");
                return None;
            }
            Err(err) => {
                debug!(%err, "ignoring unreadable token cache");
                return None;
            }
        };

        let token = Token::parse(&raw);
        if token.is_none() {
            debug!(location = %self.store.location(), "ignoring malformed token cache");
        }
        token
    }

    async fn refresh(&self, now: u64) -> Result<Token, TokenError> {
        let response = self.client.exchange().await?;
        if response.access_token.is_empty() {
            return Err(AuthError::InvalidResponse("empty access_token".to_string()).into());
        }
        let token = response.into_token(now);
        info!(expires_in = token.expires_in(), "obtained new access token");
        Ok(token)
    }

    fn persist(&self, token: &Token) -> Result<(), TokenError> {
        let write_failed = |reason: String| TokenError::CacheWrite {
            location: self.store.location(),
            reason,
            access_token: token.access_token().to_string(),
        };

        let json = token.to_json().map_err(|e| write_failed(e.to_string()))?;
        self.store.save(&json).map_err(|err| write_failed(err.to_string()))?;
        debug!(location = %self.store.location(), "stored new token");
        Ok(())
    }
}
