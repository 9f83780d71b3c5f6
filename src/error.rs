use reqwest::StatusCode;
use thiserror::Error;

/// Failures of the authorization exchange.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("authorization endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid token response: {0}")]
    InvalidResponse(String),
    #[error("credentials unavailable: {0}")]
    Credentials(String),
}

/// Failures of [`TokenProvider::get_token`](crate::provider::TokenProvider::get_token).
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to read token cache at {location}: {reason}")]
    CacheRead { location: String, reason: String },
    #[error("failed to write token cache at {location}: {reason}")]
    StoreWrite { location: String, reason: String },
    #[error("authorization failed: {0}")]
    Auth(#[from] AuthError),
    /// The exchange succeeded but the token could not be persisted.
    ///
    /// The fresh token is still carried here so the caller can finish the
    /// current run with it; the next process start will have to exchange again.
    #[error("new token was not persisted: {reason}")]
    CacheWrite {
        location: String,
        reason: String,
        access_token: String,
    },
}

impl TokenError {
    /// Token obtained from the server, if this failure happened after the exchange.
    pub fn usable_token(&self) -> Option<&str> {
        match self {
            TokenError::CacheWrite { access_token, .. } => Some(access_token),
            _ => None,
        }
    }
}

/// Failures of owner API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{path} returned {status}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },
    #[error("invalid response from {path}: {reason}")]
    InvalidResponse { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cache_write_carries_a_token() {
        let write = TokenError::CacheWrite {
            location: "bearer_key".to_string(),
            reason: "read-only file system".to_string(),
            access_token: "abc".to_string(),
        };
        assert_eq!(write.usable_token(), Some("abc"));

        let auth = TokenError::Auth(AuthError::InvalidResponse("empty body".to_string()));
        assert_eq!(auth.usable_token(), None);

        let store = TokenError::StoreWrite {
            location: "bearer_key".to_string(),
            reason: "permission denied".to_string(),
        };
        assert_eq!(store.usable_token(), None);
    }

    #[test]
    fn status_error_mentions_code_and_body() {
        let err = AuthError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: "invalid_grant".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("invalid_grant"));
    }
}
