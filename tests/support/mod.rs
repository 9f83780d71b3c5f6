#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use teslacli::config::Credentials;
use teslacli::error::TokenError;
use teslacli::store::TokenStore;
use teslacli::token::Clock;

pub const NOW: u64 = 1_700_000_000;

#[derive(Default)]
pub struct InMemoryTokenStore {
    data: Mutex<Option<String>>,
    saves: AtomicUsize,
    fail_saves: bool,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(raw: &str) -> Self {
        let store = Self::new();
        *store.data.lock().expect("store lock poisoned") = Some(raw.to_string());
        store
    }

    pub fn read_only(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn contents(&self) -> Option<String> {
        self.data.lock().expect("store lock poisoned").clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenError> {
        Ok(self.contents())
    }

    fn save(&self, data: &str) -> Result<(), TokenError> {
        if self.fail_saves {
            return Err(TokenError::StoreWrite {
                location: self.location(),
                reason: "read-only".to_string(),
            });
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.data.lock().expect("store lock poisoned") = Some(data.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenError> {
        *self.data.lock().expect("store lock poisoned") = None;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Store whose reads always fail, as a permission error would.
pub struct UnreadableTokenStore;

impl TokenStore for UnreadableTokenStore {
    fn load(&self) -> Result<Option<String>, TokenError> {
        Err(TokenError::CacheRead {
            location: self.location(),
            reason: "permission denied".to_string(),
        })
    }

    fn save(&self, _data: &str) -> Result<(), TokenError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenError> {
        Ok(())
    }

    fn location(&self) -> String {
        "unreadable".to_string()
    }
}

pub struct FixedClock(AtomicU64);

impl FixedClock {
    pub fn at(now: u64) -> Self {
        Self(AtomicU64::new(now))
    }

    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        email: "owner@example.com".to_string(),
        password: "hunter2".to_string(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
    }
}

pub fn cached(access_token: &str, expires_in: u64, created_at: u64) -> String {
    serde_json::json!({
        "access_token": access_token,
        "expires_in": expires_in,
        "created_at": created_at,
    })
    .to_string()
}
