use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fmt, fs, path::Path, path::PathBuf, time::Duration};

use crate::client::DEFAULT_AUTH_URL;
use crate::vehicle::DEFAULT_API_URL;

const APP_DIR: &str = "teslacli";

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub auth_url: String,
    pub api_url: String,
    pub token_path: PathBuf,
    pub wake_delay_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            token_path: default_token_path(),
            wake_delay_secs: 30,
            request_timeout_secs: 30,
            user_agent: concat!("teslacli/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AppConfig {
    pub fn wake_delay(&self) -> Duration {
        Duration::from_secs(self.wake_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join("bearer_key.json"))
        .unwrap_or_else(|| PathBuf::from("bearer_key"))
}

/// Load config from `path`, falling back to defaults when the file is absent.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = match path.map(Path::to_path_buf).or_else(config_path) {
        Some(path) => path,
        None => return Ok(AppConfig::default()),
    };

    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    toml::from_str(&data).with_context(|| format!("Failed to parse config from {}", path.display()))
}

/// Account credentials for the password grant. Never written to disk.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .with_context(|| format!("{key} environment variable not set"))
        };

        Ok(Self {
            email: var("TESLA_EMAIL")?,
            password: var("TESLA_PASSWORD")?,
            client_id: var("TESLA_CLIENT_ID")?,
            client_secret: var("TESLA_CLIENT_SECRET")?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
