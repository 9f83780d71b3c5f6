use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "https://owner-api.teslamotors.com";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Vehicle {
    pub id: u64,
    pub vin: String,
    /// `null` for cars the owner never named.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Outcome of a vehicle command as reported by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandResult {
    pub result: bool,
    #[serde(default)]
    pub reason: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    response: T,
}

/// Owner API calls made on behalf of an already authenticated user.
pub struct VehicleClient {
    http: Client,
    base_url: String,
    bearer: String,
    wake_delay: Duration,
}

impl VehicleClient {
    pub fn new(http: Client, bearer: impl Into<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_API_URL.to_string(),
            bearer: bearer.into(),
            wake_delay: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Time to wait after a wake-up before talking to the car.
    pub fn with_wake_delay(mut self, delay: Duration) -> Self {
        self.wake_delay = delay;
        self
    }

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, ApiError> {
        self.fetch("/api/1/vehicles", |url| self.http.get(url)).await
    }

    pub async fn wake_up(&self, vehicle_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/1/vehicles/{vehicle_id}/wake_up");
        self.send(&path, self.http.post(self.url(&path))).await?;
        debug!(vehicle_id, "wake up requested");
        Ok(())
    }

    pub async fn vehicle_state(&self, vehicle_id: &str) -> Result<Value, ApiError> {
        self.wake_and_wait(vehicle_id).await?;
        let path = format!("/api/1/vehicles/{vehicle_id}/data_request/vehicle_state");
        self.fetch(&path, |url| self.http.get(url)).await
    }

    pub async fn drive_state(&self, vehicle_id: &str) -> Result<Value, ApiError> {
        self.wake_and_wait(vehicle_id).await?;
        let path = format!("/api/1/vehicles/{vehicle_id}/data_request/drive_state");
        self.fetch(&path, |url| self.http.get(url)).await
    }

    pub async fn set_sentry_mode(
        &self,
        vehicle_id: &str,
        on: bool,
    ) -> Result<CommandResult, ApiError> {
        self.wake_and_wait(vehicle_id).await?;
        let path = format!("/api/1/vehicles/{vehicle_id}/command/set_sentry_mode");
        self.fetch(&path, |url| self.http.post(url).json(&json!({ "on": on })))
            .await
    }

    pub async fn charge_start(&self, vehicle_id: &str) -> Result<CommandResult, ApiError> {
        self.command(vehicle_id, "charge_start").await
    }

    pub async fn charge_stop(&self, vehicle_id: &str) -> Result<CommandResult, ApiError> {
        self.command(vehicle_id, "charge_stop").await
    }

    async fn command(&self, vehicle_id: &str, name: &str) -> Result<CommandResult, ApiError> {
        self.wake_and_wait(vehicle_id).await?;
        let path = format!("/api/1/vehicles/{vehicle_id}/command/{name}");
        self.fetch(&path, |url| self.http.post(url)).await
    }

    async fn wake_and_wait(&self, vehicle_id: &str) -> Result<(), ApiError> {
        self.wake_up(vehicle_id).await?;
        if !self.wake_delay.is_zero() {
            info!(
                vehicle_id,
                delay_secs = self.wake_delay.as_secs(),
                "waiting for vehicle to wake"
            );
            sleep(self.wake_delay).await;
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch<T, F>(&self, path: &str, build: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: FnOnce(String) -> RequestBuilder,
    {
        let body = self.send(path, build(self.url(path))).await?;
        serde_json::from_str::<Envelope<T>>(&body)
            .map(|envelope| envelope.response)
            .map_err(|e| ApiError::InvalidResponse {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<String, ApiError> {
        let res = request.bearer_auth(&self.bearer).send().await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status,
                body,
            });
        }
        Ok(body)
    }
}
