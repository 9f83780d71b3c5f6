pub mod args;
pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod store;
pub mod token;
pub mod vehicle;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    args::Cli,
    client::AuthClient,
    config::{AppConfig, load_config},
    error::TokenError,
    provider::TokenProvider,
    store::{FileTokenStore, TokenStore},
    vehicle::{CommandResult, VehicleClient},
};

const UNNAMED_VEHICLE: &str = "<unnamed>";

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    init_logging(&args.log_level);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(path) = &args.token_file {
        config.token_path = path.clone();
    }

    let http = http_client(&config)?;
    let store = Arc::new(FileTokenStore::new(config.token_path.clone()));

    if args.clear_token {
        return clear_token(&store);
    }

    let auth = AuthClient::from_env(http.clone()).with_auth_url(&config.auth_url);
    let provider = TokenProvider::new(auth, store);

    let bearer = bearer_token(&provider).await?;

    if args.print_token {
        println!("{bearer}");
        return Ok(());
    }

    let vehicles = VehicleClient::new(http, bearer)
        .with_base_url(&config.api_url)
        .with_wake_delay(config.wake_delay());

    run_commands(&args, &vehicles, &mut std::io::stdout()).await
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn http_client(config: &AppConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .build()
        .context("Failed to build HTTP client")
}

fn clear_token(store: &FileTokenStore) -> Result<()> {
    let existed = store.path().exists();
    store.clear()?;
    if existed {
        println!("Deleted token file at {}", store.path().display());
    } else {
        println!("No token file found to delete.");
    }
    Ok(())
}

/// Resolve a bearer token, keeping a fresh token usable even when it could not be cached.
pub async fn bearer_token(provider: &TokenProvider) -> Result<String> {
    match provider.get_token().await {
        Ok(token) => Ok(token),
        Err(err @ TokenError::CacheWrite { .. }) => {
            warn!(%err, "continuing with a token that was not saved");
            err.usable_token()
                .map(str::to_string)
                .context("token missing from cache write failure")
        }
        Err(err) => Err(err).context("credentials are not available"),
    }
}

/// Run the requested vehicle operations in a fixed order, writing results to `out`.
pub async fn run_commands<W: Write>(
    args: &Cli,
    vehicles: &VehicleClient,
    out: &mut W,
) -> Result<()> {
    if args.list {
        for vehicle in vehicles.list_vehicles().await? {
            writeln!(
                out,
                "{} with VIN: {} and vehicle ID: {}",
                vehicle.display_name.as_deref().unwrap_or(UNNAMED_VEHICLE),
                vehicle.vin,
                vehicle.id
            )?;
        }
    }

    let Some(id) = args.vehicle_id.as_deref() else {
        writeln!(out, "please provide vehicle ID to continue.")?;
        return Ok(());
    };

    if args.state {
        let state = vehicles.vehicle_state(id).await?;
        writeln!(out, "{}", serde_json::to_string_pretty(&state)?)?;
    }
    if args.drive_state {
        let state = vehicles.drive_state(id).await?;
        writeln!(out, "{}", serde_json::to_string_pretty(&state)?)?;
    }
    if args.charging_start {
        let outcome = vehicles.charge_start(id).await?;
        report(out, outcome, "charge successfully started")?;
    }
    if args.charging_stop {
        let outcome = vehicles.charge_stop(id).await?;
        report(out, outcome, "charge successfully stopped")?;
    }
    if args.wake {
        vehicles.wake_up(id).await?;
    }
    if let Some(on) = args.sentry() {
        let outcome = vehicles.set_sentry_mode(id, on).await?;
        report(out, outcome, &format!("sentry mode set to {on}"))?;
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, outcome: CommandResult, success: &str) -> Result<()> {
    if outcome.result {
        info!("{success}");
        writeln!(out, "{success}")?;
    } else {
        warn!(reason = %outcome.reason, "vehicle refused command");
    }
    Ok(())
}
