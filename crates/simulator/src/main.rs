//! `aquamon-simulator` -- posts randomized readings for one device.
//!
//! # Environment variables
//!
//! | Variable                  | Required | Default                 | Description                     |
//! |---------------------------|----------|-------------------------|---------------------------------|
//! | `SIMULATOR_API_KEY`       | yes      | --                      | Project API key (`x-api-key`)   |
//! | `SIMULATOR_API_URL`       | no       | `http://localhost:3000` | Server root                     |
//! | `SIMULATOR_DEVICE_KEY`    | no       | `IUB002`                | Device key the readings claim   |
//! | `SIMULATOR_INTERVAL_SECS` | no       | `5`                     | Seconds between batches         |

use std::time::Duration;

use aquamon_simulator::client::IngestClient;
use aquamon_simulator::profile::PROFILES;
use aquamon_simulator::runner;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_DEVICE_KEY: &str = "IUB002";
const DEFAULT_INTERVAL_SECS: u64 = 5;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aquamon_simulator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_key = std::env::var("SIMULATOR_API_KEY").unwrap_or_else(|_| {
        tracing::error!("SIMULATOR_API_KEY environment variable is required");
        std::process::exit(1);
    });

    let api_url =
        std::env::var("SIMULATOR_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let device_key =
        std::env::var("SIMULATOR_DEVICE_KEY").unwrap_or_else(|_| DEFAULT_DEVICE_KEY.to_string());

    let interval_secs: u64 = std::env::var("SIMULATOR_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_INTERVAL_SECS);

    let client = IngestClient::new(&api_url, api_key).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });

    tracing::info!(
        url = %client.url(),
        device_key = %device_key,
        interval_secs,
        "Starting aquamon-simulator",
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C");
            on_signal.cancel();
        }
    });

    runner::run(
        &client,
        &device_key,
        &PROFILES,
        Duration::from_secs(interval_secs),
        cancel,
    )
    .await;
}
