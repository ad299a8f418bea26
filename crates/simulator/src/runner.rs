//! Fixed-interval send loop.
//!
//! A failed post is logged and the next tick simply sends a fresh batch;
//! nothing is queued or replayed.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::IngestClient;
use crate::profile::{generate_batch, SensorProfile};

/// Run until `cancel` is triggered. The first batch goes out immediately.
pub async fn run(
    client: &IngestClient,
    device_key: &str,
    profiles: &[SensorProfile],
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut sent: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(batches = sent, "Simulator stopping");
                break;
            }
            _ = ticker.tick() => {
                let batch = generate_batch(device_key, profiles, &mut rand::rng());
                match client.send(&batch).await {
                    Ok(stored) => {
                        sent += 1;
                        tracing::info!(device_key, stored, "Readings sent");
                        for r in &batch.readings {
                            tracing::debug!(
                                sensor_type = %r.sensor_type,
                                value = r.value,
                                unit = r.unit,
                                "Reading"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to send readings");
                    }
                }
            }
        }
    }
}
