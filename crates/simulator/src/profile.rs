//! Randomized reading generation.
//!
//! Each sensor type has a base value and a symmetric variation. A sample is
//! drawn uniformly from `base ± variation` and rounded to two decimals.
//! The temperature swing is wide enough to cross every alert band.

use aquamon_core::sensor::SensorType;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;

/// Base value and spread for one simulated sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorProfile {
    pub sensor_type: SensorType,
    pub base: f64,
    pub variation: f64,
    pub unit: &'static str,
}

impl SensorProfile {
    /// Draw one value in `[base - variation, base + variation]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let offset = (rng.random::<f64>() * 2.0 - 1.0) * self.variation;
        round2(self.base + offset)
    }
}

pub const PROFILES: [SensorProfile; 7] = [
    SensorProfile {
        sensor_type: SensorType::Temperature,
        base: 26.0,
        variation: 8.0,
        unit: "°C",
    },
    SensorProfile {
        sensor_type: SensorType::Ph,
        base: 7.2,
        variation: 0.3,
        unit: "pH",
    },
    SensorProfile {
        sensor_type: SensorType::DissolvedOxygen,
        base: 6.5,
        variation: 0.5,
        unit: "mg/L",
    },
    SensorProfile {
        sensor_type: SensorType::Conductivity,
        base: 320.0,
        variation: 30.0,
        unit: "μS/cm",
    },
    SensorProfile {
        sensor_type: SensorType::Turbidity,
        base: 5.0,
        variation: 2.0,
        unit: "NTU",
    },
    SensorProfile {
        sensor_type: SensorType::Orp,
        base: 200.0,
        variation: 20.0,
        unit: "mV",
    },
    SensorProfile {
        sensor_type: SensorType::Tds,
        base: 250.0,
        variation: 25.0,
        unit: "PPM",
    },
];

/// One reading as the ingest endpoint expects it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedReading {
    pub sensor_type: SensorType,
    pub value: f64,
    pub timestamp: String,
    /// Display unit for logs; the server assigns the stored unit.
    #[serde(skip)]
    pub unit: &'static str,
}

/// Request body for `POST /api/v1/sensor-data`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingBatch {
    /// External device key.
    pub device_id: String,
    pub readings: Vec<SimulatedReading>,
}

/// Sample every profile once, all stamped with the same time.
pub fn generate_batch<R: Rng + ?Sized>(
    device_key: &str,
    profiles: &[SensorProfile],
    rng: &mut R,
) -> ReadingBatch {
    let timestamp = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    ReadingBatch {
        device_id: device_key.to_string(),
        readings: profiles
            .iter()
            .map(|p| SimulatedReading {
                sensor_type: p.sensor_type,
                value: p.sample(rng),
                timestamp: timestamp.clone(),
                unit: p.unit,
            })
            .collect(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
