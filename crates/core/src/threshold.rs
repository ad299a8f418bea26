//! Threshold bounds, their scopes, and the built-in fallback table.
//!
//! Pure data and validation. Storage lives in the `db` crate; the override
//! chain that picks one threshold for a reading lives in
//! [`crate::resolver`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::sensor::SensorType;
use crate::types::DbId;

/// Lower and upper bound of the generic range used for sensor types that
/// match nothing, not even the built-in table.
pub const GENERIC_MIN: f64 = 0.0;
pub const GENERIC_MAX: f64 = 100.0;

/// The six boundary values and display unit for one sensor type.
///
/// `sensor_type` is kept as the raw name so that a threshold resolved for an
/// unrecognised type can still carry that name into alert messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBounds {
    pub sensor_type: String,
    pub ideal_min: f64,
    pub ideal_max: f64,
    pub warning_min: f64,
    pub warning_max: f64,
    pub critical_min: f64,
    pub critical_max: f64,
    pub unit: String,
}

impl ThresholdBounds {
    /// The permissive `[0, 100]` threshold with an empty unit.
    pub fn generic(sensor_type: &str) -> Self {
        Self {
            sensor_type: sensor_type.to_string(),
            ideal_min: GENERIC_MIN,
            ideal_max: GENERIC_MAX,
            warning_min: GENERIC_MIN,
            warning_max: GENERIC_MAX,
            critical_min: GENERIC_MIN,
            critical_max: GENERIC_MAX,
            unit: String::new(),
        }
    }

    /// Check the write-time invariants of a threshold.
    ///
    /// All bounds must be finite, the unit non-empty, and the bounds nested:
    /// `critical_min <= warning_min <= ideal_min <= ideal_max <= warning_max
    /// <= critical_max`.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.sensor_type.parse::<SensorType>()?;

        if self.unit.trim().is_empty() {
            return Err(CoreError::Validation("unit is required".to_string()));
        }

        let ordered = [
            ("critical_min", self.critical_min),
            ("warning_min", self.warning_min),
            ("ideal_min", self.ideal_min),
            ("ideal_max", self.ideal_max),
            ("warning_max", self.warning_max),
            ("critical_max", self.critical_max),
        ];

        if let Some((name, value)) = ordered.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CoreError::Validation(format!(
                "{name} must be a finite number, got {value}"
            )));
        }

        for pair in ordered.windows(2) {
            let (lo_name, lo) = pair[0];
            let (hi_name, hi) = pair[1];
            if lo > hi {
                return Err(CoreError::Validation(format!(
                    "{lo_name} ({lo}) must not exceed {hi_name} ({hi})"
                )));
            }
        }

        Ok(())
    }
}

/// Where a resolved threshold came from in the override chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    /// Stored threshold bound to the reading's device.
    Device,
    /// Stored threshold bound to the reading's project (no device).
    Project,
    /// Stored global default.
    GlobalDefault,
    /// Built-in table entry; the store had nothing for this type.
    BuiltIn,
    /// Generic `[0, 100]` range; the sensor type matched nothing at all.
    Generic,
}

/// The single threshold that applies to a reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedThreshold {
    /// Database id when the threshold came from the store.
    pub id: Option<DbId>,
    pub source: ThresholdSource,
    #[serde(flatten)]
    pub bounds: ThresholdBounds,
}

// ---------------------------------------------------------------------------
// Built-in defaults
// ---------------------------------------------------------------------------

/// One row of the built-in default table.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinDefault {
    pub sensor_type: SensorType,
    pub ideal_min: f64,
    pub ideal_max: f64,
    pub warning_min: f64,
    pub warning_max: f64,
    pub critical_min: f64,
    pub critical_max: f64,
    pub unit: &'static str,
}

impl BuiltinDefault {
    pub fn to_bounds(&self) -> ThresholdBounds {
        ThresholdBounds {
            sensor_type: self.sensor_type.as_str().to_string(),
            ideal_min: self.ideal_min,
            ideal_max: self.ideal_max,
            warning_min: self.warning_min,
            warning_max: self.warning_max,
            critical_min: self.critical_min,
            critical_max: self.critical_max,
            unit: self.unit.to_string(),
        }
    }
}

/// Factory defaults, one per sensor type. Also the global-default seed.
///
/// The turbidity row does not satisfy the nesting invariant of
/// [`ThresholdBounds::validate`] (its warning floor sits above its ideal
/// floor); it is kept as shipped.
pub const BUILTIN_DEFAULTS: [BuiltinDefault; 7] = [
    BuiltinDefault {
        sensor_type: SensorType::Temperature,
        ideal_min: 24.0,
        ideal_max: 28.0,
        warning_min: 20.0,
        warning_max: 30.0,
        critical_min: 18.0,
        critical_max: 32.0,
        unit: "°C",
    },
    BuiltinDefault {
        sensor_type: SensorType::Ph,
        ideal_min: 7.0,
        ideal_max: 8.0,
        warning_min: 6.5,
        warning_max: 8.5,
        critical_min: 6.0,
        critical_max: 9.0,
        unit: "pH",
    },
    BuiltinDefault {
        sensor_type: SensorType::DissolvedOxygen,
        ideal_min: 6.0,
        ideal_max: 8.0,
        warning_min: 4.0,
        warning_max: 10.0,
        critical_min: 3.0,
        critical_max: 12.0,
        unit: "mg/L",
    },
    BuiltinDefault {
        sensor_type: SensorType::Conductivity,
        ideal_min: 800.0,
        ideal_max: 1500.0,
        warning_min: 500.0,
        warning_max: 2000.0,
        critical_min: 300.0,
        critical_max: 2500.0,
        unit: "μS/cm",
    },
    BuiltinDefault {
        sensor_type: SensorType::Turbidity,
        ideal_min: 0.0,
        ideal_max: 10.0,
        warning_min: 10.0,
        warning_max: 20.0,
        critical_min: 0.0,
        critical_max: 30.0,
        unit: "NTU",
    },
    BuiltinDefault {
        sensor_type: SensorType::Orp,
        ideal_min: 150.0,
        ideal_max: 250.0,
        warning_min: 100.0,
        warning_max: 300.0,
        critical_min: 50.0,
        critical_max: 350.0,
        unit: "mV",
    },
    BuiltinDefault {
        sensor_type: SensorType::Tds,
        ideal_min: 100.0,
        ideal_max: 300.0,
        warning_min: 50.0,
        warning_max: 500.0,
        critical_min: 20.0,
        critical_max: 700.0,
        unit: "PPM",
    },
];

/// Immutable table consulted when the store has no threshold for a type.
///
/// Handed to the resolver at construction so tests can inject their own.
#[derive(Debug, Clone, Default)]
pub struct FallbackTable {
    entries: Vec<(SensorType, ThresholdBounds)>,
}

impl FallbackTable {
    /// The factory defaults from [`BUILTIN_DEFAULTS`].
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_DEFAULTS
                .iter()
                .map(|d| (d.sensor_type, d.to_bounds()))
                .collect(),
        }
    }

    /// A table with no entries; every store miss falls through to generic.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from explicit bounds. Entries whose sensor type does not
    /// parse are rejected; a later entry for the same type replaces an
    /// earlier one.
    pub fn from_bounds(bounds: Vec<ThresholdBounds>) -> Result<Self, CoreError> {
        let mut table = Self::empty();
        for b in bounds {
            let kind = b.sensor_type.parse::<SensorType>()?;
            table.entries.retain(|(t, _)| *t != kind);
            table.entries.push((kind, b));
        }
        Ok(table)
    }

    pub fn get(&self, sensor_type: SensorType) -> Option<&ThresholdBounds> {
        self.entries
            .iter()
            .find(|(t, _)| *t == sensor_type)
            .map(|(_, b)| b)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThresholdBounds> {
        self.entries.iter().map(|(_, b)| b)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
