//! Reading classification against a resolved threshold.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::threshold::ThresholdBounds;

/// Severity of a classified reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl AlertLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertLevel::Normal => "normal",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        }
    }

    pub fn is_alert(self) -> bool {
        self != AlertLevel::Normal
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(AlertLevel::Normal),
            "warning" => Ok(AlertLevel::Warning),
            "critical" => Ok(AlertLevel::Critical),
            other => Err(CoreError::Validation(format!("Unknown alert level: {other}"))),
        }
    }
}

/// Outcome of classifying one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub is_alert: bool,
    pub alert_level: AlertLevel,
    /// Echoed from the threshold.
    pub unit: String,
    /// Empty for normal readings.
    pub message: String,
}

/// Classify `value` against `threshold`.
///
/// Critical bounds are checked before warning bounds and both comparisons are
/// inclusive, so a value sitting exactly on `warning_min` is already a
/// warning. The ideal band is not consulted. NaN and infinities are critical.
pub fn classify(threshold: &ThresholdBounds, value: f64) -> Classification {
    let unit = threshold.unit.clone();
    let sensor = &threshold.sensor_type;

    if !value.is_finite() {
        return Classification {
            is_alert: true,
            alert_level: AlertLevel::Critical,
            message: format!("Invalid {sensor} reading: {value} {unit}"),
            unit,
        };
    }

    let bands = [
        (AlertLevel::Critical, "Critical", threshold.critical_min, threshold.critical_max),
        (AlertLevel::Warning, "Warning", threshold.warning_min, threshold.warning_max),
    ];

    for (level, label, min, max) in bands {
        if value <= min {
            return Classification {
                is_alert: true,
                alert_level: level,
                message: format!("{label} low {sensor}: {value} {unit} (below {min} {unit})"),
                unit,
            };
        }
        if value >= max {
            return Classification {
                is_alert: true,
                alert_level: level,
                message: format!("{label} high {sensor}: {value} {unit} (above {max} {unit})"),
                unit,
            };
        }
    }

    Classification {
        is_alert: false,
        alert_level: AlertLevel::Normal,
        unit,
        message: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorType;
    use crate::threshold::FallbackTable;

    fn temperature() -> ThresholdBounds {
        FallbackTable::builtin()
            .get(SensorType::Temperature)
            .cloned()
            .unwrap()
    }

    fn ph() -> ThresholdBounds {
        FallbackTable::builtin().get(SensorType::Ph).cloned().unwrap()
    }

    #[test]
    fn value_on_critical_min_is_critical_low() {
        let c = classify(&temperature(), 18.0);
        assert_eq!(c.alert_level, AlertLevel::Critical);
        assert!(c.is_alert);
        assert_eq!(c.message, "Critical low temperature: 18 °C (below 18 °C)");
    }

    #[test]
    fn value_on_warning_min_is_warning_low() {
        let c = classify(&temperature(), 20.0);
        assert_eq!(c.alert_level, AlertLevel::Warning);
        assert_eq!(c.message, "Warning low temperature: 20 °C (below 20 °C)");
    }

    #[test]
    fn value_inside_warning_band_is_normal() {
        let c = classify(&temperature(), 25.0);
        assert_eq!(c.alert_level, AlertLevel::Normal);
        assert!(!c.is_alert);
        assert!(c.message.is_empty());
        assert_eq!(c.unit, "°C");
    }

    #[test]
    fn outside_ideal_but_inside_warning_is_still_normal() {
        // Ideal band is 24..28; 21 and 29.5 are outside it.
        assert_eq!(classify(&temperature(), 21.0).alert_level, AlertLevel::Normal);
        assert_eq!(classify(&temperature(), 29.5).alert_level, AlertLevel::Normal);
    }

    #[test]
    fn high_side_messages() {
        let w = classify(&temperature(), 30.0);
        assert_eq!(w.message, "Warning high temperature: 30 °C (above 30 °C)");
        let c = classify(&temperature(), 33.25);
        assert_eq!(c.message, "Critical high temperature: 33.25 °C (above 32 °C)");
    }

    #[test]
    fn ph_above_critical_max() {
        let c = classify(&ph(), 9.2);
        assert_eq!(c.alert_level, AlertLevel::Critical);
        assert_eq!(c.message, "Critical high pH: 9.2 pH (above 9 pH)");
        assert_eq!(c.unit, "pH");
    }

    #[test]
    fn non_finite_values_are_critical() {
        let c = classify(&ph(), f64::NAN);
        assert_eq!(c.alert_level, AlertLevel::Critical);
        assert_eq!(c.message, "Invalid pH reading: NaN pH");

        let c = classify(&ph(), f64::INFINITY);
        assert_eq!(c.alert_level, AlertLevel::Critical);
        assert!(c.message.starts_with("Invalid pH reading"));
    }

    #[test]
    fn generic_threshold_has_empty_unit() {
        let c = classify(&ThresholdBounds::generic("salinity"), 50.0);
        assert_eq!(c.alert_level, AlertLevel::Normal);
        assert!(c.unit.is_empty());
    }

    #[test]
    fn classification_is_pure() {
        let t = ph();
        assert_eq!(classify(&t, 6.4), classify(&t, 6.4));
    }

    #[test]
    fn level_matches_band_membership_across_a_sweep() {
        let t = temperature();
        let mut v = 10.0;
        while v <= 40.0 {
            let c = classify(&t, v);
            let critical = v <= t.critical_min || v >= t.critical_max;
            let warning = !critical && (v <= t.warning_min || v >= t.warning_max);
            let expected = if critical {
                AlertLevel::Critical
            } else if warning {
                AlertLevel::Warning
            } else {
                AlertLevel::Normal
            };
            assert_eq!(c.alert_level, expected, "value {v}");
            assert_eq!(c.is_alert, expected.is_alert());
            v += 0.25;
        }
    }

    #[test]
    fn alert_level_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AlertLevel::Critical).unwrap(),
            "\"critical\""
        );
        assert_eq!("warning".parse::<AlertLevel>().unwrap(), AlertLevel::Warning);
        assert!("severe".parse::<AlertLevel>().is_err());
    }
}
