//! The closed set of sensor types a RAS device can report.
//!
//! Wire and database representations use the names the field devices send
//! (`"pH"`, `"dissolvedOxygen"`, ...), so the enum is (de)serialized with
//! explicit renames rather than a blanket case conversion.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A water-quality sensor category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorType {
    #[serde(rename = "temperature")]
    Temperature,
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "dissolvedOxygen")]
    DissolvedOxygen,
    #[serde(rename = "conductivity")]
    Conductivity,
    #[serde(rename = "turbidity")]
    Turbidity,
    #[serde(rename = "orp")]
    Orp,
    #[serde(rename = "tds")]
    Tds,
}

impl SensorType {
    /// Every supported sensor type, in display order.
    pub const ALL: [SensorType; 7] = [
        SensorType::Temperature,
        SensorType::Ph,
        SensorType::DissolvedOxygen,
        SensorType::Conductivity,
        SensorType::Turbidity,
        SensorType::Orp,
        SensorType::Tds,
    ];

    /// The canonical name stored in the database and sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Ph => "pH",
            SensorType::DissolvedOxygen => "dissolvedOxygen",
            SensorType::Conductivity => "conductivity",
            SensorType::Turbidity => "turbidity",
            SensorType::Orp => "orp",
            SensorType::Tds => "tds",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorType {
    type Err = CoreError;

    /// Parse a canonical sensor type name. Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown sensor type: {s}")))
    }
}

/// Parse a list of sensor type names, rejecting the whole list on the first
/// unknown entry.
pub fn parse_sensor_types(names: &[String]) -> Result<Vec<SensorType>, CoreError> {
    names.iter().map(|n| n.parse()).collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn round_trips_every_canonical_name() {
        for t in SensorType::ALL {
            assert_eq!(t.as_str().parse::<SensorType>().unwrap(), t);
        }
    }

    #[test]
    fn rejects_unknown_and_miscased_names() {
        assert_matches!("ammonia".parse::<SensorType>(), Err(CoreError::Validation(_)));
        assert_matches!("ph".parse::<SensorType>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&SensorType::DissolvedOxygen).unwrap();
        assert_eq!(json, "\"dissolvedOxygen\"");
        let parsed: SensorType = serde_json::from_str("\"pH\"").unwrap();
        assert_eq!(parsed, SensorType::Ph);
    }

    #[test]
    fn parse_list_fails_on_any_unknown_entry() {
        let ok = parse_sensor_types(&["pH".to_string(), "tds".to_string()]).unwrap();
        assert_eq!(ok, vec![SensorType::Ph, SensorType::Tds]);

        let bad = parse_sensor_types(&["pH".to_string(), "nitrate".to_string()]);
        assert!(bad.is_err());
    }
}
