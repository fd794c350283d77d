//! Data models shared by the store, the weather client and the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// One thermostat sample as stored in `thermostat_readings`.
#[derive(Debug, Clone, PartialEq, Deserialize, sqlx::FromRow)]
pub struct Reading {
    // ---
    pub timestamp: DateTime<Utc>,
    pub set_temperature: f64,
    pub actual_temperature: f64,
}

/// Location of a heating device, used to query the weather provider.
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Outdoor temperature snapshot around `observed_at`.
///
/// `last_temp` is the latest hourly value at or before `observed_at`,
/// `next_temp` the first one after it. Either may be missing when the
/// provider's series does not cover that side of the current hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutdoorTemperature {
    // ---
    pub last_temp: Option<f64>,
    pub next_temp: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_reading_deserializes_store_json() {
        // ---
        let json = r#"{
            "timestamp": "2025-03-26T18:45:00Z",
            "set_temperature": 21.5,
            "actual_temperature": 20.25
        }"#;
        let reading: Reading = serde_json::from_str(json).unwrap();

        assert_eq!(
            reading.timestamp,
            Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap()
        );
        assert_eq!(reading.set_temperature, 21.5);
        assert_eq!(reading.actual_temperature, 20.25);
    }

    #[test]
    fn test_outdoor_temperature_serializes_missing_values_as_null() {
        // ---
        let snapshot = OutdoorTemperature {
            last_temp: Some(4.2),
            next_temp: None,
            observed_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 30, 0).unwrap(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["last_temp"], 4.2);
        assert!(json["next_temp"].is_null());
    }
}
