//! Outdoor temperature lookup against an Open-Meteo compatible forecast API.
//!
//! The API is asked for the hourly `temperature_2m` series covering the
//! previous, current and next hour. From that series the latest point at or
//! before `now` becomes `last_temp` and the first point after `now` becomes
//! `next_temp`.

use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::{Coordinates, OutdoorTemperature};

/// Hour precision the API expects for `start_hour` / `end_hour`.
const HOUR_FORMAT: &str = "%Y-%m-%dT%H:00";

/// Timestamp format of the `hourly.time` entries (local time of the
/// requested timezone, which is always UTC here).
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

// ---

#[derive(Debug, Default, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    hourly: HourlySeries,
}

#[derive(Debug, Default, Deserialize)]
struct HourlySeries {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
}

/// HTTP client for the forecast API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
    // ---
    pub fn new(base_url: impl Into<String>, timeout: StdDuration) -> Result<Self> {
        // ---
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build weather HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Fetch the outdoor temperature snapshot for `coords` around `now`.
    ///
    /// `Ok(None)` means the provider answered but had no usable series.
    pub async fn current_temperature(
        &self,
        coords: Coordinates,
        now: DateTime<Utc>,
    ) -> Result<Option<OutdoorTemperature>> {
        // ---
        let start_hour = (now - Duration::hours(1)).format(HOUR_FORMAT).to_string();
        let end_hour = (now + Duration::hours(1)).format(HOUR_FORMAT).to_string();

        tracing::debug!(
            "Fetching outdoor temperature for ({}, {}) from {} to {}",
            coords.lat,
            coords.lon,
            start_hour,
            end_hour
        );

        let response: ForecastResponse = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", coords.lat.to_string()),
                ("longitude", coords.lon.to_string()),
                ("hourly", "temperature_2m".to_string()),
                ("start_hour", start_hour),
                ("end_hour", end_hour),
                ("timezone", "UTC".to_string()),
            ])
            .send()
            .await
            .context("Weather request failed")?
            .error_for_status()
            .context("Weather API returned an error status")?
            .json()
            .await
            .context("Failed to decode weather response")?;

        select_snapshot(&response.hourly, now)
    }
}

/// Pick the past and future points around `now` from an hourly series.
///
/// Points with a `null` temperature are skipped. Returns `Ok(None)` when the
/// series is empty; fails only on malformed timestamps.
fn select_snapshot(series: &HourlySeries, now: DateTime<Utc>) -> Result<Option<OutdoorTemperature>> {
    // ---
    if series.time.is_empty() || series.temperature_2m.is_empty() {
        return Ok(None);
    }

    let mut points = series
        .time
        .iter()
        .zip(&series.temperature_2m)
        .filter_map(|(t, temp)| temp.map(|temp| (t, temp)))
        .map(|(t, temp)| {
            NaiveDateTime::parse_from_str(t, TIME_FORMAT)
                .map(|naive| (naive.and_utc(), temp))
                .with_context(|| format!("Invalid hourly timestamp '{}'", t))
        })
        .collect::<Result<Vec<_>>>()?;

    points.sort_by_key(|&(t, _)| t);

    let last_temp = points.iter().rev().find(|(t, _)| *t <= now).map(|&(_, v)| v);
    let next_temp = points.iter().find(|(t, _)| *t > now).map(|&(_, v)| v);

    Ok(Some(OutdoorTemperature {
        last_temp: last_temp.map(round_1),
        next_temp: next_temp.map(round_1),
        observed_at: now,
    }))
}

/// One decimal, exact ties to even.
fn round_1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn series(points: &[(&str, Option<f64>)]) -> HourlySeries {
        // ---
        HourlySeries {
            time: points.iter().map(|(t, _)| t.to_string()).collect(),
            temperature_2m: points.iter().map(|(_, v)| *v).collect(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 20, 0).unwrap()
    }

    #[test]
    fn test_selects_last_past_and_first_future_point() {
        // ---
        let hourly = series(&[
            ("2025-01-15T10:00", Some(6.04)),
            ("2025-01-15T08:00", Some(3.9)),
            ("2025-01-15T09:00", Some(4.66)),
            ("2025-01-15T11:00", Some(7.0)),
        ]);
        let snapshot = select_snapshot(&hourly, now()).unwrap().unwrap();

        assert_eq!(snapshot.last_temp, Some(4.7));
        assert_eq!(snapshot.next_temp, Some(6.0));
        assert_eq!(snapshot.observed_at, now());
    }

    #[test]
    fn test_point_at_now_counts_as_past() {
        // ---
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
        let hourly = series(&[("2025-01-15T09:00", Some(2.0)), ("2025-01-15T10:00", Some(3.0))]);
        let snapshot = select_snapshot(&hourly, at).unwrap().unwrap();

        assert_eq!(snapshot.last_temp, Some(2.0));
        assert_eq!(snapshot.next_temp, Some(3.0));
    }

    #[test]
    fn test_missing_sides_and_null_values() {
        // ---
        let future_only = series(&[("2025-01-15T10:00", Some(1.0))]);
        let snapshot = select_snapshot(&future_only, now()).unwrap().unwrap();
        assert_eq!(snapshot.last_temp, None);
        assert_eq!(snapshot.next_temp, Some(1.0));

        let null_past = series(&[
            ("2025-01-15T08:00", Some(-1.25)),
            ("2025-01-15T09:00", None),
        ]);
        let snapshot = select_snapshot(&null_past, now()).unwrap().unwrap();
        // -1.25 is an exact tie and rounds to the even neighbour.
        assert_eq!(snapshot.last_temp, Some(-1.2));
        assert_eq!(snapshot.next_temp, None);
    }

    #[test]
    fn test_empty_series_has_no_snapshot() {
        // ---
        assert!(select_snapshot(&HourlySeries::default(), now()).unwrap().is_none());

        let response: ForecastResponse = serde_json::from_str("{}").unwrap();
        assert!(select_snapshot(&response.hourly, now()).unwrap().is_none());
    }

    #[test]
    fn test_malformed_timestamp_is_an_error() {
        // ---
        let hourly = series(&[("yesterday", Some(1.0))]);
        assert!(select_snapshot(&hourly, now()).is_err());
    }

    #[test]
    fn test_decodes_provider_payload() {
        // ---
        let body = r#"{
            "latitude": 52.52,
            "longitude": 13.42,
            "hourly_units": { "time": "iso8601", "temperature_2m": "°C" },
            "hourly": {
                "time": ["2025-01-15T08:00", "2025-01-15T09:00", "2025-01-15T10:00"],
                "temperature_2m": [1.2, null, 2.8]
            }
        }"#;
        let response: ForecastResponse = serde_json::from_str(body).unwrap();
        let snapshot = select_snapshot(&response.hourly, now()).unwrap().unwrap();

        assert_eq!(snapshot.last_temp, Some(1.2));
        assert_eq!(snapshot.next_temp, Some(2.8));
    }

    #[test]
    fn test_unreachable_provider_reports_error() {
        // ---
        let client = WeatherClient::new(
            "http://127.0.0.1:9/v1/forecast",
            StdDuration::from_secs(2),
        )
        .unwrap();
        let coords = Coordinates {
            lat: 52.52,
            lon: 13.42,
        };

        let result = tokio_test::block_on(client.current_temperature(coords, now()));
        assert!(result.is_err());
    }
}
