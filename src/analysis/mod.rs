//! Status analysis engine for a single heating device.
//!
//! Turns a short window of thermostat readings plus an outdoor temperature
//! snapshot into a [`Verdict`]: status, message, metrics and advisory tips.
//! The engine is a pure function; all I/O happens in the callers (`routes`).
//!
//! Pipeline, each stage feeding the next:
//! 1. trend of the actual temperature (OLS slope over sample index)
//! 2. set-point change detection
//! 3. responsiveness to the first set-point change
//! 4. deviation statistics and heating effort
//! 5. indoor/outdoor comparison
//! 6. advisory tips (`rules::collect_tips`)
//! 7. status classification (`rules::classify`)
//!
//! This module is the gateway (EMBP): siblings `rules` and `stats` are
//! internal, callers only see what is re-exported here.
use serde::Serialize;
use thiserror::Error;

use crate::{OutdoorTemperature, Reading};

mod rules;
mod stats;

pub use rules::{Responsiveness, Status, Tip};

use rules::Signals;

/// Minimum number of readings needed for a meaningful regression.
pub const MIN_READINGS: usize = 5;

/// Smallest temperature movement counted as a reaction to a set-point change.
const RESPONSE_THRESHOLD: f64 = 0.3;

// ---

/// Reasons the engine refuses to produce a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no readings available")]
    NoData,

    #[error("not enough readings: {actual} available, {required} required")]
    InsufficientData { required: usize, actual: usize },

    #[error("outdoor temperature unavailable")]
    EnvironmentUnavailable,
}

/// Derived metrics reported alongside the status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    // ---
    pub avg_deviation: f64,
    pub max_deviation: f64,
    pub setpoint_changed: bool,
    pub trend_positive: bool,
    pub heating_effort_estimate: f64,
    pub outside_temperature: f64,
    pub temp_diff_outside: f64,
}

/// Complete result of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    // ---
    pub status: Status,
    pub message: &'static str,
    #[serde(rename = "meta")]
    pub metrics: Metrics,
    pub tips: Vec<Tip>,
}

/// Analyze a time-ordered window of readings against the outdoor temperature.
///
/// Precondition checks run in this order: empty window, short window,
/// missing outdoor value. A short window is reported as
/// [`AnalysisError::InsufficientData`] whatever the outdoor snapshot holds.
pub fn analyze(
    readings: &[Reading],
    outdoor: Option<&OutdoorTemperature>,
) -> Result<Verdict, AnalysisError> {
    // ---
    if readings.is_empty() {
        return Err(AnalysisError::NoData);
    }
    if readings.len() < MIN_READINGS {
        return Err(AnalysisError::InsufficientData {
            required: MIN_READINGS,
            actual: readings.len(),
        });
    }
    let outside_now = outdoor
        .and_then(|o| o.last_temp)
        .ok_or(AnalysisError::EnvironmentUnavailable)?;

    let set_temps: Vec<f64> = readings.iter().map(|r| r.set_temperature).collect();
    let actual_temps: Vec<f64> = readings.iter().map(|r| r.actual_temperature).collect();

    let latest_set = set_temps[set_temps.len() - 1];
    let latest_actual = actual_temps[actual_temps.len() - 1];

    // Stage 1: is the room moving toward its target?
    let slope = stats::ols_slope(&actual_temps);
    let trend_positive = if latest_set > latest_actual {
        slope > 0.0
    } else {
        slope < 0.0
    };

    // Stage 2 + 3
    let change_index = first_change_index(&set_temps);
    let setpoint_changed = change_index.is_some();
    let responsiveness = match change_index {
        Some(ci) => responsiveness(&set_temps, &actual_temps, ci),
        None => Responsiveness::NotEvaluated,
    };

    // Stage 4
    let deviations: Vec<f64> = readings
        .iter()
        .map(|r| (r.set_temperature - r.actual_temperature).abs())
        .collect();
    let max_deviation = deviations.iter().copied().fold(0.0, f64::max);
    let avg_deviation = stats::mean(&deviations);
    let heating_effort = readings
        .iter()
        .map(|r| (r.set_temperature - r.actual_temperature).max(0.0))
        .sum::<f64>()
        / readings.len() as f64;

    // Stage 5
    let temp_diff_outside = latest_actual - outside_now;

    let signals = Signals {
        latest_set,
        latest_actual,
        outside_now,
        temp_diff_outside,
        actual_std_dev: stats::std_dev(&actual_temps),
        avg_deviation,
        max_deviation,
        setpoint_changed,
        trend_positive,
        responsiveness,
    };

    // Stage 6 + 7
    let tips = rules::collect_tips(&signals);
    let (status, message) = rules::classify(&signals);

    tracing::debug!(
        ?status,
        slope,
        ?responsiveness,
        tips = tips.len(),
        "analysis complete"
    );

    Ok(Verdict {
        status,
        message,
        metrics: Metrics {
            avg_deviation: stats::round_to(avg_deviation, 2),
            max_deviation: stats::round_to(max_deviation, 2),
            setpoint_changed,
            trend_positive,
            heating_effort_estimate: stats::round_to(heating_effort, 2),
            outside_temperature: stats::round_to(outside_now, 1),
            temp_diff_outside: stats::round_to(temp_diff_outside, 1),
        },
        tips,
    })
}

// ---

/// Index of the first sample whose set-point differs from its predecessor.
/// Any change makes the set-point series non-constant, so `Some` here is
/// equivalent to "more than one distinct set-point value".
fn first_change_index(set_temps: &[f64]) -> Option<usize> {
    (1..set_temps.len()).find(|&i| set_temps[i] != set_temps[i - 1])
}

/// Compare the pre-change actual temperature with the latest one: the room
/// must have moved past the noise threshold, toward the new set-point.
fn responsiveness(set_temps: &[f64], actual_temps: &[f64], change_index: usize) -> Responsiveness {
    // ---
    let t_before = actual_temps[change_index - 1];
    let t_after = actual_temps[actual_temps.len() - 1];
    let set_after = set_temps[change_index];

    let moved = (t_after - t_before).abs() > RESPONSE_THRESHOLD;
    let right_direction = (set_after - t_before) * (t_after - t_before) > 0.0;

    if moved && right_direction {
        Responsiveness::Responded
    } else {
        Responsiveness::DidNotRespond
    }
}
