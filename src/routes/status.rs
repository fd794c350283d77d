use std::future::Future;

use axum::{
    extract::Path,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::analysis::{self, AnalysisError, Verdict, MIN_READINGS};
use crate::weather::WeatherClient;
use crate::{store, AppState, OutdoorTemperature, Reading};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/status/{device_id}", get(handler))
}

async fn handler(
    Path(device_id): Path<i64>,
    State((pool, config, weather)): State<AppState>,
) -> Result<Json<Verdict>, StatusError> {
    // ---
    info!("GET /api/status/{} - Starting analysis", device_id);
    let now = Utc::now();

    // Step 1: Readings for the look-back window
    debug!("GET /api/status/{} - Step 1", device_id);

    let readings = store::recent_readings(&pool, device_id, config.readings_window(), now)
        .await
        .map_err(|source| StatusError::Store { device_id, source })?;

    // Step 2: Outdoor temperature, only worth fetching for a usable window
    debug!("GET /api/status/{} - Step 2", device_id);

    let outdoor = outdoor_for_window(&readings, || {
        outdoor_temperature(&pool, &weather, device_id, now)
    })
    .await?;

    // Step 3: Analysis
    debug!("GET /api/status/{} - Step 3", device_id);

    let verdict = analysis::analyze(&readings, outdoor.as_ref())
        .map_err(|kind| StatusError::Analysis { device_id, kind })?;

    info!(
        "Analysis complete for device {}: {:?} ({} tips)",
        device_id,
        verdict.status,
        verdict.tips.len()
    );
    Ok(Json(verdict))
}

// ---

/// Run `fetch` only when the window holds enough readings to be analyzed.
/// A short window fails in the engine regardless of the outdoor value.
async fn outdoor_for_window<F, Fut>(
    readings: &[Reading],
    fetch: F,
) -> Result<Option<OutdoorTemperature>, StatusError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<OutdoorTemperature>, StatusError>>,
{
    // ---
    if readings.len() < MIN_READINGS {
        debug!(
            "Only {} readings, skipping weather lookup",
            readings.len()
        );
        return Ok(None);
    }
    fetch().await
}

/// Resolve the device location and ask the weather provider for a snapshot.
///
/// Provider failures are logged and reported as "no snapshot"; the engine
/// turns that into `EnvironmentUnavailable`. Only store errors propagate.
async fn outdoor_temperature(
    pool: &PgPool,
    weather: &WeatherClient,
    device_id: i64,
    now: DateTime<Utc>,
) -> Result<Option<OutdoorTemperature>, StatusError> {
    // ---
    let coords = store::device_coordinates(pool, device_id)
        .await
        .map_err(|source| StatusError::Store { device_id, source })?;

    let Some(coords) = coords else {
        warn!("No coordinates for device {}, skipping weather lookup", device_id);
        return Ok(None);
    };

    match weather.current_temperature(coords, now).await {
        Ok(snapshot) => Ok(snapshot),
        Err(e) => {
            error!("Failed to fetch weather data for device {}: {:#}", device_id, e);
            Ok(None)
        }
    }
}

/// Failures of the status endpoint, each mapped to one HTTP status.
#[derive(Debug, Error)]
enum StatusError {
    #[error("{kind}")]
    Analysis { device_id: i64, kind: AnalysisError },

    #[error("reading store query failed: {source}")]
    Store {
        device_id: i64,
        #[source]
        source: sqlx::Error,
    },
}

/// JSON body returned with every error status.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    device_id: i64,
}

impl StatusError {
    // ---
    fn status_code(&self) -> StatusCode {
        // ---
        match self {
            StatusError::Analysis { kind, .. } => match kind {
                AnalysisError::NoData => StatusCode::NOT_FOUND,
                AnalysisError::InsufficientData { .. } => StatusCode::BAD_REQUEST,
                AnalysisError::EnvironmentUnavailable => StatusCode::BAD_GATEWAY,
            },
            StatusError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn device_id(&self) -> i64 {
        match self {
            StatusError::Analysis { device_id, .. } | StatusError::Store { device_id, .. } => {
                *device_id
            }
        }
    }

    /// Client-facing text. Store errors stay generic, details go to the log.
    fn client_message(&self) -> String {
        match self {
            StatusError::Analysis { .. } => self.to_string(),
            StatusError::Store { .. } => "failed to read device data".to_string(),
        }
    }
}

impl IntoResponse for StatusError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status_code();
        let device_id = self.device_id();

        match &self {
            StatusError::Store { .. } => error!("GET /api/status/{} - {}", device_id, self),
            StatusError::Analysis { .. } => warn!("GET /api/status/{} - {}", device_id, self),
        }

        let body = ErrorBody {
            error: self.client_message(),
            device_id,
        };
        (status, Json(body)).into_response()
    }
}
