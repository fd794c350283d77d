//! Reading store access for `heating-status`.
//!
//! Thin query layer over the tables created by `schema`. Returns plain
//! models; deciding what an empty result means is left to the caller.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::{Coordinates, Reading};

// ---

/// Fetch the readings of `device_id` inside `[now - window, now]`, oldest first.
pub async fn recent_readings(
    pool: &PgPool,
    device_id: i64,
    window: Duration,
    now: DateTime<Utc>,
) -> Result<Vec<Reading>, sqlx::Error> {
    // ---
    let since = now - window;

    let readings = sqlx::query_as::<_, Reading>(
        r#"
        SELECT "timestamp", set_temperature, actual_temperature
        FROM thermostat_readings
        WHERE device_id = $1
          AND "timestamp" >= $2
          AND "timestamp" <= $3
        ORDER BY "timestamp" ASC
        "#,
    )
    .bind(device_id)
    .bind(since)
    .bind(now)
    .fetch_all(pool)
    .await?;

    tracing::debug!(
        "Fetched {} readings for device {} since {}",
        readings.len(),
        device_id,
        since
    );
    Ok(readings)
}

/// Look up the coordinates of a device. `None` if the device is unknown.
pub async fn device_coordinates(
    pool: &PgPool,
    device_id: i64,
) -> Result<Option<Coordinates>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, Coordinates>(
        r#"
        SELECT lat, lon
        FROM devices
        WHERE device_id = $1
        "#,
    )
    .bind(device_id)
    .fetch_optional(pool)
    .await
}
