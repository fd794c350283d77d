//! Database schema management for `heating-status`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `devices` table (device locations) and the
/// `thermostat_readings` table queried by `store`. Safe to call on every
/// startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // Device locations used for the outdoor temperature lookup
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS devices (
            device_id BIGINT           PRIMARY KEY,
            lat       DOUBLE PRECISION NOT NULL,
            lon       DOUBLE PRECISION NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Thermostat samples, one row per device and instant
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS thermostat_readings (
            id                 BIGSERIAL        PRIMARY KEY,
            device_id          BIGINT           NOT NULL,
            "timestamp"        TIMESTAMPTZ      NOT NULL,
            actual_temperature DOUBLE PRECISION NOT NULL,
            set_temperature    DOUBLE PRECISION NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Window queries filter by device and time range
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_thermostat_readings_device_ts
            ON thermostat_readings (device_id, "timestamp");
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
