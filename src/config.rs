//! Configuration loader for the `heating-status` service.
//!
//! All runtime settings and their defaults live here, loaded from environment
//! variables (the caller loads an optional `.env` first). Nothing else in the
//! crate reads `env::var` for configuration.
//!
use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};

pub const DEFAULT_WEATHER_API_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// Immutable after loading; handlers receive a clone through router state.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Forecast API endpoint (Open-Meteo compatible).
    pub weather_api_url: String,

    /// Request timeout for the forecast API, in seconds.
    pub weather_timeout_secs: u32,

    /// Look-back window for readings, in minutes.
    pub readings_window_minutes: u32,

    /// TCP port the HTTP server binds to on all interfaces.
    pub listen_port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `WEATHER_API_URL` – forecast endpoint (default: Open-Meteo)
/// - `WEATHER_TIMEOUT_SECS` – forecast request timeout (default: 5)
/// - `READINGS_WINDOW_MINUTES` – readings look-back (default: 60)
/// - `LISTEN_PORT` – HTTP port (default: 8000)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let weather_api_url =
        env::var("WEATHER_API_URL").unwrap_or_else(|_| DEFAULT_WEATHER_API_URL.to_string());
    let weather_timeout_secs = parse_env_u32!("WEATHER_TIMEOUT_SECS", 5);
    let readings_window_minutes = parse_env_u32!("READINGS_WINDOW_MINUTES", 60);
    let listen_port = u16::try_from(parse_env_u32!("LISTEN_PORT", 8000))
        .map_err(|e| anyhow!("Invalid LISTEN_PORT: {}", e))?;

    if readings_window_minutes == 0 {
        return Err(anyhow!("READINGS_WINDOW_MINUTES must be greater than 0"));
    }

    Ok(Config {
        db_url,
        db_pool_max,
        weather_api_url,
        weather_timeout_secs,
        readings_window_minutes,
        listen_port,
    })
}

impl Config {
    // ---
    pub fn readings_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.readings_window_minutes))
    }

    pub fn weather_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.weather_timeout_secs))
    }

    /// Log the loaded configuration for debugging purposes.
    ///
    /// The database password is masked; every other value is shown as loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL            : {}", self.masked_db_url());
        tracing::info!("  DB_POOL_MAX             : {}", self.db_pool_max);
        tracing::info!("  WEATHER_API_URL         : {}", self.weather_api_url);
        tracing::info!("  WEATHER_TIMEOUT_SECS    : {}", self.weather_timeout_secs);
        tracing::info!("  READINGS_WINDOW_MINUTES : {}", self.readings_window_minutes);
        tracing::info!("  LISTEN_PORT             : {}", self.listen_port);
    }

    /// Database URL with the password replaced by `****`.
    pub fn masked_db_url(&self) -> String {
        // ---
        if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                // `postgres://host@...` has its only colon in the scheme.
                if !self.db_url[colon_pos..].starts_with("://") {
                    return format!(
                        "{}:****{}",
                        &self.db_url[..colon_pos],
                        &self.db_url[at_pos..]
                    );
                }
            }
        }
        self.db_url.clone()
    }
}
