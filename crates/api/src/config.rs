//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the Eventbook API server.
//! It retrieves configuration values from environment variables and provides defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! The following environment variables are used:
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (optional; events are kept in memory when unset)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `PROVIDER_START_TIME`: Start of the working day, `hh:mm` (default: "10:30")
//! - `PROVIDER_END_TIME`: End of the working day, `hh:mm` (default: "15:30")
//! - `PROVIDER_SLOT_MINUTES`: Slot length in minutes (default: 30)
//! - `PROVIDER_TIMEZONE`: IANA timezone of the working hours (default: "Asia/Kolkata")
//! - `PROVIDER_TRAILING_SLOT`: `exclude` or `include` the slot at the window end (default: "exclude")

use chrono::NaiveTime;
use eventbook_core::{
    models::schedule::{ProviderSchedule, TrailingSlot},
    time::{self, hh_mm},
};
use eyre::{Result, WrapErr};
use std::env;
use tracing::Level;

/// Configuration for the Eventbook API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use eventbook_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: Option<String>,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Working hours offered for booking
    pub schedule: ProviderSchedule,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The API_PORT value cannot be parsed as a u16
    /// - Any provider variable is malformed, or the resulting schedule is
    ///   empty or has a non-positive slot length
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // Network settings
        let host = var("API_HOST", "0.0.0.0");
        let port = var("API_PORT", "3000")
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        // Logging settings
        let log_level = match var("LOG_LEVEL", "info").as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS")
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        // Performance settings
        let request_timeout = var("API_REQUEST_TIMEOUT_SECONDS", "30")
            .parse()
            .unwrap_or(30);

        // Provider settings
        let start_time =
            parse_wall_clock("PROVIDER_START_TIME", &var("PROVIDER_START_TIME", "10:30"))?;
        let end_time = parse_wall_clock("PROVIDER_END_TIME", &var("PROVIDER_END_TIME", "15:30"))?;
        let duration_minutes = var("PROVIDER_SLOT_MINUTES", "30")
            .trim()
            .parse::<i64>()
            .wrap_err("Invalid PROVIDER_SLOT_MINUTES value")?;
        let timezone = time::parse_timezone(&var("PROVIDER_TIMEZONE", "Asia/Kolkata"))
            .wrap_err("Invalid PROVIDER_TIMEZONE value")?;
        let trailing = var("PROVIDER_TRAILING_SLOT", "exclude")
            .parse::<TrailingSlot>()
            .wrap_err("Invalid PROVIDER_TRAILING_SLOT value")?;

        let schedule =
            ProviderSchedule::new(start_time, end_time, duration_minutes, timezone, trailing)
                .wrap_err("Invalid provider schedule")?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            schedule,
        })
    }

    /// Returns the server address as a string
    ///
    /// # Returns
    ///
    /// * `String` - Formatted server address (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_wall_clock(key: &str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), hh_mm::FORMAT)
        .wrap_err_with(|| format!("Invalid {} value '{}', expected hh:mm", key, value))
}
