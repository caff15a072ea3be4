//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `BIND_ADDR` - Listen address (default: 127.0.0.1:3000)
//! - `DATABASE_PATH` - SQLite file (default: markets.sqlite3)
//! - `SCHEMA_PATH` - Schema applied at startup (default: sql/schema.sql)
//! - `GOOGLE_MAPS_API_KEY` - Enables geocoding and the map; both are off without it
//! - `GEOCODE_DEBOUNCE_MS` - Quiet interval before a forward geocode (default: 1000)
//! - `GEOCODE_TIMEOUT_SECS` - Geocoding HTTP timeout (default: 10)
//! - `MAX_WORKERS` - HTTP worker threads (default: 8)
//! - `PUBLIC_BASE_URL` - Origin used in emailed sign-in links (default: http://127.0.0.1:3000)
//! - `BREVO_API_KEY` - Sends sign-in links by email
//! - `MAIL_SENDER_EMAIL` / `MAIL_SENDER_NAME` - From address for sign-in emails
//! - `LOG_SIGN_IN_LINKS` - Local development only: without `BREVO_API_KEY`, write
//!   sign-in links to the log instead of refusing sign-in (default: false)

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::debounce::DEFAULT_QUIET_INTERVAL;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: String,
    pub schema_path: String,
    pub google_maps_api_key: Option<String>,
    pub geocode_debounce: Duration,
    pub geocode_timeout: Duration,
    pub max_workers: usize,
    pub public_base_url: String,
    pub brevo_api_key: Option<String>,
    pub mail_sender_email: String,
    pub mail_sender_name: String,
    pub log_sign_in_links: bool,
}

// Keep API keys out of logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("schema_path", &self.schema_path)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("geocode_debounce", &self.geocode_debounce)
            .field("geocode_timeout", &self.geocode_timeout)
            .field("max_workers", &self.max_workers)
            .field("public_base_url", &self.public_base_url)
            .field("brevo_api_key", &self.brevo_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("mail_sender_email", &self.mail_sender_email)
            .field("mail_sender_name", &self.mail_sender_name)
            .field("log_sign_in_links", &self.log_sign_in_links)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_path: "markets.sqlite3".to_string(),
            schema_path: "sql/schema.sql".to_string(),
            google_maps_api_key: None,
            geocode_debounce: DEFAULT_QUIET_INTERVAL,
            geocode_timeout: Duration::from_secs(10),
            max_workers: 8,
            public_base_url: "http://127.0.0.1:3000".to_string(),
            brevo_api_key: None,
            mail_sender_email: "noreply@dutchmarkets.nl".to_string(),
            mail_sender_name: "Dutch Markets".to_string(),
            log_sign_in_links: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Self {
            bind_addr: parse_or(get("BIND_ADDR"), "BIND_ADDR", defaults.bind_addr)?,
            database_path: get("DATABASE_PATH").unwrap_or(defaults.database_path),
            schema_path: get("SCHEMA_PATH").unwrap_or(defaults.schema_path),
            google_maps_api_key: get("GOOGLE_MAPS_API_KEY"),
            geocode_debounce: match get("GEOCODE_DEBOUNCE_MS") {
                Some(ms) => Duration::from_millis(parse_or(Some(ms), "GEOCODE_DEBOUNCE_MS", 0)?),
                None => defaults.geocode_debounce,
            },
            geocode_timeout: Duration::from_secs(parse_or(
                get("GEOCODE_TIMEOUT_SECS"),
                "GEOCODE_TIMEOUT_SECS",
                10,
            )?),
            max_workers: parse_or(get("MAX_WORKERS"), "MAX_WORKERS", defaults.max_workers)?,
            public_base_url: get("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_base_url),
            brevo_api_key: get("BREVO_API_KEY"),
            mail_sender_email: get("MAIL_SENDER_EMAIL").unwrap_or(defaults.mail_sender_email),
            mail_sender_name: get("MAIL_SENDER_NAME").unwrap_or(defaults.mail_sender_name),
            log_sign_in_links: parse_or(
                get("LOG_SIGN_IN_LINKS"),
                "LOG_SIGN_IN_LINKS",
                defaults.log_sign_in_links,
            )?,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}
