use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Only the listen port and tunables have defaults; upstream URLs are optional
/// and fall back to in-process backends when unset.
#[derive(Debug, Clone)]
pub struct Config {
    pub document_api_url: Option<String>,
    pub upload_api_url: Option<String>,
    pub users_collection: String,
    pub redis_url: Option<String>,
    pub lookup_cache_ttl_secs: u64,
    pub places_api_key: Option<String>,
    pub places_country: String,
    pub fetch_retry_attempts: u32,
    pub fetch_retry_delay_ms: u64,
    pub upload_max_bytes: usize,
    pub http_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            document_api_url: optional_env("DOCUMENT_API_URL"),
            upload_api_url: optional_env("UPLOAD_API_URL"),
            users_collection: optional_env("USERS_COLLECTION")
                .unwrap_or_else(|| "users".to_string()),
            redis_url: optional_env("REDIS_URL"),
            lookup_cache_ttl_secs: parse_env("LOOKUP_CACHE_TTL_SECS", 3600)?,
            places_api_key: optional_env("PLACES_API_KEY"),
            places_country: optional_env("PLACES_COUNTRY").unwrap_or_else(|| "in".to_string()),
            fetch_retry_attempts: parse_env("FETCH_RETRY_ATTEMPTS", 3)?,
            fetch_retry_delay_ms: parse_env("FETCH_RETRY_DELAY_MS", 1000)?,
            upload_max_bytes: parse_env("UPLOAD_MAX_BYTES", 5 * 1024 * 1024)?,
            http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS", 30)?,
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn fetch_retry_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_retry_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for Config {
    /// Local-development defaults: in-memory document store and uploader, no
    /// cache, no place autocomplete.
    fn default() -> Self {
        Config {
            document_api_url: None,
            upload_api_url: None,
            users_collection: "users".to_string(),
            redis_url: None,
            lookup_cache_ttl_secs: 3600,
            places_api_key: None,
            places_country: "in".to_string(),
            fetch_retry_attempts: 3,
            fetch_retry_delay_ms: 1000,
            upload_max_bytes: 5 * 1024 * 1024,
            http_timeout_secs: 30,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

/// Blank values count as unset so `FOO=` in a `.env` file does not enable a backend.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
