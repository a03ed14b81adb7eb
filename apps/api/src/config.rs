use anyhow::{Context, Result};

const DEFAULT_SCORING_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_BULK_DELAY_MS: u64 = 100;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_SESSION_IDLE_SECS: u64 = 60 * 60;
const DEFAULT_INPUT_CACHE_CAPACITY: usize = 8;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the scoring backend (no trailing slash).
    pub scoring_api_url: String,
    /// Per-request timeout applied to every scoring backend call.
    pub scoring_timeout_secs: u64,
    /// Pause between sequential bulk-ranking submissions.
    pub bulk_delay_ms: u64,
    pub max_upload_bytes: usize,
    /// Sessions unused for this long are dropped.
    pub session_idle_secs: u64,
    /// Fresh-analysis results kept per session.
    pub input_cache_capacity: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            scoring_api_url: std::env::var("SCORING_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_SCORING_API_URL.to_string()),
            scoring_timeout_secs: parse_env("SCORING_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            bulk_delay_ms: parse_env("BULK_DELAY_MS", DEFAULT_BULK_DELAY_MS)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            session_idle_secs: parse_env("SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)?,
            input_cache_capacity: parse_env("INPUT_CACHE_CAPACITY", DEFAULT_INPUT_CACHE_CAPACITY)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scoring_api_url: DEFAULT_SCORING_API_URL.to_string(),
            scoring_timeout_secs: DEFAULT_TIMEOUT_SECS,
            bulk_delay_ms: DEFAULT_BULK_DELAY_MS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
            input_cache_capacity: DEFAULT_INPUT_CACHE_CAPACITY,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
