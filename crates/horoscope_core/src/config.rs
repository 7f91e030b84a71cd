//! Client configuration loaded from the environment.
//!
//! # Invariants
//! - Loading never panics; missing or malformed values fall back to defaults
//!   with a warning.
//! - `base_url` never ends with `/`.

use log::{info, warn};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);
pub const DEFAULT_SEARCH_MIN_CHARS: usize = 2;
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

const BASE_URL_ENV: &str = "HOROSCOPE_API_BASE_URL";
const CONNECT_TIMEOUT_ENV: &str = "HOROSCOPE_CONNECT_TIMEOUT_SECS";
const SEARCH_DEBOUNCE_ENV: &str = "HOROSCOPE_SEARCH_DEBOUNCE_MS";
const DB_PATH_ENV: &str = "HOROSCOPE_DB_PATH";
const DB_FILE_NAME: &str = "horoscope_state.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub search_debounce: Duration,
    /// Shortest query (in characters) that triggers a city search.
    pub search_min_chars: usize,
    pub search_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            search_min_chars: DEFAULT_SEARCH_MIN_CHARS,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let base_url = env_var(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs: u64 = try_load(CONNECT_TIMEOUT_ENV, DEFAULT_CONNECT_TIMEOUT.as_secs());
        let debounce_ms: u64 = try_load(
            SEARCH_DEBOUNCE_ENV,
            DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64,
        );

        Self::default()
            .with_base_url(base_url)
            .with_connect_timeout(Duration::from_secs(timeout_secs))
            .with_search_debounce(Duration::from_millis(debounce_ms))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }
}

/// Resolves the state database path: `HOROSCOPE_DB_PATH`, else a file in
/// the system temp directory.
pub fn resolve_state_db_path() -> PathBuf {
    env_var(DB_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join(DB_FILE_NAME))
}

fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    match env_var(key) {
        Some(raw) => raw.parse().unwrap_or_else(|err| {
            warn!("event=config_load module=config status=error key={key} error={err}; using default {default}");
            default
        }),
        None => {
            info!("event=config_load module=config status=ok key={key} source=default value={default}");
            default
        }
    }
}
