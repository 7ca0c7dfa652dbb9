//! Constants and runtime configuration.
//!
//! Values come from an optional JSON file in the platform config directory
//! (`~/.config/fintrack/config.json` on Linux) and are then overridden by
//! `FINTRACK_*` environment variables.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{FinTrackError, Result};

pub const REST_PATH: &str = "rest/v1";
pub const AUTH_PATH: &str = "auth/v1";

/// Rows returned by the expense list when no limit is given.
pub const DEFAULT_EXPENSE_LIMIT: usize = 50;
/// Upper bound used when a whole history is analysed.
pub const ALL_TIME_EXPENSE_LIMIT: usize = 1000;

pub const DEFAULT_ALERT_THRESHOLD: f64 = 80.0;
/// Percentage of a budget at which the "attention" state begins.
pub const ATTENTION_LEVEL: f64 = 90.0;
/// Number of months kept in the monthly evolution series.
pub const EVOLUTION_WINDOW: usize = 6;
/// Longest month-by-month history [`monthly_trends`](crate::queries::StatsQuery::monthly_trends) accepts.
pub const MAX_TREND_MONTHS: usize = 120;

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CURRENCY: &str = "FCFA";

pub const EXPORT_FILE_PREFIX: &str = "fintrack-data-";

pub const URL_ENV: &str = "FINTRACK_URL";
pub const ANON_KEY_ENV: &str = "FINTRACK_ANON_KEY";
pub const CURRENCY_ENV: &str = "FINTRACK_CURRENCY";

/// Connection settings for a FinTrack backend.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    pub timeout: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    /// Currency label used in generated messages.
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    url: Option<String>,
    anon_key: Option<String>,
    timeout_secs: Option<u64>,
    retry_attempts: Option<u32>,
    retry_delay_ms: Option<u64>,
    currency: Option<String>,
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Read settings from a JSON file; missing keys keep their defaults.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let file: FileConfig = serde_json::from_str(&contents).map_err(|e| {
            FinTrackError::Config(format!("{}: {}", path.display(), e))
        })?;

        let mut config = Self::default();
        if let Some(url) = file.url {
            config.url = url;
        }
        if let Some(key) = file.anon_key {
            config.anon_key = key;
        }
        if let Some(secs) = file.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = file.retry_attempts {
            config.retry_attempts = attempts;
        }
        if let Some(ms) = file.retry_delay_ms {
            config.retry_delay = Duration::from_millis(ms);
        }
        if let Some(currency) = file.currency {
            config.currency = currency;
        }
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(URL_ENV) {
            self.url = url;
        }
        if let Ok(key) = std::env::var(ANON_KEY_ENV) {
            self.anon_key = key;
        }
        if let Ok(currency) = std::env::var(CURRENCY_ENV) {
            self.currency = currency;
        }
    }

    /// Fail early when the settings needed for HTTP access are missing.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(FinTrackError::Config(format!(
                "backend URL is not set (config file or {})",
                URL_ENV
            )));
        }
        if self.anon_key.trim().is_empty() {
            return Err(FinTrackError::Config(format!(
                "anon key is not set (config file or {})",
                ANON_KEY_ENV
            )));
        }
        Ok(())
    }

    /// Base URL of the data API, without a trailing slash.
    pub fn rest_url(&self) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), REST_PATH)
    }

    /// Base URL of the auth API, without a trailing slash.
    pub fn auth_url(&self) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), AUTH_PATH)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fintrack").join("config.json"))
}
