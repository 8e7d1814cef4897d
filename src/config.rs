//! Run configuration.
//!
//! Everything is loaded once at process start from environment variables
//! (plus an optional `tracking/filters.yml` for the keyword and location
//! lists) and stays immutable for the run's duration. No component reads
//! the environment after this point.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::MonitorError;
use crate::filter;

const FILTERS_FILE: &str = "tracking/filters.yml";

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    /// Bound on every HTTP call.
    pub request_timeout: Duration,
    /// Sleep between source invocations and between retry attempts.
    pub rate_limit_delay: Duration,
    /// Bound on retry attempts per request and per delivery.
    pub max_retries: u32,
    /// OR-matched against posting titles, case-insensitive.
    pub keyword_list: Vec<String>,
    /// Accepted EU/UK location tokens.
    pub geography_filter: Vec<String>,
    /// State root; the seen-store and run log live under it.
    pub root: PathBuf,
    /// Seen-store entries older than this are purged at run start.
    pub seen_retention_days: i64,
    /// Whether a zero-novel run still sends a status message.
    pub notify_when_empty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            request_timeout: Duration::from_secs(30),
            rate_limit_delay: Duration::from_secs_f64(2.0),
            max_retries: 3,
            keyword_list: filter::default_keywords(),
            geography_filter: filter::default_locations(),
            root: PathBuf::from("."),
            seen_retention_days: 90,
            notify_when_empty: true,
        }
    }
}

/// Optional override file for the filter lists, in the shape:
///
/// ```yaml
/// keywords: [software, intern, backend]
/// locations: [london, uk, germany]
/// ```
#[derive(Debug, Deserialize)]
struct FiltersFile {
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    locations: Vec<String>,
}

impl Config {
    /// Build the configuration from the environment, failing fast on
    /// missing credentials or unparseable values.
    pub fn from_env() -> Result<Self, MonitorError> {
        let mut config = Config {
            telegram_bot_token: require_env("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: require_env("TELEGRAM_CHAT_ID")?,
            ..Config::default()
        };

        if let Some(secs) = parse_env("REQUEST_TIMEOUT", parse_u64)? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_env("RATE_LIMIT_DELAY", parse_f64)? {
            config.rate_limit_delay = Duration::from_secs_f64(secs);
        }
        if let Some(n) = parse_env("MAX_RETRIES", parse_u32)? {
            config.max_retries = n;
        }
        if let Some(days) = parse_env("SEEN_RETENTION_DAYS", parse_i64)? {
            config.seen_retention_days = days;
        }
        if let Some(flag) = parse_env("NOTIFY_WHEN_EMPTY", parse_bool)? {
            config.notify_when_empty = flag;
        }
        if let Ok(root) = env::var("ROOT") {
            config.root = PathBuf::from(root);
        }

        config.load_filter_overrides()?;
        Ok(config)
    }

    /// Apply `tracking/filters.yml` if it exists; missing file keeps the
    /// compiled-in defaults.
    fn load_filter_overrides(&mut self) -> Result<(), MonitorError> {
        let path = self.root.join(FILTERS_FILE);
        if !path.exists() {
            return Ok(());
        }
        let content = fs::read_to_string(&path)?;
        let overrides = parse_filters(&content)
            .map_err(|e| MonitorError::config(format!("invalid {}: {}", path.display(), e)))?;
        if !overrides.keywords.is_empty() {
            self.keyword_list = overrides.keywords;
        }
        if !overrides.locations.is_empty() {
            self.geography_filter = overrides.locations;
        }
        Ok(())
    }

    pub fn seen_store_path(&self) -> PathBuf {
        self.root.join("tracking").join("seen_postings.db")
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join("internship_monitor.log")
    }
}

fn parse_filters(content: &str) -> Result<FiltersFile, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

fn require_env(name: &str) -> Result<String, MonitorError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(MonitorError::config(format!("{} is required", name))),
    }
}

/// Read an optional variable, turning parse failures into `Config` errors
/// instead of silently falling back to defaults.
fn parse_env<T>(
    name: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, MonitorError> {
    match env::var(name) {
        Ok(raw) => parse(raw.trim()).map(Some).ok_or_else(|| {
            MonitorError::config(format!("invalid value for {}: {:?}", name, raw))
        }),
        Err(_) => Ok(None),
    }
}

fn parse_u64(s: &str) -> Option<u64> {
    s.parse().ok()
}

fn parse_u32(s: &str) -> Option<u32> {
    s.parse().ok()
}

fn parse_i64(s: &str) -> Option<i64> {
    s.parse().ok().filter(|d| *d > 0)
}

fn parse_f64(s: &str) -> Option<f64> {
    s.parse().ok().filter(|d: &f64| d.is_finite() && *d >= 0.0)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Resolve a path under the state root, creating parent directories.
pub fn ensure_parent_dir(path: &Path) -> Result<(), MonitorError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
