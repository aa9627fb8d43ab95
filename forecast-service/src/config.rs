use common::tracing::LogFormat;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for every seconds-valued setting (one year).
const MAX_SECONDS: u64 = 365 * 24 * 60 * 60;

const DEFAULT_CITIES: [&str; 16] = [
    "London",
    "New York",
    "Tokyo",
    "Paris",
    "Sydney",
    "Mumbai",
    "Dubai",
    "Singapore",
    "Hong Kong",
    "Berlin",
    "Toronto",
    "Barcelona",
    "Rome",
    "Amsterdam",
    "Seoul",
    "Bangkok",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub weather_api_url: String,
    pub weather_api_key: String,
    pub forecast_days: u8,
    pub cache_ttl_seconds: u64,
    pub refresh_interval_seconds: u64,
    pub http_timeout_seconds: u64,
    pub preferences_path: PathBuf,
    pub default_cities: Vec<String>,
    pub max_tracked_cities: usize,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            port: parse_or(&lookup, "PORT", 3002),
            weather_api_url: lookup("WEATHER_API_URL")
                .unwrap_or_else(|| "https://api.weatherapi.com/v1".to_string()),
            weather_api_key: lookup("WEATHER_API_KEY").unwrap_or_default(),
            forecast_days: parse_or(&lookup, "FORECAST_DAYS", 7),
            cache_ttl_seconds: seconds_or(&lookup, "CACHE_TTL_SECONDS", 60),
            refresh_interval_seconds: seconds_or(&lookup, "REFRESH_INTERVAL_SECONDS", 60),
            http_timeout_seconds: seconds_or(&lookup, "HTTP_TIMEOUT_SECONDS", 10),
            preferences_path: lookup("PREFERENCES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("preferences.json")),
            default_cities: lookup("DEFAULT_CITIES")
                .map(|raw| split_cities(&raw))
                .filter(|cities| !cities.is_empty())
                .unwrap_or_else(|| DEFAULT_CITIES.iter().map(|c| c.to_string()).collect()),
            max_tracked_cities: parse_or(&lookup, "MAX_TRACKED_CITIES", 16),
            log_format: lookup("LOG_FORMAT")
                .map(|raw| LogFormat::from_name(&raw))
                .unwrap_or_default(),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Like `parse_or`, clamped to `1..=MAX_SECONDS`.
fn seconds_or<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default).clamp(1, MAX_SECONDS)
}

fn split_cities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
