//! Configuration loaded from environment variables, validated eagerly.
//!
//! The config is constructed once at startup and handed to the client; there is
//! no process-wide mutable singleton. Tests use [`Config::from_env_with`] with a
//! lookup closure instead of mutating the environment.

use crate::IntervalsError;
use secrecy::SecretString;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://intervals.icu/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_REQUEST_DELAY_SECS: f64 = 0.1;

const VALID_LOG_LEVELS: &[&str] = &["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl Environment {
    fn parse(s: &str) -> Result<Self, IntervalsError> {
        match s.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "testing" => Ok(Self::Testing),
            "production" => Ok(Self::Production),
            other => Err(IntervalsError::Config(format!(
                "invalid environment: {other}. Must be one of: development, testing, production"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Upper-cased level name, one of TRACE/DEBUG/INFO/WARN/ERROR.
    pub level: String,
    pub debug: bool,
    pub log_dir: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Absolute http(s) URL, no trailing slash.
    pub base_url: String,
    pub api_key: SecretString,
    /// Athlete identifier, `i` followed by digits (e.g. `i335136`).
    pub athlete_id: String,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Fixed delay inserted before every request to throttle request rate.
    pub request_delay: Duration,
    pub log: LogConfig,
    pub environment: Environment,
}

fn athlete_id_pattern() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^i\d+$").expect("athlete id pattern is valid"))
}

impl Config {
    pub fn from_env() -> Result<Self, IntervalsError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable loader reading values through the provided lookup function.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, IntervalsError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api_key = get("INTERVALS_API_KEY").filter(|v| !v.is_empty()).ok_or_else(|| {
            IntervalsError::Config(
                "INTERVALS_API_KEY environment variable is required. \
                 Please export a valid API key from intervals.icu settings."
                    .into(),
            )
        })?;
        let athlete_id = get("INTERVALS_ATHLETE_ID").ok_or_else(|| {
            IntervalsError::Config(
                "INTERVALS_ATHLETE_ID environment variable is required. \
                 Please export a valid athlete ID (e.g., 'i335136')."
                    .into(),
            )
        })?;
        if !athlete_id_pattern().is_match(&athlete_id) {
            return Err(IntervalsError::Config(format!(
                "invalid athlete ID format: {athlete_id}. \
                 Should be 'i' followed by digits (e.g., 'i335136')"
            )));
        }

        let base_url =
            validate_base_url(&get("INTERVALS_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()))?;

        let timeout_secs = parse_env(&mut get, "INTERVALS_TIMEOUT", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(IntervalsError::Config(
                "invalid timeout: 0. Must be positive".into(),
            ));
        }
        let max_retries = parse_env(&mut get, "INTERVALS_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        let request_delay_secs: f64 =
            parse_env(&mut get, "INTERVALS_REQUEST_DELAY", DEFAULT_REQUEST_DELAY_SECS)?;
        if request_delay_secs < 0.0 {
            return Err(IntervalsError::Config(format!(
                "invalid request_delay: {request_delay_secs}. Must be non-negative"
            )));
        }

        let level = get("LOG_LEVEL").unwrap_or_else(|| "INFO".into()).to_uppercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(IntervalsError::Config(format!("invalid log level: {level}")));
        }
        let debug = get("DEBUG")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
            .unwrap_or(false);
        let log_dir = get("LOG_DIR").unwrap_or_else(|| "logs".into());

        let environment = Environment::parse(&get("ENVIRONMENT").unwrap_or_else(|| "production".into()))?;

        Ok(Self {
            base_url,
            api_key: SecretString::new(api_key.into()),
            athlete_id,
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
            request_delay: Duration::from_secs_f64(request_delay_secs),
            log: LogConfig {
                level,
                debug,
                log_dir,
            },
            environment,
        })
    }
}

fn validate_base_url(raw: &str) -> Result<String, IntervalsError> {
    if raw.is_empty() {
        return Err(IntervalsError::Config("base_url is required".into()));
    }
    let parsed = reqwest::Url::parse(raw)
        .map_err(|_| IntervalsError::Config(format!("invalid base_url format: {raw}")))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(IntervalsError::Config(format!(
                "invalid URL scheme: {other}. Use http or https"
            )));
        }
    }
    if parsed.host_str().is_none() {
        return Err(IntervalsError::Config(format!("invalid base_url format: {raw}")));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn parse_env<F, T>(get: &mut F, key: &str, default: T) -> Result<T, IntervalsError>
where
    F: FnMut(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| IntervalsError::Config(format!("invalid {key}: {raw}"))),
    }
}
