//! Typed error taxonomy, `IntervalsClient` trait and reqwest-based client for
//! the intervals.icu API.

use async_trait::async_trait;
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod retry;

pub use config::{Config, Environment, LogConfig};

/// Field-name fragments whose values are never echoed back in validation errors.
const SENSITIVE_FIELDS: &[&str] = &["password", "token", "api_key", "secret", "auth_token"];

/// Marker substituted for redacted validation values.
pub const REDACTION_MARKER: &str = "<redacted>";

#[derive(Debug, Error)]
pub enum IntervalsError {
    #[error("validation failed for {field}: {message}")]
    Validation {
        field: String,
        value: String,
        message: String,
    },
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },
    #[error("invalid API key or authentication failed")]
    Authentication,
    #[error("access denied to this resource")]
    Authorization,
    #[error("API rate limit exceeded{}", retry_after_suffix(.retry_after))]
    RateLimit { retry_after: Option<u64> },
    #[error("request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
    #[error("network error: {0}")]
    Network(String),
    #[error("API request failed: {message} (status {status})")]
    Api { status: u16, message: String },
    #[error("configuration error: {0}")]
    Config(String),
}

fn retry_after_suffix(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(". Retry after {secs} seconds"),
        None => String::new(),
    }
}

impl IntervalsError {
    /// Build a field-scoped validation error. The offending value is redacted
    /// whenever the field name looks sensitive (api_key, token, ...).
    pub fn validation(
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let lowered = field.to_lowercase();
        let value = if SENSITIVE_FIELDS.iter().any(|s| lowered.contains(s)) {
            REDACTION_MARKER.to_string()
        } else {
            value.into()
        };
        Self::Validation {
            field,
            value,
            message: message.into(),
        }
    }

    /// The offending field name, for validation errors only.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Narrow client trait: one GET per resource, returning the raw record list.
/// Handlers and services are tested against mock implementations of this seam.
#[async_trait]
pub trait IntervalsClient: Send + Sync + 'static {
    /// Fetch activities in `[oldest, newest?]` (dates as `YYYY-MM-DD`).
    /// A non-list response body yields an empty vec.
    async fn get_activities(
        &self,
        oldest: &str,
        newest: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, IntervalsError>;

    /// Fetch wellness records in `[oldest, newest?]` (dates as `YYYY-MM-DD`).
    async fn get_wellness(
        &self,
        oldest: &str,
        newest: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, IntervalsError>;
}
