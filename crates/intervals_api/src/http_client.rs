//! reqwest-based implementation of the [`IntervalsClient`](crate::IntervalsClient) trait.
//!
//! One client instance is bound to one configuration snapshot for its lifetime.
//! Transient failures (429/5xx) are retried with backoff; everything else is
//! classified into the error taxonomy by a single response-inspection routine.

use crate::config::Config;
use crate::retry::RetryPolicy;
use crate::{IntervalsClient, IntervalsError};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;

/// Fixed Basic-auth username; the configured API key is the password.
pub const BASIC_AUTH_USER: &str = "API_KEY";

#[derive(Clone, Debug)]
pub struct ReqwestIntervalsClient {
    base_url: String,
    athlete_id: String,
    api_key: SecretString,
    timeout: Duration,
    request_delay: Duration,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl ReqwestIntervalsClient {
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.base_url,
            config.athlete_id.clone(),
            config.api_key.clone(),
            config.timeout,
            config.max_retries,
            config.request_delay,
        )
    }

    pub fn new(
        base_url: &str,
        athlete_id: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
        max_retries: u32,
        request_delay: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            athlete_id: athlete_id.into(),
            api_key,
            timeout,
            request_delay,
            retry: RetryPolicy {
                max_retries,
                ..RetryPolicy::default()
            },
            client,
        }
    }

    pub fn athlete_id(&self) -> &str {
        &self.athlete_id
    }

    /// Authenticated GET returning the decoded JSON body.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, IntervalsError> {
        let resp = self
            .execute(reqwest::Method::GET, path, query, None)
            .await?;
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        decode_json(resp).await
    }

    /// Authenticated POST; an empty response body decodes to `{}`.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, IntervalsError> {
        let resp = self
            .execute(reqwest::Method::POST, path, &[], Some(body))
            .await?;
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        decode_json_or_empty(resp).await
    }

    /// Authenticated PUT; an empty response body decodes to `{}`.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, IntervalsError> {
        let resp = self
            .execute(reqwest::Method::PUT, path, &[], Some(body))
            .await?;
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        decode_json_or_empty(resp).await
    }

    /// Authenticated DELETE. Success is status 200 or 204.
    pub async fn delete(&self, path: &str) -> Result<bool, IntervalsError> {
        let resp = self
            .execute(reqwest::Method::DELETE, path, &[], None)
            .await?;
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        let code = resp.status().as_u16();
        Ok(code == 200 || code == 204)
    }

    /// Send one request, retrying retryable statuses up to `max_retries` times.
    /// `request_delay` is slept before every attempt to throttle request rate.
    async fn execute(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response, IntervalsError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0u32;
        loop {
            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
            let mut req = self
                .client
                .request(method.clone(), &url)
                .basic_auth(BASIC_AUTH_USER, Some(self.api_key.expose_secret()))
                .timeout(self.timeout);
            if !query.is_empty() {
                req = req.query(query);
            }
            if let Some(json) = body {
                req = req.json(json);
            }
            let resp = req.send().await.map_err(|e| self.transport_error(e))?;
            let status = resp.status().as_u16();
            if RetryPolicy::is_retryable(status) && attempt < self.retry.max_retries {
                attempt += 1;
                tracing::debug!(status, attempt, path, "retrying request after transient failure");
                tokio::time::sleep(self.retry.backoff(attempt)).await;
                continue;
            }
            return Ok(resp);
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> IntervalsError {
        if err.is_timeout() {
            // Rounded up so a sub-second timeout never reports as zero.
            IntervalsError::Timeout {
                timeout_secs: self.timeout.as_secs_f64().ceil() as u64,
            }
        } else if err.is_connect() {
            IntervalsError::Network(format!("connection failed: {err}"))
        } else {
            IntervalsError::Network(format!("request failed: {err}"))
        }
    }

    /// Classify a non-2xx response into the error taxonomy.
    async fn error_from_response(resp: reqwest::Response) -> IntervalsError {
        let status = resp.status().as_u16();
        match status {
            401 => IntervalsError::Authentication,
            403 => IntervalsError::Authorization,
            404 => {
                let path = resp.url().path().to_string();
                IntervalsError::NotFound {
                    resource: resource_label(&path).to_string(),
                    id: path,
                }
            }
            429 => {
                let retry_after = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok());
                IntervalsError::RateLimit { retry_after }
            }
            _ => {
                let body = resp.text().await.unwrap_or_default();
                let message = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| {
                        v.get("detail")
                            .or_else(|| v.get("message"))
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| body.chars().take(256).collect());
                IntervalsError::Api { status, message }
            }
        }
    }

    async fn fetch_range(
        &self,
        resource: &str,
        oldest: &str,
        newest: Option<&str>,
    ) -> Result<Vec<Value>, IntervalsError> {
        let path = format!("/athlete/{}/{}", self.athlete_id, resource);
        let mut query: Vec<(&str, String)> = vec![("oldest", oldest.to_string())];
        if let Some(newest) = newest {
            query.push(("newest", newest.to_string()));
        }
        let body = self.get(&path, &query).await?;
        Ok(body.as_array().cloned().unwrap_or_default())
    }
}

#[async_trait]
impl IntervalsClient for ReqwestIntervalsClient {
    async fn get_activities(
        &self,
        oldest: &str,
        newest: Option<&str>,
    ) -> Result<Vec<Value>, IntervalsError> {
        self.fetch_range("activities", oldest, newest).await
    }

    async fn get_wellness(
        &self,
        oldest: &str,
        newest: Option<&str>,
    ) -> Result<Vec<Value>, IntervalsError> {
        self.fetch_range("wellness", oldest, newest).await
    }
}

async fn decode_json(resp: reqwest::Response) -> Result<Value, IntervalsError> {
    let status = resp.status().as_u16();
    resp.json().await.map_err(|e| IntervalsError::Api {
        status,
        message: format!("invalid JSON response: {e}"),
    })
}

async fn decode_json_or_empty(resp: reqwest::Response) -> Result<Value, IntervalsError> {
    let status = resp.status().as_u16();
    let text = resp
        .text()
        .await
        .map_err(|e| IntervalsError::Network(format!("reading response body: {e}")))?;
    if text.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(&text).map_err(|e| IntervalsError::Api {
        status,
        message: format!("invalid JSON response: {e}"),
    })
}

/// Last non-empty path segment, used as the resource name in NotFound errors.
fn resource_label(path: &str) -> &str {
    path.rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or("resource")
}
