//! In-memory [`IntervalsClient`] fakes for service and handler tests.

use async_trait::async_trait;
use serde_json::Value;

use intervals_api::{IntervalsClient, IntervalsError};

/// Serves fixed payloads regardless of the requested range.
#[derive(Default)]
pub struct StaticClient {
    pub activities: Vec<Value>,
    pub wellness: Vec<Value>,
}

impl StaticClient {
    pub fn with_activities(activities: Vec<Value>) -> Self {
        Self {
            activities,
            ..Self::default()
        }
    }

    pub fn with_wellness(wellness: Vec<Value>) -> Self {
        Self {
            wellness,
            ..Self::default()
        }
    }
}

#[async_trait]
impl IntervalsClient for StaticClient {
    async fn get_activities(
        &self,
        _oldest: &str,
        _newest: Option<&str>,
    ) -> Result<Vec<Value>, IntervalsError> {
        Ok(self.activities.clone())
    }

    async fn get_wellness(
        &self,
        _oldest: &str,
        _newest: Option<&str>,
    ) -> Result<Vec<Value>, IntervalsError> {
        Ok(self.wellness.clone())
    }
}

/// Fails every call; used to prove a request was never attempted.
pub struct FailingClient;

#[async_trait]
impl IntervalsClient for FailingClient {
    async fn get_activities(
        &self,
        _oldest: &str,
        _newest: Option<&str>,
    ) -> Result<Vec<Value>, IntervalsError> {
        Err(IntervalsError::Network("unexpected client call".to_string()))
    }

    async fn get_wellness(
        &self,
        _oldest: &str,
        _newest: Option<&str>,
    ) -> Result<Vec<Value>, IntervalsError> {
        Err(IntervalsError::Network("unexpected client call".to_string()))
    }
}
