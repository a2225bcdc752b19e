//! Orchestration between tool handlers and the API client.
//!
//! Services validate parameters before any network call, fetch through the
//! [`IntervalsClient`] trait, and hand raw records to the domain modules for
//! shaping. Holding the client behind `Arc<dyn IntervalsClient>` keeps the
//! services testable with in-memory fakes.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;

use intervals_api::{IntervalsClient, IntervalsError};

use crate::domains::{activities, wellness};

const ACTIVITY_GROUPINGS: &[&str] = &["sport", "day", "week", "month"];
const WELLNESS_GROUPINGS: &[&str] = &["week", "month", "all"];

/// Reject anything that does not parse as a YYYY-MM-DD calendar date.
pub fn validate_date(value: &str, field: &str) -> Result<(), IntervalsError> {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err(IntervalsError::validation(
            field,
            value,
            "Date must be in YYYY-MM-DD format",
        ));
    }
    Ok(())
}

fn validate_range(oldest: &str, newest: Option<&str>) -> Result<(), IntervalsError> {
    validate_date(oldest, "oldest_date")?;
    if let Some(newest) = newest {
        validate_date(newest, "newest_date")?;
    }
    Ok(())
}

fn validate_grouping(group_by: &str, allowed: &[&str]) -> Result<(), IntervalsError> {
    if !allowed.contains(&group_by) {
        return Err(IntervalsError::validation(
            "group_by",
            group_by,
            format!(
                "Invalid group_by value. Must be one of: {}",
                allowed.join(", ")
            ),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ActivitiesService {
    client: Arc<dyn IntervalsClient>,
}

impl ActivitiesService {
    pub fn new(client: Arc<dyn IntervalsClient>) -> Self {
        Self { client }
    }

    /// Fetch raw activities for a validated date range, newest first.
    pub async fn get_activities(
        &self,
        oldest: &str,
        newest: Option<&str>,
    ) -> Result<Vec<Value>, IntervalsError> {
        validate_range(oldest, newest)?;
        let activities = self.client.get_activities(oldest, newest).await?;
        tracing::info!(count = activities.len(), "retrieved activities");
        Ok(activities)
    }

    /// Fetch and aggregate activities under the requested grouping.
    pub async fn get_grouped_activities(
        &self,
        oldest: &str,
        newest: Option<&str>,
        group_by: &str,
        include_details: bool,
    ) -> Result<Value, IntervalsError> {
        validate_grouping(group_by, ACTIVITY_GROUPINGS)?;
        let raw = self.get_activities(oldest, newest).await?;
        let grouped = match group_by {
            "sport" => activities::group_by_sport(&raw, include_details),
            period => activities::group_by_time_period(&raw, period, include_details),
        };
        Ok(grouped)
    }
}

#[derive(Clone)]
pub struct WellnessService {
    client: Arc<dyn IntervalsClient>,
}

impl WellnessService {
    pub fn new(client: Arc<dyn IntervalsClient>) -> Self {
        Self { client }
    }

    /// Fetch raw wellness records for a validated date range, newest first.
    pub async fn get_wellness(
        &self,
        oldest: &str,
        newest: Option<&str>,
    ) -> Result<Vec<Value>, IntervalsError> {
        validate_range(oldest, newest)?;
        let records = self.client.get_wellness(oldest, newest).await?;
        tracing::info!(count = records.len(), "retrieved wellness records");
        Ok(records)
    }

    /// Fetch and aggregate wellness records under the requested grouping.
    pub async fn get_grouped_wellness(
        &self,
        oldest: &str,
        newest: Option<&str>,
        group_by: &str,
        include_details: bool,
    ) -> Result<Value, IntervalsError> {
        validate_grouping(group_by, WELLNESS_GROUPINGS)?;
        let raw = self.get_wellness(oldest, newest).await?;
        let grouped = match group_by {
            "all" => wellness::group_all(&raw, include_details),
            period => wellness::group_by_period(&raw, period, include_details),
        };
        Ok(grouped)
    }
}
