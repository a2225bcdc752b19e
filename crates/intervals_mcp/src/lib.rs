//! MCP server exposing intervals.icu activities and wellness data.
//!
//! Four tools, all returning the same envelope shape: a JSON object whose
//! `status` is `"success"` or `"error"`. Failures are reported inside the
//! envelope rather than as protocol-level errors, so a misformatted date or
//! an upstream 500 still produces a well-formed tool result.

use std::sync::Arc;

use rmcp::Json;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use intervals_api::{IntervalsClient, IntervalsError};

pub mod domains;
pub mod error;
pub mod services;
pub mod transforms;

#[cfg(test)]
pub mod test_utils;

use error::{error_envelope, success_envelope};
use services::{ActivitiesService, WellnessService};

/// Output schema for the uniform response envelope: rmcp requires an explicit
/// root `"object"` type, which `serde_json::Value`'s derived schema lacks.
fn envelope_output_schema() -> Arc<serde_json::Map<String, Value>> {
    Arc::new(
        serde_json::json!({ "type": "object" })
            .as_object()
            .expect("envelope schema is an object")
            .clone(),
    )
}

#[derive(Clone)]
pub struct IntervalsMcpHandler {
    activities: ActivitiesService,
    wellness: WellnessService,
    tool_router: rmcp::handler::server::tool::ToolRouter<IntervalsMcpHandler>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DateRangeParams {
    /// Start of the date range, YYYY-MM-DD.
    pub oldest_date: String,
    /// End of the date range, YYYY-MM-DD. Open-ended when omitted.
    pub newest_date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GroupedActivitiesParams {
    /// Start of the date range, YYYY-MM-DD.
    pub oldest_date: String,
    /// End of the date range, YYYY-MM-DD. Open-ended when omitted.
    pub newest_date: Option<String>,
    /// Grouping: "sport", "day", "week", or "month". Defaults to "sport".
    pub group_by: Option<String>,
    /// Include filtered per-activity details in each group.
    pub include_details: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GroupedWellnessParams {
    /// Start of the date range, YYYY-MM-DD.
    pub oldest_date: String,
    /// End of the date range, YYYY-MM-DD. Open-ended when omitted.
    pub newest_date: Option<String>,
    /// Grouping: "week", "month", or "all". Defaults to "month".
    pub group_by: Option<String>,
    /// Include individual records in each group.
    pub include_details: Option<bool>,
}

#[tool_router]
impl IntervalsMcpHandler {
    pub fn new(client: Arc<dyn IntervalsClient>) -> Self {
        Self {
            activities: ActivitiesService::new(client.clone()),
            wellness: WellnessService::new(client),
            tool_router: Self::tool_router(),
        }
    }

    pub fn tool_count(&self) -> usize {
        self.tool_router.list_all().len()
    }

    #[tool(
        name = "get_activities",
        description = "List activities for a date range with normalized fields",
        output_schema = envelope_output_schema()
    )]
    pub async fn get_activities(
        &self,
        params: Parameters<DateRangeParams>,
    ) -> Result<Json<Value>, String> {
        let p = params.0;
        tracing::info!(oldest = %p.oldest_date, newest = ?p.newest_date, "fetching activities");
        let result = self
            .activities
            .get_activities(&p.oldest_date, p.newest_date.as_deref())
            .await
            .map(|raw| domains::activities::transform_activities_response(&raw));
        Ok(Json(into_envelope(result, "activities")))
    }

    #[tool(
        name = "get_grouped_activities",
        description = "Summarize activities grouped by sport, day, week, or month",
        output_schema = envelope_output_schema()
    )]
    pub async fn get_grouped_activities(
        &self,
        params: Parameters<GroupedActivitiesParams>,
    ) -> Result<Json<Value>, String> {
        let p = params.0;
        let group_by = p.group_by.as_deref().unwrap_or("sport");
        let include_details = p.include_details.unwrap_or(false);
        tracing::info!(oldest = %p.oldest_date, newest = ?p.newest_date, group_by, "fetching grouped activities");
        let result = self
            .activities
            .get_grouped_activities(
                &p.oldest_date,
                p.newest_date.as_deref(),
                group_by,
                include_details,
            )
            .await;
        Ok(Json(into_envelope(result, "grouped activities")))
    }

    #[tool(
        name = "get_wellness",
        description = "List wellness records for a date range with normalized fields",
        output_schema = envelope_output_schema()
    )]
    pub async fn get_wellness(
        &self,
        params: Parameters<DateRangeParams>,
    ) -> Result<Json<Value>, String> {
        let p = params.0;
        tracing::info!(oldest = %p.oldest_date, newest = ?p.newest_date, "fetching wellness data");
        let result = self
            .wellness
            .get_wellness(&p.oldest_date, p.newest_date.as_deref())
            .await
            .map(|raw| domains::wellness::transform_wellness_response(&raw));
        Ok(Json(into_envelope(result, "wellness data")))
    }

    #[tool(
        name = "get_grouped_wellness",
        description = "Summarize wellness trends grouped by week, month, or the whole range",
        output_schema = envelope_output_schema()
    )]
    pub async fn get_grouped_wellness(
        &self,
        params: Parameters<GroupedWellnessParams>,
    ) -> Result<Json<Value>, String> {
        let p = params.0;
        let group_by = p.group_by.as_deref().unwrap_or("month");
        let include_details = p.include_details.unwrap_or(false);
        tracing::info!(oldest = %p.oldest_date, newest = ?p.newest_date, group_by, "fetching grouped wellness data");
        let result = self
            .wellness
            .get_grouped_wellness(
                &p.oldest_date,
                p.newest_date.as_deref(),
                group_by,
                include_details,
            )
            .await;
        Ok(Json(into_envelope(result, "grouped wellness data")))
    }
}

/// Fold a service result into the uniform response envelope.
fn into_envelope(result: Result<Value, IntervalsError>, what: &str) -> Value {
    match result {
        Ok(payload) => success_envelope(payload),
        Err(err @ IntervalsError::Validation { .. }) => {
            tracing::warn!(%err, "validation error fetching {what}");
            error_envelope(&err)
        }
        Err(err) => {
            tracing::error!(%err, "error fetching {what}");
            error_envelope(&err)
        }
    }
}

#[tool_handler]
impl rmcp::ServerHandler for IntervalsMcpHandler {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        let mut info = rmcp::model::ServerInfo::default();
        info.instructions = Some(
            "Intervals.icu MCP server - activity and wellness retrieval with \
             grouping and summary statistics over date ranges."
                .into(),
        );
        info.capabilities = rmcp::model::ServerCapabilities::builder()
            .enable_tools()
            .build();
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::StaticClient;

    #[test]
    fn router_exposes_four_tools() {
        let handler = IntervalsMcpHandler::new(Arc::new(StaticClient::default()));
        assert_eq!(handler.tool_count(), 4);
    }
}
