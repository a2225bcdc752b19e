//! Activity normalization and grouping.
//!
//! intervals.icu spreads its computed metrics across `icu_*`-prefixed fields;
//! [`transform_activity`] flattens those into stable names and strips fields
//! that carry no data. Grouping reduces a raw activity list into per-sport or
//! per-period summaries so responses stay small over long date ranges.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::transforms::{
    is_empty_value, json_number, normalize_datetime, parse_start_date, period_key, remove_nulls,
};

/// Field pairs copied verbatim from the raw activity into the output.
const PASSTHROUGH_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("name", "name"),
    ("type", "type"),
    ("moving_time", "moving_time"),
    ("elapsed_time", "elapsed_time"),
    ("distance", "distance"),
    ("icu_elevation_gain", "elevation_gain"),
    ("icu_average_speed", "average_speed"),
    ("icu_max_speed", "max_speed"),
    ("icu_average_cadence", "average_cadence"),
    ("average_heartrate", "average_heartrate"),
    ("max_heartrate", "max_heartrate"),
    ("icu_average_watts", "average_watts"),
    ("icu_max_watts", "max_watts"),
    ("icu_normalized_power", "normalized_power"),
    ("icu_training_load", "training_load"),
    ("calories", "calories"),
    ("device_name", "device_name"),
    ("tags", "tags"),
    ("description", "description"),
    ("athlete_id", "athlete_id"),
    ("source", "source"),
    ("external_id", "external_id"),
];

/// Normalize one raw activity into the stable output shape.
pub fn transform_activity(raw: &Value) -> Value {
    let mut out = Map::new();
    for (source, target) in PASSTHROUGH_FIELDS {
        if let Some(v) = raw.get(*source) {
            out.insert((*target).to_string(), v.clone());
        }
    }
    if let Some(start) = raw.get("start_date_local").and_then(Value::as_str) {
        out.insert("start_date".to_string(), json!(normalize_datetime(start)));
    }
    if let Some(doc) = transform_workout_doc(raw.get("workout_doc")) {
        out.insert("workout_doc".to_string(), doc);
    }
    if let Some(intervals) = transform_intervals(raw.get("intervals")) {
        out.insert("intervals".to_string(), intervals);
    }
    remove_nulls(&Value::Object(out))
}

pub fn transform_activities_list(raw: &[Value]) -> Vec<Value> {
    raw.iter().map(transform_activity).collect()
}

/// Wrap a transformed activity list in the standard success envelope.
pub fn transform_activities_response(raw: &[Value]) -> Value {
    let activities = transform_activities_list(raw);
    json!({
        "status": "success",
        "count": activities.len(),
        "activities": activities,
    })
}

fn transform_workout_doc(doc: Option<&Value>) -> Option<Value> {
    let doc = doc?.as_object()?;
    let mut out = Map::new();
    for key in ["name", "description", "target", "duration"] {
        if let Some(v) = doc.get(key) {
            out.insert(key.to_string(), v.clone());
        }
    }
    Some(Value::Object(out))
}

/// Keep only planned-interval entries that carry at least one real value.
fn transform_intervals(intervals: Option<&Value>) -> Option<Value> {
    let intervals = intervals?.as_array()?;
    let mut out = Vec::new();
    for entry in intervals {
        let Some(entry) = entry.as_object() else {
            continue;
        };
        let mut slim = Map::new();
        for key in [
            "name",
            "type",
            "duration",
            "distance",
            "average_power",
            "average_heartrate",
            "average_cadence",
        ] {
            if let Some(v) = entry.get(key) {
                slim.insert(key.to_string(), v.clone());
            }
        }
        // Numeric zero counts as empty whether it arrives as integer or float.
        let has_data = slim.values().any(|v| match v.as_f64() {
            Some(n) => n != 0.0,
            None => !is_empty_value(v) && *v != Value::Bool(false),
        });
        if has_data {
            out.push(remove_nulls(&Value::Object(slim)));
        }
    }
    if out.is_empty() { None } else { Some(json!(out)) }
}

/// Group raw activities by sport type with per-sport volume totals.
pub fn group_by_sport(activities: &[Value], include_details: bool) -> Value {
    let mut groups: BTreeMap<String, SportGroup> = BTreeMap::new();
    for activity in activities {
        let sport = activity
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        let group = groups.entry(sport).or_default();
        group.count += 1;
        group.duration += numeric(activity, "moving_time");
        group.distance += numeric(activity, "distance");
        group.elevation += numeric(activity, "icu_elevation_gain");
        if include_details {
            group.details.push(filtered_fields(
                activity,
                &[
                    "id",
                    "name",
                    "start_date_local",
                    "moving_time",
                    "distance",
                    "icu_elevation_gain",
                    "icu_average_watts",
                    "average_heartrate",
                ],
            ));
        }
    }

    let mut out = Map::new();
    for (sport, group) in groups {
        let mut entry = Map::new();
        entry.insert("count".to_string(), json!(group.count));
        entry.insert("total_duration".to_string(), json_number(group.duration));
        entry.insert("total_distance".to_string(), json_number(group.distance));
        entry.insert("total_elevation".to_string(), json_number(group.elevation));
        if include_details {
            entry.insert("activities".to_string(), json!(group.details));
        }
        out.insert(sport, Value::Object(entry));
    }
    json!({
        "groups": out,
        "total_activities": activities.len(),
        "date_range": {
            "oldest": activities.last().and_then(|a| a.get("start_date_local")).cloned().unwrap_or(Value::Null),
            "newest": activities.first().and_then(|a| a.get("start_date_local")).cloned().unwrap_or(Value::Null),
        },
    })
}

/// Group raw activities by calendar period. Activities whose timestamp
/// cannot be parsed are skipped rather than failing the whole request.
pub fn group_by_time_period(activities: &[Value], period: &str, include_details: bool) -> Value {
    let mut groups: BTreeMap<String, PeriodGroup> = BTreeMap::new();
    for activity in activities {
        let Some(start) = activity.get("start_date_local").and_then(Value::as_str) else {
            continue;
        };
        let Some(date) = parse_start_date(start) else {
            tracing::debug!(start, "skipping activity with unparseable timestamp");
            continue;
        };
        let key = period_key(date, period);
        let group = groups.entry(key).or_default();
        group.count += 1;
        group.sports.insert(
            activity
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string(),
        );
        group.duration += numeric(activity, "moving_time");
        group.distance += numeric(activity, "distance");
        if include_details {
            group.details.push(filtered_fields(
                activity,
                &[
                    "id",
                    "name",
                    "type",
                    "start_date_local",
                    "moving_time",
                    "distance",
                ],
            ));
        }
    }

    let mut out = Map::new();
    for (key, group) in groups {
        let mut entry = Map::new();
        entry.insert("count".to_string(), json!(group.count));
        entry.insert(
            "sports".to_string(),
            json!(group.sports.into_iter().collect::<Vec<_>>()),
        );
        entry.insert("total_duration".to_string(), json_number(group.duration));
        entry.insert("total_distance".to_string(), json_number(group.distance));
        if include_details {
            entry.insert("activities".to_string(), json!(group.details));
        }
        out.insert(key, Value::Object(entry));
    }
    json!({
        "groups": out,
        "total_activities": activities.len(),
        "period_type": period,
    })
}

#[derive(Default)]
struct SportGroup {
    count: usize,
    duration: f64,
    distance: f64,
    elevation: f64,
    details: Vec<Value>,
}

#[derive(Default)]
struct PeriodGroup {
    count: usize,
    sports: std::collections::BTreeSet<String>,
    duration: f64,
    distance: f64,
    details: Vec<Value>,
}

fn numeric(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn filtered_fields(value: &Value, keys: &[&str]) -> Value {
    let mut out = Map::new();
    for key in keys {
        if let Some(v) = value.get(*key) {
            out.insert((*key).to_string(), v.clone());
        }
    }
    Value::Object(out)
}
