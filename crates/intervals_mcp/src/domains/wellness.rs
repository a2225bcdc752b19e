//! Wellness record normalization, summaries, and trend grouping.
//!
//! Raw wellness records are keyed by `id`, which intervals.icu sets to the
//! record's date in YYYY-MM-DD form. Grouping therefore parses `id` rather
//! than a separate timestamp field.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::transforms::{
    average_of, json_number, metric_summary, parse_start_date, period_key, remove_nulls,
};

/// Raw-to-output field renames; everything else the output carries is either
/// derived (`date`, `weight_unit`) or copied under its raw name.
const FIELD_MAP: &[(&str, &str)] = &[
    ("weight", "weight"),
    ("restingHR", "resting_hr"),
    ("hrv", "hrv"),
    ("hrvSDNN", "hrv_sdnn"),
    ("sleepTime", "sleep_time"),
    ("sleepQuality", "sleep_quality"),
    ("atl", "atl"),
    ("ctl", "ctl"),
    ("tsb", "tsb"),
    ("rampRate", "rampRate"),
    ("fatigue", "fatigue"),
    ("mood", "mood"),
    ("motivation", "motivation"),
    ("injury", "injury"),
    ("spO2", "spO2"),
    ("systolic", "systolic"),
    ("diastolic", "diastolic"),
    ("kcalConsumed", "calories_consumed"),
    ("bodyFat", "bodyFat"),
    ("abdomen", "abdomen"),
    ("vo2max", "vo2max"),
    ("comments", "comments"),
    ("athlete_id", "athlete_id"),
];

/// Averages computed for the overall ("all") summary and per-period groups.
const AVERAGE_FIELDS: &[(&str, &str)] = &[
    ("weight", "avg_weight"),
    ("restingHR", "avg_restingHR"),
    ("hrv", "avg_hrv"),
    ("sleepTime", "avg_sleep_time"),
    ("sleepQuality", "avg_sleep_quality"),
    ("fatigue", "avg_fatigue"),
    ("mood", "avg_mood"),
    ("motivation", "avg_motivation"),
];

/// Normalize one raw wellness record into the stable output shape.
pub fn transform_wellness_record(raw: &Value) -> Value {
    let mut out = Map::new();
    if let Some(id) = raw.get("id") {
        out.insert("date".to_string(), id.clone());
    }
    for (source, target) in FIELD_MAP {
        if let Some(v) = raw.get(*source) {
            out.insert((*target).to_string(), v.clone());
        }
    }
    let has_weight = raw
        .get("weight")
        .and_then(Value::as_f64)
        .is_some_and(|w| w != 0.0);
    if has_weight {
        out.insert("weight_unit".to_string(), json!("kg"));
    }
    remove_nulls(&Value::Object(out))
}

pub fn transform_wellness_list(raw: &[Value]) -> Vec<Value> {
    raw.iter().map(transform_wellness_record).collect()
}

/// Wrap a transformed record list in the standard success envelope, with a
/// date range when any records exist.
pub fn transform_wellness_response(raw: &[Value]) -> Value {
    let records = transform_wellness_list(raw);
    let mut out = Map::new();
    out.insert("status".to_string(), json!("success"));
    out.insert("count".to_string(), json!(records.len()));
    if let (Some(first), Some(last)) = (records.first(), records.last()) {
        out.insert(
            "date_range".to_string(),
            json!({
                "oldest": last.get("date").cloned().unwrap_or(Value::Null),
                "newest": first.get("date").cloned().unwrap_or(Value::Null),
            }),
        );
    }
    out.insert("wellness".to_string(), json!(records));
    Value::Object(out)
}

/// Per-metric min/max/average/count over raw records, omitting metrics that
/// were never measured.
pub fn transform_wellness_summary(raw: &[Value]) -> Value {
    if raw.is_empty() {
        return json!({"status": "success", "summary": {}, "count": 0});
    }
    let mut summary = Map::new();
    for (source, target) in [
        ("weight", "weight"),
        ("hrv", "hrv"),
        ("restingHR", "resting_hr"),
        ("sleepTime", "sleep_time"),
        ("sleepQuality", "sleep_quality"),
        ("atl", "atl"),
        ("ctl", "ctl"),
        ("tsb", "tsb"),
    ] {
        if let Some(stats) = metric_summary(raw, source) {
            summary.insert(target.to_string(), stats);
        }
    }
    json!({
        "status": "success",
        "summary": summary,
        "count": raw.len(),
        "date_range": {
            "oldest": raw.last().and_then(|r| r.get("id")).cloned().unwrap_or(Value::Null),
            "newest": raw.first().and_then(|r| r.get("id")).cloned().unwrap_or(Value::Null),
        },
    })
}

/// Aggregate statistics over the whole range as a single group.
pub fn group_all(records: &[Value], include_details: bool) -> Value {
    if records.is_empty() {
        return json!({
            "summary": {},
            "count": 0,
            "date_range": {"oldest": null, "newest": null},
        });
    }
    let mut summary = averages(records);
    for (source, target) in [("weight", "weight"), ("hrv", "hrv")] {
        let values: Vec<f64> = records
            .iter()
            .filter_map(|r| r.get(source).and_then(Value::as_f64))
            .filter(|v| *v != 0.0)
            .collect();
        if !values.is_empty() {
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            summary.insert(format!("min_{target}"), json_number(min));
            summary.insert(format!("max_{target}"), json_number(max));
        }
    }
    summary.insert(
        "avg_injury".to_string(),
        average_value(records, "injury"),
    );
    summary.insert(
        "avg_kcalConsumed".to_string(),
        average_value(records, "kcalConsumed"),
    );

    let mut out = Map::new();
    out.insert("summary".to_string(), Value::Object(summary));
    out.insert("count".to_string(), json!(records.len()));
    out.insert(
        "date_range".to_string(),
        json!({
            "oldest": records.last().and_then(|r| r.get("id")).cloned().unwrap_or(Value::Null),
            "newest": records.first().and_then(|r| r.get("id")).cloned().unwrap_or(Value::Null),
        }),
    );
    if include_details {
        out.insert("records".to_string(), json!(records));
    }
    Value::Object(out)
}

/// Group records by ISO week or month with per-group averages. Records whose
/// `id` is not a date are skipped.
pub fn group_by_period(records: &[Value], period: &str, include_details: bool) -> Value {
    let mut groups: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for record in records {
        let Some(id) = record.get("id").and_then(Value::as_str) else {
            continue;
        };
        let Some(date) = parse_start_date(id) else {
            tracing::debug!(id, "skipping wellness record with unparseable id");
            continue;
        };
        groups
            .entry(period_key(date, period))
            .or_default()
            .push(record.clone());
    }

    let mut out = Map::new();
    for (key, group_records) in groups {
        let mut summary = Map::new();
        summary.insert("count".to_string(), json!(group_records.len()));
        summary.append(&mut averages(&group_records));
        let mut entry = Map::new();
        entry.insert("summary".to_string(), Value::Object(summary));
        if include_details {
            entry.insert("records".to_string(), json!(group_records));
        }
        out.insert(key, Value::Object(entry));
    }
    json!({
        "groups": out,
        "total_records": records.len(),
        "period_type": period,
    })
}

fn averages(records: &[Value]) -> Map<String, Value> {
    let mut out = Map::new();
    for (source, target) in AVERAGE_FIELDS {
        out.insert((*target).to_string(), average_value(records, source));
    }
    out
}

fn average_value(records: &[Value], key: &str) -> Value {
    match average_of(records, key) {
        Some(avg) => json!(avg),
        None => Value::Null,
    }
}
