//! Shared JSON shaping helpers used by both domain transformers.
//!
//! Responses sent back through tools are cleaned with [`remove_nulls`] so the
//! payload carries only fields that hold data. Cleaning is idempotent: running
//! it twice produces the same value as running it once.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

/// Values treated as "no data" when deciding whether to keep an object key.
/// Empty objects are deliberately not in this set; a key whose value cleans
/// to `{}` stays in the output.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Recursively drop object keys whose cleaned value is null, an empty string,
/// or an empty array. Array elements are cleaned in place and only nulls are
/// dropped, so element positions of real data survive.
pub fn remove_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut cleaned = Map::new();
            for (key, item) in map {
                let item = remove_nulls(item);
                if !is_empty_value(&item) {
                    cleaned.insert(key.clone(), item);
                }
            }
            Value::Object(cleaned)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(remove_nulls)
                .filter(|item| !item.is_null())
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Re-emit an RFC 3339 timestamp in canonical form; anything else passes
/// through untouched.
pub fn normalize_datetime(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.to_rfc3339(),
        Err(_) => raw.to_string(),
    }
}

/// Parse the calendar date out of an activity or wellness timestamp.
///
/// Accepts a bare date, a local datetime without offset (the shape
/// intervals.icu uses for `start_date_local`), or a full RFC 3339 timestamp.
pub fn parse_start_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

/// Grouping key for a date under a calendar period.
///
/// Weeks are ISO 8601 weeks, keyed by the ISO week-year so days at year
/// boundaries land in the week they actually belong to.
pub fn period_key(date: NaiveDate, period: &str) -> String {
    match period {
        "day" => date.format("%Y-%m-%d").to_string(),
        "week" => {
            let iso = date.iso_week();
            format!("{}-W{:02}", iso.year(), iso.week())
        }
        _ => date.format("%Y-%m").to_string(),
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Emit a JSON number, preferring an integer when the value has no
/// fractional part so sums of integer fields stay integers.
pub fn json_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

/// Mean of the non-null numeric values under `key`, rounded to two decimals.
/// `None` when no record carries a numeric value for the key.
pub fn average_of(records: &[Value], key: &str) -> Option<f64> {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|r| r.get(key).and_then(Value::as_f64))
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(round2(values.iter().sum::<f64>() / values.len() as f64))
}

/// Per-metric summary over the non-zero values under `key`.
///
/// Zero is treated as "not measured" here, matching how intervals.icu
/// reports absent wellness metrics. `None` when nothing was measured.
pub fn metric_summary(records: &[Value], key: &str) -> Option<Value> {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|r| r.get(key).and_then(Value::as_f64))
        .filter(|v| *v != 0.0)
        .collect();
    if values.is_empty() {
        return None;
    }
    let count = values.len();
    let sum: f64 = values.iter().sum();
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Some(serde_json::json!({
        "average": round2(sum / count as f64),
        "min": json_number(min),
        "max": json_number(max),
        "count": count,
    }))
}
