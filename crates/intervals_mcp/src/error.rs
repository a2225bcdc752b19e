//! Uniform response envelopes for tool results.
//!
//! Every tool returns a JSON object whose `status` field is either
//! `"success"` or `"error"`. Failures never surface as protocol errors;
//! they are folded into the error envelope so callers can always rely on
//! the same shape.

use serde_json::{Map, Value, json};

use intervals_api::IntervalsError;

/// `{"status": "error", "error": <message>, "field": <name>?}`.
/// `field` is present only for validation failures.
pub fn error_envelope(err: &IntervalsError) -> Value {
    let mut out = Map::new();
    out.insert("status".to_string(), json!("error"));
    out.insert("error".to_string(), json!(err.to_string()));
    if let Some(field) = err.field() {
        out.insert("field".to_string(), json!(field));
    }
    Value::Object(out)
}

/// Stamp `status: "success"` onto a payload object. Payloads that already
/// carry a status (the transformer envelopes) keep theirs.
pub fn success_envelope(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) => {
            map.entry("status".to_string())
                .or_insert_with(|| json!("success"));
            Value::Object(map)
        }
        other => json!({"status": "success", "data": other}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_envelope_carries_field() {
        let err = IntervalsError::validation("oldest_date", "nope", "Date must be in YYYY-MM-DD format");
        let envelope = error_envelope(&err);
        assert_eq!(envelope["status"], "error");
        assert_eq!(envelope["field"], "oldest_date");
        assert!(
            envelope["error"]
                .as_str()
                .unwrap()
                .contains("Date must be in YYYY-MM-DD format")
        );
    }

    #[test]
    fn non_validation_errors_have_no_field_key() {
        let envelope = error_envelope(&IntervalsError::Authentication);
        assert_eq!(envelope["status"], "error");
        assert!(envelope.get("field").is_none());
    }

    #[test]
    fn success_envelope_does_not_overwrite_existing_status() {
        let payload = json!({"status": "success", "count": 1});
        assert_eq!(success_envelope(payload.clone()), payload);

        let bare = json!({"groups": {}});
        let stamped = success_envelope(bare);
        assert_eq!(stamped["status"], "success");
        assert_eq!(stamped["groups"], json!({}));
    }
}
