// Property normalization
//
// `device/properties/get` returns a mapping whose entries are either a raw
// scalar or a `{ "value": x, "time": ms }` pair. The pair is resolved once,
// here, into the canonical scalar-only `Properties` mapping; nothing past
// this module sees the timed shape.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Canonical per-device property table: key → scalar.
pub type Properties = BTreeMap<String, Value>;

/// A single property as the vendor reports it.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Already a bare value.
    Scalar(Value),
    /// `{value, time}` pair; `time_ms` is the report time in milliseconds.
    Timed { value: Value, time_ms: Option<i64> },
}

impl PropertyValue {
    /// The scalar this property collapses to.
    pub fn value(&self) -> &Value {
        match self {
            Self::Scalar(value) | Self::Timed { value, .. } => value,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Scalar(value) | Self::Timed { value, .. } => value,
        }
    }

    /// Report time, only present on the timed shape.
    pub fn time_ms(&self) -> Option<i64> {
        match self {
            Self::Scalar(_) => None,
            Self::Timed { time_ms, .. } => *time_ms,
        }
    }

    /// Report time as a UTC timestamp.
    pub fn reported_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.time_ms()
            .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
    }
}

impl From<Value> for PropertyValue {
    /// Any object carrying a `value` key is the timed shape; everything else
    /// passes through untouched.
    fn from(raw: Value) -> Self {
        match raw {
            Value::Object(mut obj) if obj.contains_key("value") => {
                let time_ms = obj.get("time").and_then(Value::as_i64);
                let value = obj.remove("value").unwrap_or(Value::Null);
                Self::Timed { value, time_ms }
            }
            other => Self::Scalar(other),
        }
    }
}

/// Parse a raw `data` object into tagged property values.
pub fn parse_properties(raw: Map<String, Value>) -> BTreeMap<String, PropertyValue> {
    raw.into_iter()
        .map(|(key, value)| (key, PropertyValue::from(value)))
        .collect()
}

/// Collapse tagged property values to the canonical scalar table.
pub fn flatten(values: BTreeMap<String, PropertyValue>) -> Properties {
    values
        .into_iter()
        .map(|(key, value)| (key, value.into_value()))
        .collect()
}

/// Normalize a raw `data` object: every `{value, time}` entry becomes its
/// `value`; scalars pass through.
///
/// Unwraps exactly one level, so it is idempotent only while no unwrapped
/// `value` is itself an object with a `value` key. A nested timed object
/// loses one level per pass.
pub fn normalize(raw: Map<String, Value>) -> Properties {
    flatten(parse_properties(raw))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn strips_time_and_keeps_values() {
        let normalized = normalize(object(json!({
            "workstatus": { "value": 5, "time": 123 },
            "catWeight": 1800
        })));

        let expected: Properties = [
            ("catWeight".to_string(), json!(1800)),
            ("workstatus".to_string(), json!(5)),
        ]
        .into_iter()
        .collect();
        assert_eq!(normalized, expected);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize(object(json!({
            "workstatus": { "value": 1, "time": 1_760_000_000_000_i64 },
            "mcuversion": { "value": "1.0.7", "time": 1_760_000_000_000_i64 },
            "childLockOnOff": 0,
            "DisplaySwitch": true
        })));
        let twice = normalize(once.clone().into_iter().collect());
        assert_eq!(once, twice);
    }

    #[test]
    fn nested_timed_value_unwraps_one_level_per_pass() {
        let once = normalize(object(json!({
            "odd": { "value": { "value": 1, "time": 2 }, "time": 3 }
        })));
        assert_eq!(once["odd"], json!({ "value": 1, "time": 2 }));

        let twice = normalize(once.into_iter().collect());
        assert_eq!(twice["odd"], json!(1));
    }

    #[test]
    fn flat_mapping_is_unchanged() {
        let flat = object(json!({ "handMode": 2, "catLitterType": 1, "trdversion": "A1" }));
        let normalized = normalize(flat.clone());
        assert_eq!(normalized, flat.into_iter().collect::<Properties>());
    }

    #[test]
    fn objects_without_value_pass_through() {
        let normalized = normalize(object(json!({ "schedule": { "start": 22, "end": 7 } })));
        assert_eq!(normalized["schedule"], json!({ "start": 22, "end": 7 }));
    }

    #[test]
    fn timed_values_keep_report_time() {
        let values = parse_properties(object(json!({
            "workstatus": { "value": 5, "time": 1_760_000_000_000_i64 },
            "catWeight": 1800
        })));

        let status = &values["workstatus"];
        assert_eq!(status.value(), &json!(5));
        assert_eq!(status.time_ms(), Some(1_760_000_000_000));
        assert_eq!(
            status.reported_at().unwrap().timestamp(),
            1_760_000_000
        );
        assert_eq!(values["catWeight"].time_ms(), None);
    }
}
