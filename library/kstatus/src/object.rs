//! Field-path accessors over an object's JSON representation.
//!
//! Status rules need to tolerate kinds they know nothing about (CRDs,
//! anything not in the built-in dispatch table), so they operate on the
//! raw nested map rather than a decoded struct. `kube::api::DynamicObject::data`
//! already gives us exactly this shape; everything in this module is
//! `(value, present)` style lookups over that `serde_json::Value`, never
//! a strict decode.

use crate::condition::{Condition, ConditionStatus};
use serde_json::Value;

/// Looks up a condition of the given type in `status.conditions`. Missing
/// boolean conditions default to `Unknown`, never `False` — a condition
/// we've never observed isn't evidence it's false.
pub fn find_condition<'a>(conditions: &'a [Value], condition_type: &str) -> Option<&'a Value> {
    conditions
        .iter()
        .find(|c| c.get("type").and_then(Value::as_str) == Some(condition_type))
}

pub fn condition_status(conditions: &[Value], condition_type: &str) -> ConditionStatus {
    find_condition(conditions, condition_type)
        .and_then(|c| c.get("status"))
        .and_then(Value::as_str)
        .map(ConditionStatus::parse)
        .unwrap_or(ConditionStatus::Unknown)
}

pub fn condition_reason(conditions: &[Value], condition_type: &str) -> Option<String> {
    find_condition(conditions, condition_type)
        .and_then(|c| c.get("reason"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Returns `status.conditions` as a slice, or an empty slice if the
/// object carries no status block or no conditions array at all.
pub fn conditions_of(object: &Value) -> &[Value] {
    object
        .pointer("/status/conditions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Decodes `status.conditions` into our [`Condition`] model, skipping
/// entries malformed enough to be missing a `type`.
pub fn decode_conditions(object: &Value) -> Vec<Condition> {
    conditions_of(object)
        .iter()
        .filter_map(|c| {
            let condition_type = c.get("type")?.as_str()?.to_string();
            let status = c
                .get("status")
                .and_then(Value::as_str)
                .map(ConditionStatus::parse)
                .unwrap_or(ConditionStatus::Unknown);
            let reason = c.get("reason").and_then(Value::as_str).unwrap_or("").to_string();
            let message = c.get("message").and_then(Value::as_str).unwrap_or("").to_string();
            let last_transition_time = c
                .get("lastTransitionTime")
                .and_then(Value::as_str)
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&chrono::Utc));
            Some(Condition {
                condition_type,
                status,
                reason,
                message,
                last_transition_time,
            })
        })
        .collect()
}

pub fn deletion_timestamp_set(object: &Value) -> bool {
    object
        .pointer("/metadata/deletionTimestamp")
        .map(|v| !v.is_null())
        .unwrap_or(false)
}

pub fn generation(object: &Value) -> Option<i64> {
    object.pointer("/metadata/generation").and_then(Value::as_i64)
}

pub fn observed_generation(object: &Value) -> Option<i64> {
    object.pointer("/status/observedGeneration").and_then(Value::as_i64)
}

/// Missing integer fields default to 0.
pub fn int_field(object: &Value, pointer: &str) -> i64 {
    object.pointer(pointer).and_then(Value::as_i64).unwrap_or(0)
}

pub fn str_field<'a>(object: &'a Value, pointer: &str) -> Option<&'a str> {
    object.pointer(pointer).and_then(Value::as_str)
}

pub fn has_status_block(object: &Value) -> bool {
    object.pointer("/status").is_some()
}

pub fn name_of(object: &Value) -> &str {
    object.pointer("/metadata/name").and_then(Value::as_str).unwrap_or("")
}

/// Converts `spec.selector.matchLabels` into a label-selector string
/// (`k=v,k2=v2`, keys sorted for determinism) for listing a controller's
/// generated children. `matchExpressions` selectors are not produced by
/// any built-in generated-kind relationship this crate computes statuses
/// for, so they are not translated here.
pub fn label_selector_string(object: &Value) -> Option<String> {
    let labels = object.pointer("/spec/selector/matchLabels")?.as_object()?;
    let mut pairs: Vec<(String, String)> = labels
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
        .collect();
    if pairs.is_empty() {
        return None;
    }
    pairs.sort();
    Some(
        pairs
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Writes the augmented condition list back into a clone of `object`'s
/// `status.conditions`, so the stored [`crate::resource_status::ResourceStatus`]
/// snapshot reflects the synthesized Reconciling/Stalled condition instead
/// of only the conditions the object itself reported.
pub fn with_conditions(object: &Value, conditions: &[Condition]) -> Value {
    let mut out = object.clone();
    let array: Vec<Value> = conditions
        .iter()
        .map(|c| {
            let mut entry = serde_json::json!({
                "type": c.condition_type,
                "status": c.status.as_str(),
                "reason": c.reason,
                "message": c.message,
            });
            if let Some(transition) = c.last_transition_time {
                entry["lastTransitionTime"] = Value::String(transition.to_rfc3339());
            }
            entry
        })
        .collect();

    if !out.is_object() {
        return out;
    }
    let map = out.as_object_mut().unwrap();
    map.entry("status")
        .or_insert_with(|| serde_json::json!({}))
        .as_object_mut()
        .map(|status| status.insert("conditions".to_string(), Value::Array(array)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_condition_defaults_to_unknown() {
        let obj = json!({"status": {"conditions": []}});
        assert_eq!(condition_status(conditions_of(&obj), "Ready"), ConditionStatus::Unknown);
    }

    #[test]
    fn missing_integer_defaults_to_zero() {
        let obj = json!({});
        assert_eq!(int_field(&obj, "/status/replicas"), 0);
    }

    #[test]
    fn deletion_timestamp_detection() {
        assert!(!deletion_timestamp_set(&json!({})));
        assert!(deletion_timestamp_set(&json!({"metadata": {"deletionTimestamp": "2024-01-01T00:00:00Z"}})));
    }
}
