//! The fallback rule for kinds with no dedicated entry in the dispatch
//! table. Handles the open set of custom kinds by scanning for a
//! `Ready`-like condition.

use crate::condition::{self, ConditionStatus};
use crate::object;
use crate::rules::RuleOutcome as Outcome;
use crate::status::Status;
use serde_json::Value;

pub fn rule(object: &Value) -> Outcome {
    if !object::has_status_block(object) {
        return Outcome::new(Status::Current, "Resource has no status block");
    }

    let conditions = object::conditions_of(object);
    let ready = conditions
        .iter()
        .find(|c| {
            c.get("type")
                .and_then(Value::as_str)
                .is_some_and(condition::is_ready_condition_type)
        });

    match ready {
        None => Outcome::new(Status::Current, "No readiness condition reported"),
        Some(c) => {
            let status = c
                .get("status")
                .and_then(Value::as_str)
                .map(ConditionStatus::parse)
                .unwrap_or(ConditionStatus::Unknown);
            if status == ConditionStatus::False {
                let reason = c.get("reason").and_then(Value::as_str).unwrap_or("NotReady");
                Outcome::new(Status::InProgress, reason.to_string())
            } else {
                Outcome::new(Status::Current, "Resource is ready")
            }
        }
    }
}
