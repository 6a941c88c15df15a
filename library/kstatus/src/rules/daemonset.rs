//! DaemonSet status rule.
//!
//! DaemonSets desire `status.desiredNumberScheduled` pods, not
//! `spec.replicas` — there is no replica count to declare for a daemon.

use crate::object;
use crate::rules::{self, RuleOutcome as Outcome};
use crate::status::Status;
use serde_json::Value;

pub fn rule(object: &Value) -> Outcome {
    let desired = object::int_field(object, "/status/desiredNumberScheduled");

    if let Some(outcome) = rules::deficit(
        "LessReplicas",
        object::int_field(object, "/status/currentNumberScheduled"),
        desired,
    ) {
        return outcome;
    }
    if let Some(outcome) = rules::deficit("LessReady", object::int_field(object, "/status/numberReady"), desired) {
        return outcome;
    }
    if let Some(outcome) = rules::deficit(
        "LessAvailable",
        object::int_field(object, "/status/numberAvailable"),
        desired,
    ) {
        return outcome;
    }
    if let Some(outcome) = rules::extra(object::int_field(object, "/status/currentNumberScheduled"), desired) {
        return outcome;
    }

    Outcome::new(Status::Current, "DaemonSet is fully rolled out")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn less_available_is_in_progress() {
        let obj = json!({
            "status": {"desiredNumberScheduled": 3, "currentNumberScheduled": 3, "numberReady": 3, "numberAvailable": 2}
        });
        let outcome = rule(&obj);
        assert_eq!(outcome.status, Status::InProgress);
        assert!(outcome.message.starts_with("LessAvailable"));
    }

    #[test]
    fn fully_scheduled_is_current() {
        let obj = json!({
            "status": {"desiredNumberScheduled": 2, "currentNumberScheduled": 2, "numberReady": 2, "numberAvailable": 2}
        });
        assert_eq!(rule(&obj).status, Status::Current);
    }
}
