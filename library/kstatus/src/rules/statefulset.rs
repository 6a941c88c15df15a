//! StatefulSet status rule.

use crate::object;
use crate::rules::{self, RuleOutcome as Outcome};
use crate::status::Status;
use serde_json::Value;

pub fn rule(object: &Value) -> Outcome {
    let desired = object::int_field(object, "/spec/replicas");

    if let Some(outcome) = rules::deficit("LessReplicas", object::int_field(object, "/status/replicas"), desired) {
        return outcome;
    }
    if let Some(outcome) = rules::deficit("LessReady", object::int_field(object, "/status/readyReplicas"), desired) {
        return outcome;
    }
    if let Some(outcome) = rules::deficit("LessCurrent", object::int_field(object, "/status/currentReplicas"), desired) {
        return outcome;
    }
    if let Some(outcome) = rules::extra(object::int_field(object, "/status/replicas"), desired) {
        return outcome;
    }

    Outcome::new(Status::Current, "StatefulSet has the desired number of replicas")
}
