//! ReplicaSet status rule.

use crate::condition::ConditionStatus;
use crate::object;
use crate::rules::{self, RuleOutcome as Outcome};
use crate::status::Status;
use serde_json::Value;

pub fn rule(object: &Value) -> Outcome {
    let desired = object::int_field(object, "/spec/replicas");

    if object::condition_status(object::conditions_of(object), "ReplicaFailure") == ConditionStatus::True {
        return Outcome::new(Status::InProgress, "ReplicaFailure: ReplicaSet could not create or delete pods");
    }

    if let Some(outcome) = rules::deficit("LessReplicas", object::int_field(object, "/status/replicas"), desired) {
        return outcome;
    }
    if let Some(outcome) = rules::deficit(
        "LessLabelled",
        object::int_field(object, "/status/fullyLabeledReplicas"),
        desired,
    ) {
        return outcome;
    }
    if let Some(outcome) = rules::deficit("LessReady", object::int_field(object, "/status/readyReplicas"), desired) {
        return outcome;
    }
    if let Some(outcome) = rules::deficit(
        "LessAvailable",
        object::int_field(object, "/status/availableReplicas"),
        desired,
    ) {
        return outcome;
    }
    if let Some(outcome) = rules::extra(object::int_field(object, "/status/replicas"), desired) {
        return outcome;
    }

    Outcome::new(Status::Current, "ReplicaSet has the desired number of replicas")
}
