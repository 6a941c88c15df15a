//! Deployment status rule.
//!
//! The observed-generation precondition is already handled generically in
//! [`crate::rules::compute`]; this rule covers everything after that.

use crate::condition::ConditionStatus;
use crate::object;
use crate::rules::RuleOutcome as Outcome;
use crate::status::Status;
use serde_json::Value;

pub fn rule(object: &Value) -> Outcome {
    let replicas = object::int_field(object, "/spec/replicas");
    let available = object::int_field(object, "/status/availableReplicas");
    if replicas > available {
        return Outcome::new(
            Status::InProgress,
            format!("LessReplicas: {available} of {replicas} replicas available"),
        );
    }

    let conditions = object::conditions_of(object);

    if object::condition_status(conditions, "Progressing") == ConditionStatus::True
        && object::condition_reason(conditions, "Progressing").as_deref() == Some("ProgressDeadlineExceeded")
    {
        return Outcome::new(Status::Failed, "ProgressDeadlineExceeded: rollout has stalled");
    }

    if object::condition_status(conditions, "Progressing") == ConditionStatus::False {
        return Outcome::new(Status::InProgress, "ReplicaSetNotAvailable: new ReplicaSet is not fully available");
    }

    if object::condition_status(conditions, "Available") == ConditionStatus::False {
        return Outcome::new(Status::InProgress, "DeploymentNotAvailable: deployment does not have minimum availability");
    }

    Outcome::new(Status::Current, "Deployment is available")
}
