//! Per-kind status computation. Pure: no server calls, errors only for
//! malformed input.

mod crd;
mod daemonset;
mod deployment;
mod generic;
mod job;
mod pdb;
mod pvc;
mod replicaset;
mod service;
mod statefulset;

mod pod;

use crate::condition::{self, Condition};
use crate::errors::{EngineError, Result};
use crate::identifier::GroupKind;
use crate::object;
use crate::status::Status;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Output of a status rule, pre-augmentation.
pub struct RuleOutcome {
    pub status: Status,
    pub message: String,
}

impl RuleOutcome {
    fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Shared building block for the replica-set family's fixed-order deficit
/// checks: `actual < desired` yields `InProgress` with `reason`;
/// `actual >= desired` is not a deficit here (callers chain these in a
/// fixed order: LessReplicas, LessLabelled, LessReady, LessAvailable,
/// LessCurrent).
pub(crate) fn deficit(reason: &str, actual: i64, desired: i64) -> Option<RuleOutcome> {
    if actual < desired {
        Some(RuleOutcome::new(
            Status::InProgress,
            format!("{reason}: {actual} of {desired}"),
        ))
    } else {
        None
    }
}

/// `actual > desired` — stale pods from a prior revision still present
/// (the `ExtraPods` reason in the same fixed-order chain).
pub(crate) fn extra(actual: i64, desired: i64) -> Option<RuleOutcome> {
    if actual > desired {
        Some(RuleOutcome::new(
            Status::InProgress,
            format!("ExtraPods: {actual} present, {desired} desired"),
        ))
    } else {
        None
    }
}

/// Applies the fixed ordering policy: deletion check, observed-generation
/// check, kind dispatch (or generic fallback), then condition
/// augmentation. Returns the computed `Status`, a message, and the
/// (possibly augmented) condition list.
pub fn compute(
    group_kind: &GroupKind,
    object: &Value,
    now: DateTime<Utc>,
) -> Result<(Status, String, Vec<Condition>)> {
    if !object.is_object() {
        return Err(EngineError::Compute(
            "object snapshot is not a JSON object".to_string(),
        ));
    }

    let outcome = if object::deletion_timestamp_set(object) {
        RuleOutcome::new(Status::Terminating, "Resource is being deleted")
    } else if let (Some(generation), Some(observed)) =
        (object::generation(object), object::observed_generation(object))
    {
        if generation > observed {
            RuleOutcome::new(
                Status::InProgress,
                "LatestGenerationNotObserved: waiting for the controller to observe the latest generation",
            )
        } else {
            dispatch(group_kind, object)?
        }
    } else {
        dispatch(group_kind, object)?
    };

    let mut conditions = object::decode_conditions(object);
    condition::augment(&mut conditions, outcome.status, &outcome.message, now);

    Ok((outcome.status, outcome.message, conditions))
}

fn dispatch(group_kind: &GroupKind, object: &Value) -> Result<RuleOutcome> {
    let outcome = match (group_kind.group.as_str(), group_kind.kind.as_str()) {
        ("", "Pod") => pod::rule(object),
        ("apps", "Deployment") => deployment::rule(object),
        ("apps", "StatefulSet") => statefulset::rule(object),
        ("apps", "DaemonSet") => daemonset::rule(object),
        ("apps", "ReplicaSet") => replicaset::rule(object),
        ("batch", "Job") => job::rule(object),
        ("apiextensions.k8s.io", "CustomResourceDefinition") => crd::rule(object),
        ("", "Service") => service::rule(object),
        ("", "PersistentVolumeClaim") => pvc::rule(object),
        ("policy", "PodDisruptionBudget") => pdb::rule(object),
        _ => generic::rule(object),
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deletion_timestamp_wins_over_everything() {
        let obj = json!({
            "metadata": {"deletionTimestamp": "2024-01-01T00:00:00Z", "generation": 5},
            "status": {"observedGeneration": 1}
        });
        let (status, _, _) = compute(&GroupKind::new("apps", "Deployment"), &obj, Utc::now()).unwrap();
        assert_eq!(status, Status::Terminating);
    }

    #[test]
    fn stale_generation_is_in_progress_regardless_of_kind_rule() {
        let obj = json!({
            "metadata": {"generation": 3},
            "status": {"observedGeneration": 2, "availableReplicas": 5},
            "spec": {"replicas": 1}
        });
        let (status, message, _) = compute(&GroupKind::new("apps", "Deployment"), &obj, Utc::now()).unwrap();
        assert_eq!(status, Status::InProgress);
        assert!(message.contains("LatestGenerationNotObserved"));
    }

    #[test]
    fn malformed_object_is_a_compute_error() {
        let obj = json!("not an object");
        let err = compute(&GroupKind::new("", "Pod"), &obj, Utc::now()).unwrap_err();
        matches!(err, EngineError::Compute(_));
    }

    #[test]
    fn unknown_kind_falls_through_to_generic() {
        let obj = json!({"status": {"conditions": [{"type": "Ready", "status": "True"}]}});
        let (status, _, _) = compute(&GroupKind::new("example.com", "Widget"), &obj, Utc::now()).unwrap();
        assert_eq!(status, Status::Current);
    }
}
