//! Pod status rule.

use crate::condition::ConditionStatus;
use crate::object;
use crate::rules::RuleOutcome as Outcome;
use crate::status::Status;
use serde_json::Value;

pub fn rule(object: &Value) -> Outcome {
    let phase = object::str_field(object, "/status/phase");

    if matches!(phase, Some("Succeeded") | Some("Failed")) {
        return Outcome::new(Status::Current, format!("Pod phase is {}", phase.unwrap()));
    }

    let conditions = object::conditions_of(object);
    if object::condition_status(conditions, "Ready") == ConditionStatus::True {
        return Outcome::new(Status::Current, "Pod is ready");
    }

    if object::condition_status(conditions, "PodScheduled") == ConditionStatus::False
        && object::condition_reason(conditions, "PodScheduled").as_deref() == Some("Unschedulable")
    {
        return Outcome::new(Status::Failed, "PodUnschedulable: pod could not be scheduled");
    }

    if let Some(reason) = crashing_container_reason(object) {
        return Outcome::new(Status::Failed, reason);
    }

    let reason = match phase {
        None => "PodNotObserved: status.phase has not been reported yet",
        Some("Pending") => "PodPending: pod has not started running",
        Some("Running") => "PodRunningNotReady: pod is running but not yet ready",
        Some(other) => return Outcome::new(Status::InProgress, format!("Pod phase is {other}")),
    };
    Outcome::new(Status::InProgress, reason)
}

/// Scans `status.containerStatuses` (and `initContainerStatuses`) for a
/// waiting reason that means the pod has failed outright.
fn crashing_container_reason(object: &Value) -> Option<String> {
    for array in ["containerStatuses", "initContainerStatuses"] {
        let statuses = object
            .pointer(&format!("/status/{array}"))
            .and_then(Value::as_array);
        let Some(statuses) = statuses else { continue };
        for status in statuses {
            if let Some(reason) = status.pointer("/state/waiting/reason").and_then(Value::as_str) {
                if matches!(reason, "CrashLoopBackOff" | "ImagePullBackOff") {
                    return Some(format!("{reason}: container is not starting"));
                }
            }
        }
    }
    None
}
