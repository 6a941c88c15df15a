use chrono::{DateTime, Utc};

/// Tri-state condition status, matching the Kubernetes API convention
/// (`status.conditions[].status`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "True" => ConditionStatus::True,
            "False" => ConditionStatus::False,
            _ => ConditionStatus::Unknown,
        }
    }
}

/// `(type, status, reason, message, lastTransitionTime)` tuple mirroring
/// the Kubernetes API's own condition shape. `condition_type` is either
/// one of the well-known `Reconciling`/`Stalled` synthetic types or a
/// kind-native type lifted verbatim from the object (`Ready`,
/// `Available`, `Progressing`, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub condition_type: String,
    pub status: ConditionStatus,
    pub reason: String,
    pub message: String,
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl Condition {
    pub fn new(
        condition_type: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            condition_type: condition_type.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: None,
        }
    }
}

pub const RECONCILING: &str = "Reconciling";
pub const STALLED: &str = "Stalled";

/// Synthesizes a `Reconciling` or `Stalled` condition matching `status`
/// and `message`, appending it to `conditions` unless a condition of that
/// type is already present. Idempotent: calling this twice never
/// duplicates the synthetic condition, and a pre-existing
/// `lastTransitionTime` on that condition is preserved.
pub fn augment(
    conditions: &mut Vec<Condition>,
    status: crate::status::Status,
    message: &str,
    now: DateTime<Utc>,
) {
    use crate::status::Status;

    let synthetic_type = match status {
        Status::InProgress => Some(RECONCILING),
        Status::Failed => Some(STALLED),
        _ => None,
    };

    let Some(synthetic_type) = synthetic_type else {
        return;
    };

    if let Some(existing) = conditions.iter_mut().find(|c| c.condition_type == synthetic_type) {
        // Already present: leave lastTransitionTime untouched, but keep
        // the reason/message fresh so repeated augmentation reflects the
        // latest computed status.
        existing.reason = status.to_string();
        existing.message = message.to_string();
        return;
    }

    conditions.push(Condition {
        condition_type: synthetic_type.to_string(),
        status: ConditionStatus::True,
        reason: status.to_string(),
        message: message.to_string(),
        last_transition_time: Some(now),
    });
}

/// Well-known synonyms the generic rule accepts in place of `Ready`.
pub fn is_ready_condition_type(condition_type: &str) -> bool {
    matches!(condition_type, "Ready" | "Healthy" | "Available")
}
