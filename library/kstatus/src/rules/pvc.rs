//! PersistentVolumeClaim status rule.

use crate::object;
use crate::rules::RuleOutcome as Outcome;
use crate::status::Status;
use serde_json::Value;

pub fn rule(object: &Value) -> Outcome {
    if object::str_field(object, "/status/phase") == Some("Bound") {
        Outcome::new(Status::Current, "PVC is bound")
    } else {
        Outcome::new(Status::InProgress, "NotBound: PVC has not been bound to a volume")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bound_is_current() {
        assert_eq!(rule(&json!({"status": {"phase": "Bound"}})).status, Status::Current);
    }

    #[test]
    fn pending_is_in_progress() {
        let outcome = rule(&json!({"status": {"phase": "Pending"}}));
        assert_eq!(outcome.status, Status::InProgress);
        assert!(outcome.message.starts_with("NotBound"));
    }
}
