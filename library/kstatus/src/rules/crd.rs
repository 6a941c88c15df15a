//! CustomResourceDefinition status rule.

use crate::condition::ConditionStatus;
use crate::object;
use crate::rules::RuleOutcome as Outcome;
use crate::status::Status;
use serde_json::Value;

pub fn rule(object: &Value) -> Outcome {
    let conditions = object::conditions_of(object);

    if object::condition_status(conditions, "NamesAccepted") == ConditionStatus::False {
        return Outcome::new(Status::Failed, "NamesAccepted is False");
    }

    if object::condition_status(conditions, "Established") == ConditionStatus::True {
        return Outcome::new(Status::Current, "CRD is established");
    }

    if object::condition_status(conditions, "Established") == ConditionStatus::False {
        let reason = object::condition_reason(conditions, "Established");
        if reason.as_deref() == Some("Installing") || reason.is_none() {
            return Outcome::new(Status::InProgress, "Installing: CRD is being installed");
        }
        return Outcome::new(Status::Failed, format!("Established is False: {}", reason.unwrap()));
    }

    Outcome::new(Status::InProgress, "Installing: CRD has not reported Established yet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_not_accepted_is_failed() {
        let obj = json!({"status": {"conditions": [{"type": "NamesAccepted", "status": "False"}]}});
        assert_eq!(rule(&obj).status, Status::Failed);
    }

    #[test]
    fn established_true_is_current() {
        let obj = json!({"status": {"conditions": [{"type": "Established", "status": "True"}]}});
        assert_eq!(rule(&obj).status, Status::Current);
    }

    #[test]
    fn established_false_installing_is_in_progress() {
        let obj = json!({"status": {"conditions": [{"type": "Established", "status": "False", "reason": "Installing"}]}});
        assert_eq!(rule(&obj).status, Status::InProgress);
    }

    #[test]
    fn established_false_other_reason_is_failed() {
        let obj = json!({"status": {"conditions": [{"type": "Established", "status": "False", "reason": "NameConflict"}]}});
        assert_eq!(rule(&obj).status, Status::Failed);
    }

    #[test]
    fn absent_conditions_is_in_progress() {
        let obj = json!({"status": {}});
        assert_eq!(rule(&obj).status, Status::InProgress);
    }
}
