//! Job status rule.

use crate::condition::ConditionStatus;
use crate::object;
use crate::rules::RuleOutcome as Outcome;
use crate::status::Status;
use serde_json::Value;

pub fn rule(object: &Value) -> Outcome {
    let conditions = object::conditions_of(object);

    if object::condition_status(conditions, "Complete") == ConditionStatus::True {
        return Outcome::new(Status::Current, "Job has completed");
    }
    if object::condition_status(conditions, "Failed") == ConditionStatus::True {
        return Outcome::new(Status::Failed, "JobFailed: job has failed");
    }
    // Open question resolved (see DESIGN.md): an explicitly suspended Job
    // is a valid steady state, not a stall.
    if object::condition_status(conditions, "Suspended") == ConditionStatus::True {
        return Outcome::new(Status::Current, "Job is suspended");
    }

    if !object::has_status_block(object) {
        return Outcome::new(Status::InProgress, "JobNotStarted: job has not reported any status yet");
    }

    Outcome::new(Status::Current, "Job is active")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn complete_is_current() {
        let obj = json!({"status": {"conditions": [{"type": "Complete", "status": "True"}]}});
        assert_eq!(rule(&obj).status, Status::Current);
    }

    #[test]
    fn failed_is_failed() {
        let obj = json!({"status": {"conditions": [{"type": "Failed", "status": "True"}]}});
        assert_eq!(rule(&obj).status, Status::Failed);
    }

    #[test]
    fn suspended_is_current_not_in_progress() {
        let obj = json!({"status": {"conditions": [{"type": "Suspended", "status": "True"}]}});
        assert_eq!(rule(&obj).status, Status::Current);
    }

    #[test]
    fn no_status_at_all_is_not_started() {
        let obj = json!({});
        assert_eq!(rule(&obj).status, Status::InProgress);
    }

    #[test]
    fn active_job_is_current() {
        let obj = json!({"status": {"active": 1}});
        assert_eq!(rule(&obj).status, Status::Current);
    }
}
