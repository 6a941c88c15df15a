//! PodDisruptionBudget status rule.
//!
//! Only the observed-generation precondition applies, and that is already
//! handled generically in [`crate::rules::compute`] before dispatch.

use crate::rules::RuleOutcome as Outcome;
use crate::status::Status;
use serde_json::Value;

pub fn rule(_object: &Value) -> Outcome {
    Outcome::new(Status::Current, "PodDisruptionBudget has observed the latest generation")
}
