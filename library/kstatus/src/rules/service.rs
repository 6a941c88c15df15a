//! Service status rule.

use crate::object;
use crate::rules::RuleOutcome as Outcome;
use crate::status::Status;
use serde_json::Value;

pub fn rule(object: &Value) -> Outcome {
    if object::str_field(object, "/spec/type") != Some("LoadBalancer") {
        return Outcome::new(Status::Current, "Service does not require an external IP");
    }

    let has_ingress = object
        .pointer("/status/loadBalancer/ingress")
        .and_then(Value::as_array)
        .map(|ingress| !ingress.is_empty())
        .unwrap_or(false);

    if has_ingress {
        Outcome::new(Status::Current, "LoadBalancer has an assigned IP")
    } else {
        Outcome::new(Status::InProgress, "NoIPAssigned: LoadBalancer has not been assigned an IP")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cluster_ip_is_always_current() {
        let obj = json!({"spec": {"type": "ClusterIP"}});
        assert_eq!(rule(&obj).status, Status::Current);
    }

    #[test]
    fn load_balancer_without_ingress_is_in_progress() {
        let obj = json!({"spec": {"type": "LoadBalancer"}});
        let outcome = rule(&obj);
        assert_eq!(outcome.status, Status::InProgress);
        assert!(outcome.message.starts_with("NoIPAssigned"));
    }

    #[test]
    fn load_balancer_with_ingress_is_current() {
        let obj = json!({
            "spec": {"type": "LoadBalancer"},
            "status": {"loadBalancer": {"ingress": [{"ip": "1.2.3.4"}]}}
        });
        assert_eq!(rule(&obj).status, Status::Current);
    }
}
