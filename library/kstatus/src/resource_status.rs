use crate::identifier::ObjectIdentifier;
use crate::status::Status;
use serde_json::Value;

/// The per-object observation. `resource` is the object snapshot as read
/// at the moment of observation, or `None` when the object could not be
/// read (`NotFound`, or `Unknown` with `error` set).
#[derive(Clone, Debug)]
pub struct ResourceStatus {
    pub identifier: ObjectIdentifier,
    pub status: Status,
    pub resource: Option<Value>,
    pub message: String,
    pub error: Option<String>,
    pub generated_resources: Vec<ResourceStatus>,
}

impl ResourceStatus {
    pub fn new(identifier: ObjectIdentifier, status: Status, message: impl Into<String>) -> Self {
        Self {
            identifier,
            status,
            resource: None,
            message: message.into(),
            error: None,
            generated_resources: Vec::new(),
        }
    }

    pub fn not_found(identifier: ObjectIdentifier) -> Self {
        Self::new(identifier, Status::NotFound, "Resource not found")
    }

    pub fn unknown(identifier: ObjectIdentifier, error: impl Into<String>) -> Self {
        let mut rs = Self::new(identifier, Status::Unknown, "");
        rs.error = Some(error.into());
        rs
    }

    pub fn with_resource(mut self, resource: Value) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_generated_resources(mut self, mut children: Vec<ResourceStatus>) -> Self {
        children.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        self.generated_resources = children;
        self
    }

    /// Observational equality: identifier, status, message, and
    /// error-string must match, and `generated_resources` must be
    /// element-wise observationally equal. Drives change suppression in
    /// the engine and watcher so an unchanged object never re-emits.
    pub fn observationally_eq(&self, other: &ResourceStatus) -> bool {
        self.identifier == other.identifier
            && self.status == other.status
            && self.message == other.message
            && self.error == other.error
            && self.generated_resources.len() == other.generated_resources.len()
            && self
                .generated_resources
                .iter()
                .zip(other.generated_resources.iter())
                .all(|(a, b)| a.observationally_eq(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::GroupKind;

    fn id(name: &str) -> ObjectIdentifier {
        ObjectIdentifier::new(GroupKind::new("apps", "Deployment"), "default", name)
    }

    #[test]
    fn identical_statuses_are_observationally_equal() {
        let a = ResourceStatus::new(id("foo"), Status::Current, "ok");
        let b = ResourceStatus::new(id("foo"), Status::Current, "ok");
        assert!(a.observationally_eq(&b));
    }

    #[test]
    fn differing_messages_are_not_equal() {
        let a = ResourceStatus::new(id("foo"), Status::Current, "ok");
        let b = ResourceStatus::new(id("foo"), Status::Current, "different");
        assert!(!a.observationally_eq(&b));
    }

    #[test]
    fn differing_generated_resources_are_not_equal() {
        let child_a = ResourceStatus::new(id("rs-1"), Status::Current, "ok");
        let child_b = ResourceStatus::new(id("rs-1"), Status::InProgress, "ok");
        let a = ResourceStatus::new(id("foo"), Status::Current, "ok").with_generated_resources(vec![child_a]);
        let b = ResourceStatus::new(id("foo"), Status::Current, "ok").with_generated_resources(vec![child_b]);
        assert!(!a.observationally_eq(&b));
    }

    #[test]
    fn generated_resources_are_sorted_by_identifier() {
        let rs_b = ResourceStatus::new(id("b"), Status::Current, "ok");
        let rs_a = ResourceStatus::new(id("a"), Status::Current, "ok");
        let parent = ResourceStatus::new(id("parent"), Status::Current, "ok")
            .with_generated_resources(vec![rs_b, rs_a]);
        assert_eq!(parent.generated_resources[0].identifier.name, "a");
        assert_eq!(parent.generated_resources[1].identifier.name, "b");
    }
}
