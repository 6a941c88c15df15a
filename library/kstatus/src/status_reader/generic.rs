use super::StatusReader;
use crate::identifier::ObjectIdentifier;
use crate::reader::{ClusterReader, ReadError};
use crate::resource_status::ResourceStatus;
use crate::rules;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Handles Pod, Job, CRD, Service, PVC, PDB, and any kind absent from the
/// dispatch table — none of these enumerate generated children, and this
/// is also the default variant for the open set of custom kinds.
pub struct GenericStatusReader {
    reader: Arc<dyn ClusterReader>,
}

impl GenericStatusReader {
    pub fn new(reader: Arc<dyn ClusterReader>) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl StatusReader for GenericStatusReader {
    async fn read_status(&self, identifier: &ObjectIdentifier) -> ResourceStatus {
        fetch_and_compute(self.reader.as_ref(), identifier).await
    }

    async fn read_status_for_object(&self, identifier: &ObjectIdentifier, object: Value) -> ResourceStatus {
        compute_leaf(identifier, object)
    }
}

/// Shared Get-then-dispatch sequence every reader in this module uses for
/// its own primary object: NotFound on the primary object yields
/// `Status::NotFound`; other errors yield `Status::Unknown` with the
/// error attached.
pub(super) async fn fetch_and_compute(reader: &dyn ClusterReader, identifier: &ObjectIdentifier) -> ResourceStatus {
    match reader
        .get(&identifier.group_kind, &identifier.namespace, &identifier.name)
        .await
    {
        Ok(object) => compute_leaf(identifier, object),
        Err(ReadError::NotFound) => ResourceStatus::not_found(identifier.clone()),
        Err(ReadError::Message(err)) => ResourceStatus::unknown(identifier.clone(), err),
    }
}

/// The "compute own status, attach the augmented snapshot" half shared
/// by every kind — only children enumeration differs.
pub(super) fn compute_leaf(identifier: &ObjectIdentifier, object: Value) -> ResourceStatus {
    let now = chrono::Utc::now();
    match rules::compute(&identifier.group_kind, &object, now) {
        Ok((status, message, conditions)) => {
            let snapshot = crate::object::with_conditions(&object, &conditions);
            ResourceStatus::new(identifier.clone(), status, message).with_resource(snapshot)
        }
        Err(err) => ResourceStatus::unknown(identifier.clone(), err.to_string()).with_resource(object),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::GroupKind;
    use crate::status::Status;
    use serde_json::json;

    #[test]
    fn compute_leaf_writes_augmented_condition_into_snapshot() {
        let id = ObjectIdentifier::new(GroupKind::new("", "Service"), "default", "svc");
        let object = json!({"spec": {"type": "LoadBalancer"}, "status": {}});
        let rs = compute_leaf(&id, object);
        assert_eq!(rs.status, Status::InProgress);
        let conditions = rs.resource.unwrap().pointer("/status/conditions").cloned().unwrap();
        assert_eq!(conditions[0]["type"], "Reconciling");
    }
}
