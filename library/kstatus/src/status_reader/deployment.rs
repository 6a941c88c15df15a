use super::generic::{compute_leaf, fetch_and_compute};
use super::StatusReader;
use crate::identifier::{GroupKind, ObjectIdentifier};
use crate::object;
use crate::reader::ClusterReader;
use crate::resource_status::ResourceStatus;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Discovers child ReplicaSets via the Deployment's `spec.selector` and
/// delegates their observation — and, transitively, their Pods' — to an
/// embedded [`super::ReplicaSetStatusReader`]. Composition over a deeper
/// inheritance hierarchy: the Deployment reader simply owns a ReplicaSet
/// reader rather than reimplementing its traversal.
pub struct DeploymentStatusReader {
    reader: Arc<dyn ClusterReader>,
    replicaset_reader: Arc<dyn StatusReader>,
}

impl DeploymentStatusReader {
    pub fn new(reader: Arc<dyn ClusterReader>, replicaset_reader: Arc<dyn StatusReader>) -> Self {
        Self {
            reader,
            replicaset_reader,
        }
    }
}

#[async_trait]
impl StatusReader for DeploymentStatusReader {
    async fn read_status(&self, identifier: &ObjectIdentifier) -> ResourceStatus {
        fetch_and_compute(self.reader.as_ref(), identifier).await
    }

    async fn read_status_for_object(&self, identifier: &ObjectIdentifier, object: Value) -> ResourceStatus {
        let own = compute_leaf(identifier, object.clone());
        let Some(selector) = object::label_selector_string(&object) else {
            return own;
        };

        let rs_kind = GroupKind::new("apps", "ReplicaSet");
        match self
            .reader
            .list_namespaced(&rs_kind, &identifier.namespace, Some(&selector))
            .await
        {
            Ok(replicasets) => {
                let mut children = Vec::with_capacity(replicasets.len());
                for rs in replicasets {
                    let rs_id =
                        ObjectIdentifier::new(rs_kind.clone(), identifier.namespace.clone(), object::name_of(&rs));
                    children.push(self.replicaset_reader.read_status_for_object(&rs_id, rs).await);
                }
                own.with_generated_resources(children)
            }
            Err(err) => ResourceStatus::unknown(identifier.clone(), err.to_string()).with_resource(
                own.resource.unwrap_or(Value::Null),
            ),
        }
    }
}
