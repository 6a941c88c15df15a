use super::generic::{compute_leaf, fetch_and_compute};
use super::StatusReader;
use crate::identifier::{GroupKind, ObjectIdentifier};
use crate::object;
use crate::reader::ClusterReader;
use crate::resource_status::ResourceStatus;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Lists matching Pods as generated children.
pub struct ReplicaSetStatusReader {
    reader: Arc<dyn ClusterReader>,
    pod_reader: Arc<dyn StatusReader>,
}

impl ReplicaSetStatusReader {
    pub fn new(reader: Arc<dyn ClusterReader>, pod_reader: Arc<dyn StatusReader>) -> Self {
        Self { reader, pod_reader }
    }
}

#[async_trait]
impl StatusReader for ReplicaSetStatusReader {
    async fn read_status(&self, identifier: &ObjectIdentifier) -> ResourceStatus {
        fetch_and_compute(self.reader.as_ref(), identifier).await
    }

    async fn read_status_for_object(&self, identifier: &ObjectIdentifier, object: Value) -> ResourceStatus {
        let own = compute_leaf(identifier, object.clone());
        let Some(selector) = object::label_selector_string(&object) else {
            return own;
        };

        let pod_kind = GroupKind::new("", "Pod");
        match self
            .reader
            .list_namespaced(&pod_kind, &identifier.namespace, Some(&selector))
            .await
        {
            Ok(pods) => {
                let mut children = Vec::with_capacity(pods.len());
                for pod in pods {
                    let pod_id =
                        ObjectIdentifier::new(pod_kind.clone(), identifier.namespace.clone(), object::name_of(&pod));
                    children.push(self.pod_reader.read_status_for_object(&pod_id, pod).await);
                }
                own.with_generated_resources(children)
            }
            // Child enumeration errors attach to the parent's Error with
            // Status=Unknown; no children were gathered since the single
            // LIST call failed outright.
            Err(err) => ResourceStatus::unknown(identifier.clone(), err.to_string()).with_resource(
                own.resource.unwrap_or(Value::Null),
            ),
        }
    }
}
