use super::generic::{compute_leaf, fetch_and_compute};
use super::StatusReader;
use crate::identifier::{GroupKind, ObjectIdentifier};
use crate::object;
use crate::reader::ClusterReader;
use crate::resource_status::ResourceStatus;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Discovers child Pods directly — StatefulSet generates Pod with no
/// intermediate ReplicaSet.
pub struct StatefulSetStatusReader {
    reader: Arc<dyn ClusterReader>,
    pod_reader: Arc<dyn StatusReader>,
}

impl StatefulSetStatusReader {
    pub fn new(reader: Arc<dyn ClusterReader>, pod_reader: Arc<dyn StatusReader>) -> Self {
        Self { reader, pod_reader }
    }
}

#[async_trait]
impl StatusReader for StatefulSetStatusReader {
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
            Err(err) => ResourceStatus::unknown(identifier.clone(), err.to_string()).with_resource(
                own.resource.unwrap_or(Value::Null),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReadResult;
    use crate::status::Status;
    use crate::status_reader::GenericStatusReader;
    use serde_json::json;

    struct EmptyReader;

    #[async_trait]
    impl ClusterReader for EmptyReader {
        async fn get(&self, _gk: &GroupKind, _ns: &str, _name: &str) -> ReadResult<Value> {
            unimplemented!()
        }
        async fn list_namespaced(&self, _gk: &GroupKind, _ns: &str, _labels: Option<&str>) -> ReadResult<Vec<Value>> {
            Ok(Vec::new())
        }
        async fn list_cluster_scoped(&self, _gk: &GroupKind, _labels: Option<&str>) -> ReadResult<Vec<Value>> {
            unimplemented!()
        }
        async fn sync(&self) -> crate::errors::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn no_selector_skips_child_enumeration() {
        let reader: Arc<dyn ClusterReader> = Arc::new(EmptyReader);
        let generic = Arc::new(GenericStatusReader::new(reader.clone()));
        let sts_reader = StatefulSetStatusReader::new(reader, generic);

        let id = ObjectIdentifier::new(GroupKind::new("apps", "StatefulSet"), "default", "db");
        let object = json!({"spec": {"replicas": 1}, "status": {"replicas": 1, "readyReplicas": 1, "currentReplicas": 1}});
        let rs = sts_reader.read_status_for_object(&id, object).await;
        assert_eq!(rs.status, Status::Current);
        assert!(rs.generated_resources.is_empty());
    }
}
