use super::{ClusterBackend, ClusterReader, ReadError, ReadResult, RestMapper};
use crate::identifier::GroupKind;
use async_trait::async_trait;
use kube::discovery::Scope;
use serde_json::Value;
use std::sync::Arc;

/// Forwards each call straight to the backend; `sync` is a no-op.
/// Suitable when the declared set is small and dominated by unique
/// kinds, where bulk-prefetching would waste a LIST on every kind for a
/// single Get.
pub struct DirectReader {
    backend: Arc<dyn ClusterBackend>,
    rest_mapper: Arc<dyn RestMapper>,
}

impl DirectReader {
    pub fn new(backend: Arc<dyn ClusterBackend>, rest_mapper: Arc<dyn RestMapper>) -> Self {
        Self { backend, rest_mapper }
    }

    async fn resolve(&self, group_kind: &GroupKind) -> ReadResult<(kube::api::ApiResource, Scope)> {
        self.rest_mapper
            .resolve(group_kind)
            .await
            .map_err(|e| ReadError::Message(e.to_string()))
    }
}

#[async_trait]
impl ClusterReader for DirectReader {
    async fn get(&self, group_kind: &GroupKind, namespace: &str, name: &str) -> ReadResult<Value> {
        let (resource, scope) = self.resolve(group_kind).await?;
        let ns = (!namespace.is_empty()).then_some(namespace);
        self.backend.get(&resource, &scope, ns, name).await.map_err(ReadError::from)
    }

    async fn list_namespaced(
        &self,
        group_kind: &GroupKind,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> ReadResult<Vec<Value>> {
        let (resource, scope) = self.resolve(group_kind).await?;
        self.backend
            .list(&resource, &scope, Some(namespace), label_selector)
            .await
            .map_err(ReadError::from)
    }

    async fn list_cluster_scoped(
        &self,
        group_kind: &GroupKind,
        label_selector: Option<&str>,
    ) -> ReadResult<Vec<Value>> {
        let (resource, scope) = self.resolve(group_kind).await?;
        self.backend
            .list(&resource, &scope, None, label_selector)
            .await
            .map_err(ReadError::from)
    }

    async fn sync(&self) -> crate::errors::Result<()> {
        Ok(())
    }
}
