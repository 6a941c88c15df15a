use super::{ClusterBackend, ClusterReader, ReadError, ReadResult, RestMapper};
use crate::generated_kinds;
use crate::identifier::{GroupKind, ObjectIdentifierSet};
use async_trait::async_trait;
use kube::discovery::Scope;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type CacheKey = (GroupKind, String);

#[derive(Clone)]
enum CacheEntry {
    Objects(Arc<Vec<Value>>),
    Error(String),
}

/// Seeds a (GroupKind, Namespace) key set from the declared identifiers,
/// expanded through the generated-kinds table (e.g. a Deployment pulls in
/// its ReplicaSet and Pod in the same namespace), bulk-prefetches every
/// key on `Sync`, and serves Get/List out of that prefetch to minimize
/// server load.
pub struct CachedReader {
    backend: Arc<dyn ClusterBackend>,
    rest_mapper: Arc<dyn RestMapper>,
    seed_keys: Vec<CacheKey>,
    cache: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl CachedReader {
    pub fn new(
        backend: Arc<dyn ClusterBackend>,
        rest_mapper: Arc<dyn RestMapper>,
        identifiers: &ObjectIdentifierSet,
    ) -> Self {
        let mut seed_keys: Vec<CacheKey> = Vec::new();
        for id in identifiers.iter() {
            for gk in generated_kinds::expand(std::slice::from_ref(&id.group_kind)) {
                let key = (gk, id.namespace.clone());
                if !seed_keys.contains(&key) {
                    seed_keys.push(key);
                }
            }
        }
        Self {
            backend,
            rest_mapper,
            seed_keys,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of distinct (GroupKind, Namespace) keys this reader will
    /// LIST on every `Sync` — exposed for tests asserting the fan-out
    /// through the generated-kinds expansion.
    pub fn seed_key_count(&self) -> usize {
        self.seed_keys.len()
    }

    fn cache_miss_error(group_kind: &GroupKind, namespace: &str) -> ReadError {
        ReadError::Message(format!(
            "GVK {group_kind} and Namespace {namespace} not found in cache"
        ))
    }

    fn name_of(object: &Value) -> Option<&str> {
        object.pointer("/metadata/name").and_then(Value::as_str)
    }

    fn labels_match(object: &Value, label_selector: Option<&str>) -> bool {
        let Some(selector) = label_selector else { return true };
        let labels = object.pointer("/metadata/labels");
        selector.split(',').map(str::trim).filter(|s| !s.is_empty()).all(|clause| {
            let Some((key, value)) = clause.split_once('=') else { return true };
            labels
                .and_then(|l| l.get(key))
                .and_then(Value::as_str)
                .map(|v| v == value)
                .unwrap_or(false)
        })
    }

    async fn read_key(&self, key: &CacheKey) -> ReadResult<Arc<Vec<Value>>> {
        let cache = self.cache.read().await;
        match cache.get(key) {
            None => Err(Self::cache_miss_error(&key.0, &key.1)),
            Some(CacheEntry::Error(message)) => Err(ReadError::Message(message.clone())),
            Some(CacheEntry::Objects(objects)) => Ok(Arc::clone(objects)),
        }
    }
}

#[async_trait]
impl ClusterReader for CachedReader {
    async fn get(&self, group_kind: &GroupKind, namespace: &str, name: &str) -> ReadResult<Value> {
        let objects = self.read_key(&(group_kind.clone(), namespace.to_string())).await?;
        objects
            .iter()
            .find(|o| Self::name_of(o) == Some(name))
            .cloned()
            .ok_or(ReadError::NotFound)
    }

    async fn list_namespaced(
        &self,
        group_kind: &GroupKind,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> ReadResult<Vec<Value>> {
        let objects = self.read_key(&(group_kind.clone(), namespace.to_string())).await?;
        Ok(objects
            .iter()
            .filter(|o| Self::labels_match(o, label_selector))
            .cloned()
            .collect())
    }

    async fn list_cluster_scoped(
        &self,
        group_kind: &GroupKind,
        label_selector: Option<&str>,
    ) -> ReadResult<Vec<Value>> {
        let objects = self.read_key(&(group_kind.clone(), String::new())).await?;
        Ok(objects
            .iter()
            .filter(|o| Self::labels_match(o, label_selector))
            .cloned()
            .collect())
    }

    async fn sync(&self) -> crate::errors::Result<()> {
        let mut new_cache = HashMap::with_capacity(self.seed_keys.len());

        for key @ (group_kind, namespace) in &self.seed_keys {
            let entry = match self.rest_mapper.resolve(group_kind).await {
                // NoMatch is cached per key, not raised — late CRD
                // installation must not abort an otherwise healthy run.
                Err(err) => {
                    log::warn!(
                        "cache sync: no REST mapping for {group_kind} in '{namespace}': {err}"
                    );
                    CacheEntry::Error(err.to_string())
                }
                Ok((resource, scope)) => {
                    let ns = match scope {
                        Scope::Namespaced => Some(namespace.as_str()),
                        Scope::Cluster => None,
                    };
                    match self.backend.list(&resource, &scope, ns, None).await {
                        Ok(objects) => {
                            log::debug!(
                                "cache sync: {group_kind} in '{namespace}' returned {} objects",
                                objects.len()
                            );
                            CacheEntry::Objects(Arc::new(objects))
                        }
                        Err(err) => CacheEntry::Error(err.to_string()),
                    }
                }
            };
            new_cache.insert(key.clone(), entry);
        }

        *self.cache.write().await = new_cache;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::ObjectIdentifier;

    #[test]
    fn seed_keys_expand_deployment_to_replicaset_and_pod_same_namespace() {
        let backend: Arc<dyn ClusterBackend> = Arc::new(NullBackend);
        let mapper: Arc<dyn RestMapper> = Arc::new(crate::reader::rest_mapper::tests::StaticRestMapper::new(
            Default::default(),
        ));
        let mut ids = ObjectIdentifierSet::new();
        ids.insert(ObjectIdentifier::new(GroupKind::new("apps", "Deployment"), "ns1", "x"));
        let reader = CachedReader::new(backend, mapper, &ids);
        assert_eq!(reader.seed_key_count(), 3); // Deployment, ReplicaSet, Pod
    }

    struct NullBackend;

    #[async_trait]
    impl ClusterBackend for NullBackend {
        async fn get(
            &self,
            _resource: &kube::api::ApiResource,
            _scope: &Scope,
            _namespace: Option<&str>,
            _name: &str,
        ) -> Result<Value, kube::Error> {
            unimplemented!()
        }

        async fn list(
            &self,
            _resource: &kube::api::ApiResource,
            _scope: &Scope,
            _namespace: Option<&str>,
            _label_selector: Option<&str>,
        ) -> Result<Vec<Value>, kube::Error> {
            unimplemented!()
        }
    }
}
