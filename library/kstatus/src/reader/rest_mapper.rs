use crate::errors::{EngineError, Result};
use crate::identifier::GroupKind;
use async_trait::async_trait;
use kube::api::ApiResource;
use kube::discovery::{Discovery, Scope};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Resolves a version-independent `GroupKind` into a concrete
/// `GroupVersionKind` (here, an `ApiResource`, which carries the plural
/// and preferred version kube needs to build an `Api<DynamicObject>`)
/// plus the REST scope (namespaced vs. cluster-scoped).
#[async_trait]
pub trait RestMapper: Send + Sync {
    async fn resolve(&self, group_kind: &GroupKind) -> Result<(ApiResource, Scope)>;
}

/// Discovery-backed implementation. Resolutions are cached for the
/// lifetime of the mapper — repeated discovery runs are expensive and
/// the server's API surface does not change within a single `Poll`/
/// `Watch` invocation under normal operation.
pub struct DiscoveryRestMapper {
    client: kube::Client,
    cache: RwLock<HashMap<GroupKind, (ApiResource, Scope)>>,
}

impl DiscoveryRestMapper {
    pub fn new(client: kube::Client) -> Self {
        Self {
            client,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RestMapper for DiscoveryRestMapper {
    async fn resolve(&self, group_kind: &GroupKind) -> Result<(ApiResource, Scope)> {
        if let Some(hit) = self.cache.read().await.get(group_kind) {
            return Ok(hit.clone());
        }

        let discovery = Discovery::new(self.client.clone())
            .run()
            .await
            .map_err(EngineError::Read)?;

        for group in discovery.groups() {
            if group.name() != group_kind.group {
                continue;
            }
            for (ar, caps) in group.recommended_resources() {
                if ar.kind == group_kind.kind {
                    let resolved = (ar, caps.scope.clone());
                    self.cache.write().await.insert(group_kind.clone(), resolved.clone());
                    return Ok(resolved);
                }
            }
        }

        // NoMatch: resource type not (yet) present on the server. Stored
        // per key by the cached reader rather than raised, so a CRD that
        // hasn't installed yet doesn't tear down an otherwise healthy
        // run; surfaced directly here for the direct reader.
        Err(EngineError::NoMatch(
            group_kind.clone(),
            "resource type not found on server".to_string(),
        ))
    }
}
