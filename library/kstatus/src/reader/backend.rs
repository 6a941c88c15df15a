use async_trait::async_trait;
use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use kube::discovery::Scope;
use serde_json::Value;

/// The raw environment collaborator: a resource client offering Get,
/// List, and a watch primitive. `KubeBackend` is the only implementation
/// shipped here (a thin `kube::Client` wrapper); the trait exists so
/// readers and the watcher driver can be exercised against a fake in
/// tests without a live API server.
#[async_trait]
pub trait ClusterBackend: Send + Sync {
    async fn get(
        &self,
        resource: &ApiResource,
        scope: &Scope,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Value, kube::Error>;

    /// Returns every page of the list, already flattened — the cached
    /// reader issues a paginated LIST, accumulating all pages, before
    /// updating its cache.
    async fn list(
        &self,
        resource: &ApiResource,
        scope: &Scope,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<Value>, kube::Error>;
}

pub struct KubeBackend {
    client: kube::Client,
}

impl KubeBackend {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    fn api(&self, resource: &ApiResource, scope: &Scope, namespace: Option<&str>) -> Api<DynamicObject> {
        match (scope, namespace) {
            (Scope::Namespaced, Some(ns)) => Api::namespaced_with(self.client.clone(), ns, resource),
            _ => Api::all_with(self.client.clone(), resource),
        }
    }
}

#[async_trait]
impl ClusterBackend for KubeBackend {
    async fn get(
        &self,
        resource: &ApiResource,
        scope: &Scope,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Value, kube::Error> {
        let object = self.api(resource, scope, namespace).get(name).await?;
        Ok(serde_json::to_value(object).unwrap_or(Value::Null))
    }

    async fn list(
        &self,
        resource: &ApiResource,
        scope: &Scope,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<Value>, kube::Error> {
        let api = self.api(resource, scope, namespace);
        let mut params = ListParams::default();
        if let Some(selector) = label_selector {
            params = params.labels(selector);
        }

        let mut out = Vec::new();
        let mut continue_token: Option<String> = None;
        loop {
            let mut page_params = params.clone();
            if let Some(token) = &continue_token {
                page_params = page_params.continue_token(token);
            }
            let page = api.list(&page_params).await?;
            continue_token = page.metadata.continue_.clone().filter(|t| !t.is_empty());
            out.extend(page.items.into_iter().map(|o| serde_json::to_value(o).unwrap_or(Value::Null)));
            if continue_token.is_none() {
                break;
            }
        }
        Ok(out)
    }
}
