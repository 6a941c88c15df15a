//! The cluster reader: Get/List a single object or a (GVK, namespace),
//! behind two strategies — direct pass-through and cached bulk-prefetch.

mod backend;
mod cached;
mod direct;
mod rest_mapper;

pub use backend::{ClusterBackend, KubeBackend};
pub use cached::CachedReader;
pub use direct::DirectReader;
pub use rest_mapper::{DiscoveryRestMapper, RestMapper};

use crate::identifier::GroupKind;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Per-call outcome for Get/List — deliberately distinct from
/// [`crate::errors::EngineError`]: these never abort a run, they get
/// attached to a single [`crate::resource_status::ResourceStatus`]
/// instead so one misbehaving object doesn't take down the whole cycle.
#[derive(Debug, Clone)]
pub enum ReadError {
    NotFound,
    Message(String),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::NotFound => write!(f, "not found"),
            ReadError::Message(m) => write!(f, "{m}"),
        }
    }
}

impl From<kube::Error> for ReadError {
    fn from(err: kube::Error) -> Self {
        use crate::errors::{classify_kube_error, ReadErrorClass};
        match classify_kube_error(&err) {
            ReadErrorClass::NotFound => ReadError::NotFound,
            _ => ReadError::Message(err.to_string()),
        }
    }
}

pub type ReadResult<T> = std::result::Result<T, ReadError>;

/// Get, List (namespace or cluster scoped), and Sync (an opportunity to
/// refresh cached state; a no-op for [`DirectReader`]).
#[async_trait]
pub trait ClusterReader: Send + Sync {
    async fn get(&self, group_kind: &GroupKind, namespace: &str, name: &str) -> ReadResult<Value>;

    async fn list_namespaced(
        &self,
        group_kind: &GroupKind,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> ReadResult<Vec<Value>>;

    async fn list_cluster_scoped(
        &self,
        group_kind: &GroupKind,
        label_selector: Option<&str>,
    ) -> ReadResult<Vec<Value>>;

    /// Populates any internal state. Must be called once per polling
    /// cycle before Get/List.
    async fn sync(&self) -> crate::errors::Result<()>;
}
