//! Per-kind status readers: fetch an object via the cluster reader,
//! compute its status, and recursively observe generated children.

mod deployment;
mod generic;
mod replicaset;
mod statefulset;

pub use deployment::DeploymentStatusReader;
pub use generic::GenericStatusReader;
pub use replicaset::ReplicaSetStatusReader;
pub use statefulset::StatefulSetStatusReader;

use crate::identifier::{GroupKind, ObjectIdentifier};
use crate::reader::ClusterReader;
use crate::resource_status::ResourceStatus;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Polymorphic capability set: `read_status` fetches the primary object
/// itself via the cluster reader; `read_status_for_object` computes from
/// an object the caller already holds (used once a parent has listed its
/// children).
#[async_trait]
pub trait StatusReader: Send + Sync {
    async fn read_status(&self, identifier: &ObjectIdentifier) -> ResourceStatus;

    async fn read_status_for_object(&self, identifier: &ObjectIdentifier, object: Value) -> ResourceStatus;
}

/// Dispatch table mapping `GroupKind -> StatusReader` variant. Built once
/// per `Poll`/`Watch` run; an absent `GroupKind` falls through to
/// `Generic`.
pub struct StatusReaderTable {
    generic: Arc<GenericStatusReader>,
    dispatch: HashMap<GroupKind, Arc<dyn StatusReader>>,
}

impl StatusReaderTable {
    pub fn new(reader: Arc<dyn ClusterReader>) -> Self {
        let generic = Arc::new(GenericStatusReader::new(reader.clone()));
        let replicaset: Arc<dyn StatusReader> =
            Arc::new(ReplicaSetStatusReader::new(reader.clone(), generic.clone()));
        let statefulset: Arc<dyn StatusReader> =
            Arc::new(StatefulSetStatusReader::new(reader.clone(), generic.clone()));
        let deployment: Arc<dyn StatusReader> =
            Arc::new(DeploymentStatusReader::new(reader, replicaset.clone()));

        let mut dispatch: HashMap<GroupKind, Arc<dyn StatusReader>> = HashMap::new();
        dispatch.insert(GroupKind::new("apps", "Deployment"), deployment);
        dispatch.insert(GroupKind::new("apps", "StatefulSet"), statefulset);
        dispatch.insert(GroupKind::new("apps", "ReplicaSet"), replicaset);

        Self { generic, dispatch }
    }

    pub fn get(&self, group_kind: &GroupKind) -> Arc<dyn StatusReader> {
        self.dispatch
            .get(group_kind)
            .cloned()
            .unwrap_or_else(|| self.generic.clone() as Arc<dyn StatusReader>)
    }
}
