//! Computes and streams lifecycle status for a declared set of Kubernetes
//! resources: given an [`identifier::ObjectIdentifierSet`], either
//! [`engine::poll`] or [`watcher::watch`] drives a [`status_reader`]
//! dispatch over a [`reader::ClusterReader`] and emits [`event::Event`]s
//! until the set reaches its [`options::DesiredStatus`] (or is cancelled).
//! [`collector::Collector`] turns that event stream into an on-demand
//! snapshot; [`config::EngineConfig`] wires the whole thing to a live
//! `kube::Client`.

pub mod aggregator;
pub mod collector;
pub mod condition;
pub mod config;
pub mod engine;
pub mod errors;
pub mod event;
pub mod generated_kinds;
pub mod identifier;
pub mod object;
pub mod options;
pub mod reader;
pub mod resource_status;
pub mod rules;
pub mod status;
pub mod status_reader;
pub mod watcher;

pub use aggregator::Aggregator;
pub use collector::{Collector, Observation};
pub use condition::{Condition, ConditionStatus};
pub use config::EngineConfig;
pub use errors::{EngineError, Result};
pub use event::Event;
pub use identifier::{GroupKind, ObjectIdentifier, ObjectIdentifierSet};
pub use options::{DesiredStatus, ObjectFilter, Options, RestScopeStrategy};
pub use resource_status::ResourceStatus;
pub use status::Status;
pub use status_reader::{StatusReader, StatusReaderTable};
