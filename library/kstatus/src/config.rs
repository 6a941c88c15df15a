//! Wires the environment's injected collaborators — a `kube::Client` and
//! a `RestMapper` — into a ready-to-use `Poll`/`Watch` entry point. The
//! crate owns no on-disk config format, only this small builder over the
//! two collaborators consumed from the environment.

use crate::engine;
use crate::event::Event;
use crate::identifier::ObjectIdentifierSet;
use crate::options::Options;
use crate::reader::{CachedReader, ClusterBackend, ClusterReader, DirectReader, DiscoveryRestMapper, KubeBackend, RestMapper};
use crate::watcher;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// The two collaborators required from the environment, bound to one
/// `kube::Client`. Cheap to clone — everything inside is an `Arc` or a
/// `kube::Client` (itself a cheap handle).
#[derive(Clone)]
pub struct EngineConfig {
    client: kube::Client,
    rest_mapper: Arc<dyn RestMapper>,
}

impl EngineConfig {
    pub fn new(client: kube::Client) -> Self {
        let rest_mapper = Arc::new(DiscoveryRestMapper::new(client.clone()));
        Self { client, rest_mapper }
    }

    /// Overrides the REST mapper — used by tests wiring in a
    /// [`crate::reader::RestMapper`] fake instead of live discovery.
    pub fn with_rest_mapper(mut self, rest_mapper: Arc<dyn RestMapper>) -> Self {
        self.rest_mapper = rest_mapper;
        self
    }

    /// Starts a polling run. `Options::use_cache` selects between the
    /// direct and cached reader strategies.
    pub fn poll(
        &self,
        identifiers: ObjectIdentifierSet,
        options: Options,
        cancellation: CancellationToken,
    ) -> mpsc::Receiver<Event> {
        let backend: Arc<dyn ClusterBackend> = Arc::new(KubeBackend::new(self.client.clone()));
        let reader: Arc<dyn ClusterReader> = if options.use_cache {
            Arc::new(CachedReader::new(backend, self.rest_mapper.clone(), &identifiers))
        } else {
            Arc::new(DirectReader::new(backend, self.rest_mapper.clone()))
        };
        engine::poll(identifiers, options, reader, cancellation)
    }

    /// Starts an informer-based run. `Options::use_cache` is not
    /// consulted — the watcher always reads from its own reflector-backed
    /// stores.
    pub fn watch(
        &self,
        identifiers: ObjectIdentifierSet,
        options: Options,
        cancellation: CancellationToken,
    ) -> mpsc::Receiver<Event> {
        watcher::watch(identifiers, options, self.client.clone(), self.rest_mapper.clone(), cancellation)
    }
}
