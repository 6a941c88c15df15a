//! The informer-based alternative driver. Replaces the engine's ticker
//! with one `kube::runtime` reflector per watched GVK (or, under
//! `RestScopeStrategy::Namespace`, per GVK-namespace pair) in the
//! (expanded) declared set; status is recomputed against the reflectors'
//! local stores rather than issuing fresh Get/List calls on every change.

use crate::aggregator::Aggregator;
use crate::errors::{classify_resource_level_error, ReadErrorClass};
use crate::event::Event;
use crate::generated_kinds;
use crate::identifier::{GroupKind, ObjectIdentifier, ObjectIdentifierSet};
use crate::options::{Options, RestScopeStrategy};
use crate::reader::{ClusterReader, ReadError, ReadResult};
use crate::resource_status::ResourceStatus;
use crate::status_reader::StatusReaderTable;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use kube::api::{Api, ApiResource, DynamicObject};
use kube::discovery::Scope;
use kube::runtime::reflector::{self, Store};
use kube::runtime::{watcher, WatchStreamExt};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::reader::RestMapper;

const CHANNEL_CAPACITY: usize = 1;
const INTERNAL_CHANNEL_CAPACITY: usize = 64;

/// Starts a `Watch` run and returns its event stream, matching
/// `engine::poll`'s shape.
pub fn watch(
    identifiers: ObjectIdentifierSet,
    options: Options,
    client: kube::Client,
    rest_mapper: Arc<dyn RestMapper>,
    cancellation: CancellationToken,
) -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(run(identifiers, options, client, rest_mapper, cancellation, tx));
    rx
}

/// Identifies one spawned informer: a GVK, plus the namespace it's
/// scoped to under `RestScopeStrategy::Namespace` fan-out (`None` for a
/// cluster-wide or root-scoped informer).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct WatchId {
    group_kind: GroupKind,
    namespace: Option<String>,
}

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{ns}", self.group_kind),
            None => write!(f, "{}", self.group_kind),
        }
    }
}

enum Internal {
    Changed(WatchId),
    Error(WatchId, ReadErrorClass, String),
    Done(WatchId),
}

/// `RestScopeStrategy::Automatic` resolution: a single shared namespace
/// if every declared identifier agrees on one, otherwise root scope.
fn scope_namespace(identifiers: &ObjectIdentifierSet, strategy: RestScopeStrategy) -> Option<String> {
    match strategy {
        RestScopeStrategy::Root | RestScopeStrategy::Namespace => None,
        RestScopeStrategy::Automatic => identifiers.single_namespace().map(str::to_string),
    }
}

/// One informer to spawn: the watch id it reports under, the resolved
/// resource/scope, and the namespace to restrict the `Api` to (`None`
/// meaning cluster-wide).
struct WatchUnit {
    id: WatchId,
    resource: ApiResource,
    scope: Scope,
    namespace: Option<String>,
}

/// Expands each GVK into the informers `RestScopeStrategy` requires:
/// `Namespace` always uses per-namespace informers for namespaced kinds
/// (one per distinct namespace in the declared set, never falling back
/// to a cluster-wide informer just because the set spans several
/// namespaces); `Automatic`/`Root` use a single informer per GVK.
fn plan_watch_units(
    gvks: &[GroupKind],
    identifiers: &ObjectIdentifierSet,
    strategy: RestScopeStrategy,
    resolved: &HashMap<GroupKind, (ApiResource, Scope)>,
) -> Vec<WatchUnit> {
    let mut units = Vec::new();
    for group_kind in gvks {
        let (resource, scope) = resolved.get(group_kind).expect("resolved before planning").clone();

        if strategy == RestScopeStrategy::Namespace && matches!(scope, Scope::Namespaced) {
            let namespaces = identifiers.distinct_namespaces();
            if namespaces.is_empty() {
                units.push(WatchUnit {
                    id: WatchId {
                        group_kind: group_kind.clone(),
                        namespace: None,
                    },
                    resource,
                    scope,
                    namespace: None,
                });
            } else {
                for namespace in namespaces {
                    units.push(WatchUnit {
                        id: WatchId {
                            group_kind: group_kind.clone(),
                            namespace: Some(namespace.clone()),
                        },
                        resource: resource.clone(),
                        scope: scope.clone(),
                        namespace: Some(namespace),
                    });
                }
            }
            continue;
        }

        let namespace = scope_namespace(identifiers, strategy);
        units.push(WatchUnit {
            id: WatchId {
                group_kind: group_kind.clone(),
                namespace: namespace.clone(),
            },
            resource,
            scope,
            namespace,
        });
    }
    units
}

async fn run(
    identifiers: ObjectIdentifierSet,
    options: Options,
    client: kube::Client,
    rest_mapper: Arc<dyn RestMapper>,
    cancellation: CancellationToken,
    tx: mpsc::Sender<Event>,
) {
    if let Err(err) = options.validate() {
        log::error!("watch run aborted: invalid options: {err}");
        let _ = tx.send(Event::Error(err.to_string())).await;
        return;
    }

    let gvks = generated_kinds::expand(&identifiers.group_kinds());

    let mut resolved: HashMap<GroupKind, (ApiResource, Scope)> = HashMap::new();
    for group_kind in &gvks {
        match rest_mapper.resolve(group_kind).await {
            Ok(r) => {
                resolved.insert(group_kind.clone(), r);
            }
            Err(err) => {
                log::error!("watch run aborted: could not resolve {group_kind}: {err}");
                let _ = tx.send(Event::Error(err.to_string())).await;
                return;
            }
        }
    }

    let units = plan_watch_units(&gvks, &identifiers, options.rest_scope_strategy, &resolved);

    let (internal_tx, mut internal_rx) = mpsc::channel::<Internal>(INTERNAL_CHANNEL_CAPACITY);
    let mut stores: HashMap<GroupKind, Vec<Store<DynamicObject>>> = HashMap::new();
    let mut pending_sync: HashSet<WatchId> = units.iter().map(|u| u.id.clone()).collect();

    for unit in units {
        let api = match (&unit.scope, &unit.namespace) {
            (Scope::Namespaced, Some(ns)) => Api::namespaced_with(client.clone(), ns, &unit.resource),
            _ => Api::all_with(client.clone(), &unit.resource),
        };

        let mut config = watcher::Config::default();
        if let Some(labels) = &options.object_filter.labels {
            config = config.labels(labels);
        }
        if let Some(fields) = &options.object_filter.fields {
            config = config.fields(fields);
        }

        let (store, writer) = reflector::store();
        stores.entry(unit.id.group_kind.clone()).or_default().push(store);

        let stream = reflector::reflector(writer, watcher::watcher(api, config)).default_backoff();
        tokio::spawn(run_gvk_watch(unit.id, stream, internal_tx.clone(), cancellation.clone()));
    }
    drop(internal_tx);

    let store_reader: Arc<dyn ClusterReader> = Arc::new(StoreReader { stores });
    let table = StatusReaderTable::new(store_reader);
    let mut aggregator = Aggregator::new(&identifiers, options.desired_status);
    let mut previous: HashMap<ObjectIdentifier, ResourceStatus> = HashMap::new();
    let mut synced_emitted = false;

    loop {
        tokio::select! {
            _ = cancellation.cancelled() => {
                let _ = tx.send(Event::Aborted(aggregator.aggregate_status())).await;
                return;
            }
            item = internal_rx.recv() => {
                let Some(item) = item else { return };
                match item {
                    Internal::Done(watch_id) => {
                        log::info!("informer for {watch_id} completed its initial list");
                        pending_sync.remove(&watch_id);
                    }
                    Internal::Error(watch_id, class, message) => {
                        if class == ReadErrorClass::PermanentKind {
                            log::error!("watch for {watch_id} permanently terminated: {message}");
                            let _ = tx.send(Event::Error(format!("{watch_id}: {message}"))).await;
                            return;
                        }
                        log::warn!("retrying watch for {watch_id} after error: {message}");
                    }
                    Internal::Changed(_) => {}
                }

                if !synced_emitted && pending_sync.is_empty() {
                    if tx.send(Event::Sync).await.is_err() {
                        return;
                    }
                    synced_emitted = true;
                }

                if !synced_emitted {
                    continue;
                }

                for identifier in identifiers.iter() {
                    let status_reader = table.get(&identifier.group_kind);
                    let resource_status = status_reader.read_status(identifier).await;
                    aggregator.update(&resource_status);

                    let changed = previous
                        .get(identifier)
                        .map(|prev| !prev.observationally_eq(&resource_status))
                        .unwrap_or(true);

                    if changed {
                        previous.insert(identifier.clone(), resource_status.clone());
                        if tx.send(Event::ResourceUpdate(resource_status)).await.is_err() {
                            return;
                        }
                    }
                }

                if aggregator.completed() && !options.poll_until_cancelled {
                    let _ = tx.send(Event::Completed(aggregator.aggregate_status())).await;
                    return;
                }
            }
        }
    }
}

async fn run_gvk_watch(
    watch_id: WatchId,
    mut stream: impl Stream<Item = Result<watcher::Event<DynamicObject>, watcher::Error>> + Unpin,
    tx: mpsc::Sender<Internal>,
    cancellation: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancellation.cancelled() => return,
            next = stream.next() => {
                match next {
                    None => return,
                    Some(Ok(event)) => {
                        let done = matches!(event, watcher::Event::InitDone);
                        if tx.send(Internal::Changed(watch_id.clone())).await.is_err() {
                            return;
                        }
                        if done && tx.send(Internal::Done(watch_id.clone())).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(err)) => {
                        let class = classify_watch_error(&err);
                        let terminal = class == ReadErrorClass::PermanentKind;
                        if tx.send(Internal::Error(watch_id.clone(), class, err.to_string())).await.is_err() {
                            return;
                        }
                        if terminal {
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Classifies a reflector error: Forbidden and NotFound *on the
/// resource* terminate that informer's watch; everything else is left
/// to the informer's own backoff.
fn classify_watch_error(err: &watcher::Error) -> ReadErrorClass {
    match err {
        watcher::Error::InitialListFailed(e) | watcher::Error::WatchFailed(e) | watcher::Error::WatchStartFailed(e) => {
            classify_resource_level_error(e)
        }
        _ => ReadErrorClass::Transient,
    }
}

/// Reads directly out of the reflectors' local stores — no network calls
/// once initial sync has happened. A `GroupKind` may back onto several
/// stores at once (one per namespace under `RestScopeStrategy::Namespace`
/// fan-out), so reads flatten across all of them.
struct StoreReader {
    stores: HashMap<GroupKind, Vec<Store<DynamicObject>>>,
}

impl StoreReader {
    fn objects(&self, group_kind: &GroupKind) -> ReadResult<Vec<Arc<DynamicObject>>> {
        let stores = self
            .stores
            .get(group_kind)
            .ok_or_else(|| ReadError::Message(format!("no informer registered for {group_kind}")))?;
        Ok(stores.iter().flat_map(Store::state).collect())
    }
}

fn matches_label_selector(object: &DynamicObject, label_selector: Option<&str>) -> bool {
    let Some(selector) = label_selector else { return true };
    selector.split(',').map(str::trim).filter(|s| !s.is_empty()).all(|clause| {
        let Some((key, value)) = clause.split_once('=') else { return true };
        object
            .metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(key))
            .map(|v| v == value)
            .unwrap_or(false)
    })
}

#[async_trait]
impl ClusterReader for StoreReader {
    async fn get(&self, group_kind: &GroupKind, namespace: &str, name: &str) -> ReadResult<Value> {
        let objects = self.objects(group_kind)?;
        objects
            .iter()
            .find(|o| {
                o.metadata.namespace.as_deref().unwrap_or("") == namespace && o.metadata.name.as_deref() == Some(name)
            })
            .map(|o| serde_json::to_value(o.as_ref()).unwrap_or(Value::Null))
            .ok_or(ReadError::NotFound)
    }

    async fn list_namespaced(
        &self,
        group_kind: &GroupKind,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> ReadResult<Vec<Value>> {
        let objects = self.objects(group_kind)?;
        Ok(objects
            .iter()
            .filter(|o| o.metadata.namespace.as_deref().unwrap_or("") == namespace)
            .filter(|o| matches_label_selector(o, label_selector))
            .map(|o| serde_json::to_value(o.as_ref()).unwrap_or(Value::Null))
            .collect())
    }

    async fn list_cluster_scoped(&self, group_kind: &GroupKind, label_selector: Option<&str>) -> ReadResult<Vec<Value>> {
        let objects = self.objects(group_kind)?;
        Ok(objects
            .iter()
            .filter(|o| matches_label_selector(o, label_selector))
            .map(|o| serde_json::to_value(o.as_ref()).unwrap_or(Value::Null))
            .collect())
    }

    async fn sync(&self) -> crate::errors::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use kube::api::TypeMeta;
    use serde_json::json;

    fn pod(name: &str, namespace: &str) -> DynamicObject {
        DynamicObject {
            types: Some(TypeMeta {
                api_version: "v1".to_string(),
                kind: "Pod".to_string(),
            }),
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            data: json!({"status": {"phase": "Running"}}),
        }
    }

    #[tokio::test]
    async fn store_reader_serves_objects_fed_via_apply_watcher_event() {
        let (store, mut writer) = reflector::store::<DynamicObject>();
        writer.apply_watcher_event(&watcher::Event::Apply(pod("p1", "default")));

        let pod_kind = GroupKind::new("", "Pod");
        let mut stores = HashMap::new();
        stores.insert(pod_kind.clone(), vec![store]);
        let reader = StoreReader { stores };

        let found = reader.get(&pod_kind, "default", "p1").await.unwrap();
        assert_eq!(found.pointer("/status/phase").unwrap(), "Running");
    }

    #[tokio::test]
    async fn store_reader_reports_not_found_for_missing_gvk() {
        let reader = StoreReader {
            stores: HashMap::new(),
        };
        let err = reader.get(&GroupKind::new("", "Pod"), "default", "p1").await.unwrap_err();
        assert!(matches!(err, ReadError::Message(_)));
    }

    #[tokio::test]
    async fn store_reader_flattens_objects_across_per_namespace_stores() {
        let (store_a, mut writer_a) = reflector::store::<DynamicObject>();
        writer_a.apply_watcher_event(&watcher::Event::Apply(pod("p1", "ns-a")));
        let (store_b, mut writer_b) = reflector::store::<DynamicObject>();
        writer_b.apply_watcher_event(&watcher::Event::Apply(pod("p2", "ns-b")));

        let pod_kind = GroupKind::new("", "Pod");
        let mut stores = HashMap::new();
        stores.insert(pod_kind.clone(), vec![store_a, store_b]);
        let reader = StoreReader { stores };

        assert!(reader.get(&pod_kind, "ns-a", "p1").await.is_ok());
        assert!(reader.get(&pod_kind, "ns-b", "p2").await.is_ok());
        assert!(reader.get(&pod_kind, "ns-a", "p2").await.is_err());
    }

    #[test]
    fn automatic_strategy_picks_up_shared_namespace() {
        let mut identifiers = ObjectIdentifierSet::new();
        identifiers.insert(ObjectIdentifier::new(GroupKind::new("apps", "Deployment"), "ns1", "a"));
        identifiers.insert(ObjectIdentifier::new(GroupKind::new("apps", "Deployment"), "ns1", "b"));
        assert_eq!(
            scope_namespace(&identifiers, RestScopeStrategy::Automatic),
            Some("ns1".to_string())
        );
    }

    #[test]
    fn root_strategy_ignores_shared_namespace() {
        let mut identifiers = ObjectIdentifierSet::new();
        identifiers.insert(ObjectIdentifier::new(GroupKind::new("apps", "Deployment"), "ns1", "a"));
        assert_eq!(scope_namespace(&identifiers, RestScopeStrategy::Root), None);
    }

    #[test]
    fn namespace_strategy_fans_out_one_unit_per_distinct_namespace() {
        let mut identifiers = ObjectIdentifierSet::new();
        identifiers.insert(ObjectIdentifier::new(GroupKind::new("apps", "Deployment"), "ns1", "a"));
        identifiers.insert(ObjectIdentifier::new(GroupKind::new("apps", "Deployment"), "ns2", "b"));

        let group_kind = GroupKind::new("apps", "Deployment");
        let mut resolved = HashMap::new();
        resolved.insert(
            group_kind.clone(),
            (ApiResource::erase::<k8s_openapi::api::apps::v1::Deployment>(&()), Scope::Namespaced),
        );

        let units = plan_watch_units(&[group_kind.clone()], &identifiers, RestScopeStrategy::Namespace, &resolved);
        assert_eq!(units.len(), 2);
        let namespaces: HashSet<_> = units.iter().map(|u| u.namespace.clone()).collect();
        assert_eq!(namespaces, HashSet::from([Some("ns1".to_string()), Some("ns2".to_string())]));
    }

    #[test]
    fn namespace_strategy_keeps_cluster_scoped_kind_as_single_unit() {
        let mut identifiers = ObjectIdentifierSet::new();
        identifiers.insert(ObjectIdentifier::new(GroupKind::new("", "Namespace"), "", "ns1"));

        let group_kind = GroupKind::new("", "Namespace");
        let mut resolved = HashMap::new();
        resolved.insert(
            group_kind.clone(),
            (ApiResource::erase::<k8s_openapi::api::core::v1::Namespace>(&()), Scope::Cluster),
        );

        let units = plan_watch_units(&[group_kind.clone()], &identifiers, RestScopeStrategy::Namespace, &resolved);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].namespace, None);
    }
}
