//! The polling runner. Single-threaded cooperative: the spawned task
//! alone writes the event channel and mutates the previous-snapshot map.

use crate::aggregator::Aggregator;
use crate::event::Event;
use crate::identifier::{ObjectIdentifier, ObjectIdentifierSet};
use crate::options::Options;
use crate::reader::ClusterReader;
use crate::resource_status::ResourceStatus;
use crate::status::Status;
use crate::status_reader::StatusReaderTable;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// tokio's `mpsc` requires capacity >= 1; this is the closest
/// approximation to an unbuffered channel — a sender that blocks until
/// the receiver has taken the previous event.
const CHANNEL_CAPACITY: usize = 1;

/// Starts a `Poll` run and returns its event stream. `cancellation`
/// governs the whole run: cancelling it emits `Aborted` and closes the
/// channel at the next safe point.
pub fn poll(
    identifiers: ObjectIdentifierSet,
    options: Options,
    reader: Arc<dyn ClusterReader>,
    cancellation: CancellationToken,
) -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(run(identifiers, options, reader, cancellation, tx));
    rx
}

async fn run(
    identifiers: ObjectIdentifierSet,
    options: Options,
    reader: Arc<dyn ClusterReader>,
    cancellation: CancellationToken,
    tx: mpsc::Sender<Event>,
) {
    if let Err(err) = options.validate() {
        log::error!("poll run aborted: invalid options: {err}");
        let _ = tx.send(Event::Error(err.to_string())).await;
        return;
    }

    let table = StatusReaderTable::new(reader.clone());
    let mut aggregator = Aggregator::new(&identifiers, options.desired_status);
    let mut previous: HashMap<ObjectIdentifier, ResourceStatus> = HashMap::new();
    let mut synced = false;

    let mut ticker = tokio::time::interval(options.poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancellation.cancelled() => {
                let _ = tx.send(Event::Aborted(aggregator.aggregate_status())).await;
                return;
            }
            _ = ticker.tick() => {
                if let Err(err) = reader.sync().await {
                    log::error!("poll run aborted: cache sync failed: {err}");
                    let _ = tx.send(Event::Error(err.to_string())).await;
                    return;
                }

                if !synced {
                    log::debug!("poll run synced, beginning status dispatch");
                    if tx.send(Event::Sync).await.is_err() {
                        return;
                    }
                    synced = true;
                }

                for identifier in identifiers.iter() {
                    log::trace!("dispatching status read for {identifier}");
                    let status_reader = table.get(&identifier.group_kind);
                    let resource_status = tokio::select! {
                        _ = cancellation.cancelled() => {
                            let _ = tx.send(Event::Aborted(aggregator.aggregate_status())).await;
                            return;
                        }
                        rs = status_reader.read_status(identifier) => rs,
                    };

                    if resource_status.status == Status::Unknown {
                        if let Some(error) = &resource_status.error {
                            log::warn!("tolerating read error for {identifier}: {error}");
                        }
                    }

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

                    if aggregator.completed() && !options.poll_until_cancelled {
                        let _ = tx.send(Event::Completed(aggregator.aggregate_status())).await;
                        return;
                    }
                }

                // An empty declared set never enters the loop above, so
                // the completion check still needs to run once per cycle.
                if aggregator.completed() && !options.poll_until_cancelled {
                    let _ = tx.send(Event::Completed(aggregator.aggregate_status())).await;
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::GroupKind;
    use crate::options::DesiredStatus;
    use crate::reader::{ClusterReader, ReadResult};
    use crate::status::Status;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::time::Duration;

    struct StaticReader;

    #[async_trait]
    impl ClusterReader for StaticReader {
        async fn get(&self, _gk: &GroupKind, _ns: &str, _name: &str) -> ReadResult<Value> {
            Ok(json!({"status": {"conditions": [{"type": "Ready", "status": "True"}]}}))
        }
        async fn list_namespaced(&self, _gk: &GroupKind, _ns: &str, _labels: Option<&str>) -> ReadResult<Vec<Value>> {
            Ok(Vec::new())
        }
        async fn list_cluster_scoped(&self, _gk: &GroupKind, _labels: Option<&str>) -> ReadResult<Vec<Value>> {
            Ok(Vec::new())
        }
        async fn sync(&self) -> crate::errors::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_declared_set_completes_on_first_cycle() {
        let options = Options {
            poll_interval: Duration::from_millis(5),
            ..Options::default()
        };
        let mut rx = poll(
            ObjectIdentifierSet::new(),
            options,
            Arc::new(StaticReader),
            CancellationToken::new(),
        );
        assert!(matches!(rx.recv().await, Some(Event::Sync)));
        assert!(matches!(rx.recv().await, Some(Event::Completed(Status::Current))));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn single_current_object_emits_one_update_then_completes() {
        let mut identifiers = ObjectIdentifierSet::new();
        identifiers.insert(ObjectIdentifier::new(GroupKind::new("", "Service"), "default", "svc"));
        let options = Options {
            poll_interval: Duration::from_millis(5),
            desired_status: DesiredStatus::Current,
            ..Options::default()
        };
        let mut rx = poll(identifiers, options, Arc::new(StaticReader), CancellationToken::new());
        assert!(matches!(rx.recv().await, Some(Event::Sync)));
        let update = rx.recv().await.unwrap();
        assert!(matches!(update, Event::ResourceUpdate(_)));
        assert!(matches!(rx.recv().await, Some(Event::Completed(Status::Current))));
    }

    #[tokio::test]
    async fn invalid_poll_interval_still_emits_sync_then_cancellation_aborts() {
        let mut identifiers = ObjectIdentifierSet::new();
        identifiers.insert(ObjectIdentifier::new(GroupKind::new("", "Pod"), "default", "never-current"));
        let options = Options {
            poll_interval: Duration::from_millis(5),
            desired_status: DesiredStatus::NotFound,
            ..Options::default()
        };
        let cancellation = CancellationToken::new();
        let mut rx = poll(identifiers, options, Arc::new(StaticReader), cancellation.clone());
        assert!(matches!(rx.recv().await, Some(Event::Sync)));
        cancellation.cancel();
        let mut saw_aborted = false;
        while let Some(event) = rx.recv().await {
            if matches!(event, Event::Aborted(_)) {
                saw_aborted = true;
            }
        }
        assert!(saw_aborted);
    }
}
