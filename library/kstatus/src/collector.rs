//! Subscribes to an event stream and maintains the latest snapshot per
//! identifier.

use crate::event::Event;
use crate::identifier::ObjectIdentifier;
use crate::resource_status::ResourceStatus;
use crate::status::Status;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, RwLock};

/// A point-in-time read of everything the collector has ingested so far.
#[derive(Clone, Debug)]
pub struct Observation {
    pub aggregate_status: Status,
    pub last_event_kind: Option<&'static str>,
    pub last_error: Option<String>,
    /// Sorted by identifier order, so consumers get a stable snapshot
    /// regardless of update arrival order.
    pub resources: Vec<ResourceStatus>,
}

struct State {
    aggregate_status: Status,
    last_event_kind: Option<&'static str>,
    last_error: Option<String>,
    resources: HashMap<ObjectIdentifier, ResourceStatus>,
}

impl State {
    fn apply(&mut self, event: &Event) {
        self.last_event_kind = Some(event.kind_name());
        match event {
            Event::ResourceUpdate(resource_status) => {
                self.resources
                    .insert(resource_status.identifier.clone(), resource_status.clone());
            }
            Event::Error(message) => {
                self.last_error = Some(message.clone());
            }
            Event::Completed(status) | Event::Aborted(status) => {
                self.aggregate_status = *status;
            }
            Event::Sync => {}
        }
    }

    fn observation(&self) -> Observation {
        let mut resources: Vec<ResourceStatus> = self.resources.values().cloned().collect();
        resources.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Observation {
            aggregate_status: self.aggregate_status,
            last_event_kind: self.last_event_kind,
            last_error: self.last_error.clone(),
            resources,
        }
    }
}

/// Owns a read/write-locked snapshot map. `listen` spawns the single
/// ingestion task that holds the write lock for the duration of one
/// event; `latest` (and `wait_for`) take the read lock.
pub struct Collector {
    state: Arc<RwLock<State>>,
    stop: tokio_util::sync::CancellationToken,
}

impl Collector {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State {
                aggregate_status: Status::Unknown,
                last_event_kind: None,
                last_error: None,
                resources: HashMap::new(),
            })),
            stop: tokio_util::sync::CancellationToken::new(),
        }
    }

    /// Spawns the ingestion task and returns a done-channel that resolves
    /// once the source channel closes or `stop` is called.
    pub fn listen(&self, mut events: mpsc::Receiver<Event>) -> oneshot::Receiver<()> {
        let state = self.state.clone();
        let stop = self.stop.clone();
        let (done_tx, done_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    event = events.recv() => {
                        let Some(event) = event else { break };
                        log::trace!("collector ingested {}", event.kind_name());
                        let mut guard = state.write().await;
                        guard.apply(&event);
                        drop(guard);
                        if event.is_terminal() {
                            break;
                        }
                    }
                }
            }
            let _ = done_tx.send(());
        });

        done_rx
    }

    pub async fn latest(&self) -> Observation {
        self.state.read().await.observation()
    }

    /// Stops ingestion without waiting for the source channel to close.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Polls `latest()` until `predicate` is satisfied. Not driven by the
    /// event channel directly since the caller may attach the collector
    /// to events it does not itself own; a short interval keeps this
    /// cheap without requiring a dedicated notify channel.
    pub async fn wait_for(&self, predicate: impl Fn(&Observation) -> bool) -> Observation {
        loop {
            let observation = self.latest().await;
            if predicate(&observation) {
                return observation;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::GroupKind;

    fn id(name: &str) -> ObjectIdentifier {
        ObjectIdentifier::new(GroupKind::new("apps", "Deployment"), "default", name)
    }

    #[tokio::test]
    async fn latest_reflects_most_recent_update_per_identifier() {
        let collector = Collector::new();
        let (tx, rx) = mpsc::channel(4);
        let done = collector.listen(rx);

        tx.send(Event::ResourceUpdate(ResourceStatus::new(id("a"), Status::InProgress, "waiting")))
            .await
            .unwrap();
        tx.send(Event::ResourceUpdate(ResourceStatus::new(id("a"), Status::Current, "ready")))
            .await
            .unwrap();
        tx.send(Event::Completed(Status::Current)).await.unwrap();
        drop(tx);

        done.await.unwrap();
        let observation = collector.latest().await;
        assert_eq!(observation.resources.len(), 1);
        assert_eq!(observation.resources[0].status, Status::Current);
        assert_eq!(observation.aggregate_status, Status::Current);
        assert_eq!(observation.last_event_kind, Some("Completed"));
    }

    #[tokio::test]
    async fn channel_close_without_terminal_event_still_signals_done() {
        let collector = Collector::new();
        let (tx, rx) = mpsc::channel(1);
        let done = collector.listen(rx);
        drop(tx);
        done.await.unwrap();
    }

    #[tokio::test]
    async fn wait_for_resolves_once_predicate_matches() {
        let collector = Collector::new();
        let (tx, rx) = mpsc::channel(4);
        collector.listen(rx);

        tokio::spawn(async move {
            tx.send(Event::Completed(Status::Current)).await.unwrap();
        });

        let observation = collector.wait_for(|o| o.aggregate_status == Status::Current).await;
        assert_eq!(observation.aggregate_status, Status::Current);
    }
}
