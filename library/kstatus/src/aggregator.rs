use crate::identifier::{ObjectIdentifier, ObjectIdentifierSet};
use crate::options::DesiredStatus;
use crate::resource_status::ResourceStatus;
use crate::status::Status;
use std::collections::HashMap;

/// Folds per-object statuses into a single set-wide status and a
/// completion predicate. One aggregator per `Poll`/`Watch` run;
/// initialized to `Unknown` for every declared identifier.
pub struct Aggregator {
    desired: DesiredStatus,
    statuses: HashMap<ObjectIdentifier, Status>,
}

impl Aggregator {
    pub fn new(identifiers: &ObjectIdentifierSet, desired: DesiredStatus) -> Self {
        let statuses = identifiers
            .iter()
            .map(|id| (id.clone(), Status::Unknown))
            .collect();
        Self { desired, statuses }
    }

    pub fn update(&mut self, resource_status: &ResourceStatus) {
        self.statuses
            .insert(resource_status.identifier.clone(), resource_status.status);
    }

    /// On-demand policy: Failed beats Unknown beats "everything equals
    /// desired" beats InProgress. The empty set is vacuously at the
    /// desired status.
    pub fn aggregate_status(&self) -> Status {
        if self.statuses.values().any(|s| *s == Status::Failed) {
            return Status::Failed;
        }
        if self.statuses.values().any(|s| *s == Status::Unknown) {
            return Status::Unknown;
        }
        let desired = self.desired.as_status();
        if self.statuses.values().all(|s| *s == desired) {
            return desired;
        }
        Status::InProgress
    }

    pub fn completed(&self) -> bool {
        self.aggregate_status() == self.desired.as_status()
    }

    pub fn desired_status(&self) -> DesiredStatus {
        self.desired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::GroupKind;

    fn id(name: &str) -> ObjectIdentifier {
        ObjectIdentifier::new(GroupKind::new("apps", "Deployment"), "default", name)
    }

    fn rs(name: &str, status: Status) -> ResourceStatus {
        ResourceStatus::new(id(name), status, "")
    }

    #[test]
    fn empty_set_is_vacuously_at_desired_status() {
        let set = ObjectIdentifierSet::new();
        let agg = Aggregator::new(&set, DesiredStatus::Current);
        assert_eq!(agg.aggregate_status(), Status::Current);
        assert!(agg.completed());
    }

    #[test]
    fn any_failed_dominates() {
        let mut set = ObjectIdentifierSet::new();
        set.insert(id("a"));
        set.insert(id("b"));
        let mut agg = Aggregator::new(&set, DesiredStatus::Current);
        agg.update(&rs("a", Status::Current));
        agg.update(&rs("b", Status::Failed));
        assert_eq!(agg.aggregate_status(), Status::Failed);
    }

    #[test]
    fn unknown_beats_in_progress_but_not_failed() {
        let mut set = ObjectIdentifierSet::new();
        set.insert(id("a"));
        let agg = Aggregator::new(&set, DesiredStatus::Current);
        assert_eq!(agg.aggregate_status(), Status::Unknown);
    }

    #[test]
    fn all_current_completes() {
        let mut set = ObjectIdentifierSet::new();
        set.insert(id("a"));
        set.insert(id("b"));
        let mut agg = Aggregator::new(&set, DesiredStatus::Current);
        agg.update(&rs("a", Status::Current));
        agg.update(&rs("b", Status::Current));
        assert!(agg.completed());
    }

    #[test]
    fn mixed_known_statuses_is_in_progress() {
        let mut set = ObjectIdentifierSet::new();
        set.insert(id("a"));
        set.insert(id("b"));
        let mut agg = Aggregator::new(&set, DesiredStatus::Current);
        agg.update(&rs("a", Status::Current));
        agg.update(&rs("b", Status::InProgress));
        assert_eq!(agg.aggregate_status(), Status::InProgress);
    }
}
