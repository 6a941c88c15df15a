use std::cmp::Ordering;
use std::fmt;

/// A Kubernetes `(Group, Kind)` pair, version-independent. This is the
/// granularity at which the cache and the generated-kinds table operate,
/// since object identity shouldn't depend on which API version happened
/// to serve a given read.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKind {
    pub group: String,
    pub kind: String,
}

impl GroupKind {
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
        }
    }

    /// `<lowercase-kind>.<group>`, used by the event-printer text shape.
    /// The core only exposes this formatting helper; writing it to a
    /// terminal is the printer's job.
    pub fn lowercase_dotted(&self) -> String {
        if self.group.is_empty() {
            self.kind.to_lowercase()
        } else {
            format!("{}.{}", self.kind.to_lowercase(), self.group)
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}.{}", self.kind, self.group)
        }
    }
}

/// Uniquely names a cluster object independent of version.
///
/// Invariant: for namespaced kinds `namespace` is non-empty (the
/// caller's default namespace is substituted when the source omits it);
/// for cluster-scoped kinds `namespace` is empty. This invariant is
/// enforced by callers that construct identifiers from a REST scope
/// lookup (see [`crate::reader`]), not by this type itself, since the
/// scope is not knowable from the triple alone.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    pub group_kind: GroupKind,
    pub namespace: String,
    pub name: String,
}

impl ObjectIdentifier {
    pub fn new(group_kind: GroupKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group_kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Ordering key: `(Namespace, Group, Kind, Name)` ascending, so
    /// output ordering is deterministic and independent of insertion
    /// order.
    fn sort_key(&self) -> (&str, &str, &str, &str) {
        (
            &self.namespace,
            &self.group_kind.group,
            &self.group_kind.kind,
            &self.name,
        )
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.group_kind, self.namespace, self.name)
    }
}

impl PartialOrd for ObjectIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// A set of [`ObjectIdentifier`] with stable insertion order for
/// iteration — the declared set driving a `Poll`/`Watch` run. Order
/// matters: the engine's in-cycle iteration follows this order exactly.
#[derive(Clone, Debug, Default)]
pub struct ObjectIdentifierSet {
    order: Vec<ObjectIdentifier>,
}

impl ObjectIdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `id` if not already present, preserving the position of
    /// the first insertion.
    pub fn insert(&mut self, id: ObjectIdentifier) {
        if !self.order.contains(&id) {
            self.order.push(id);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectIdentifier> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Distinct `GroupKind`s present in the set, in first-seen order —
    /// the seed for both the cached reader and the watcher's per-GVK
    /// informer set.
    pub fn group_kinds(&self) -> Vec<GroupKind> {
        let mut seen = Vec::new();
        for id in &self.order {
            if !seen.contains(&id.group_kind) {
                seen.push(id.group_kind.clone());
            }
        }
        seen
    }

    /// `true` iff every declared identifier shares the same non-empty
    /// namespace — used by the watcher's `RestScopeStrategy::Automatic`.
    pub fn single_namespace(&self) -> Option<&str> {
        let mut iter = self.order.iter();
        let first = iter.next()?.namespace.as_str();
        if first.is_empty() {
            return None;
        }
        if iter.all(|id| id.namespace == first) {
            Some(first)
        } else {
            None
        }
    }

    /// Every distinct non-empty namespace present in the set, in
    /// first-seen order — used by the watcher's `RestScopeStrategy::Namespace`
    /// to fan out one informer per namespace rather than falling back to
    /// a cluster-wide one when the declared set spans several.
    pub fn distinct_namespaces(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for id in &self.order {
            if !id.namespace.is_empty() && !seen.contains(&id.namespace) {
                seen.push(id.namespace.clone());
            }
        }
        seen
    }
}

impl FromIterator<ObjectIdentifier> for ObjectIdentifierSet {
    fn from_iter<T: IntoIterator<Item = ObjectIdentifier>>(iter: T) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ObjectIdentifierSet {
    type Item = &'a ObjectIdentifier;
    type IntoIter = std::slice::Iter<'a, ObjectIdentifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gk(kind: &str) -> GroupKind {
        GroupKind::new("apps", kind)
    }

    #[test]
    fn ordering_is_namespace_group_kind_name() {
        let a = ObjectIdentifier::new(gk("Deployment"), "ns1", "a");
        let b = ObjectIdentifier::new(gk("Deployment"), "ns1", "b");
        let c = ObjectIdentifier::new(gk("Deployment"), "ns2", "a");
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn insert_is_idempotent_and_order_preserving() {
        let mut set = ObjectIdentifierSet::new();
        let a = ObjectIdentifier::new(gk("Deployment"), "ns1", "a");
        let b = ObjectIdentifier::new(gk("Deployment"), "ns1", "b");
        set.insert(a.clone());
        set.insert(b.clone());
        set.insert(a.clone());
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![&a, &b]);
    }

    #[test]
    fn single_namespace_detects_mixed_sets() {
        let mut set = ObjectIdentifierSet::new();
        set.insert(ObjectIdentifier::new(gk("Deployment"), "ns1", "a"));
        set.insert(ObjectIdentifier::new(gk("Deployment"), "ns1", "b"));
        assert_eq!(set.single_namespace(), Some("ns1"));
        set.insert(ObjectIdentifier::new(gk("Deployment"), "ns2", "c"));
        assert_eq!(set.single_namespace(), None);
    }

    #[test]
    fn lowercase_dotted_matches_printer_shape() {
        assert_eq!(gk("Deployment").lowercase_dotted(), "deployment.apps");
        assert_eq!(GroupKind::new("", "Pod").lowercase_dotted(), "pod");
    }
}
