//! The one place hard-coded knowledge of built-in controller relationships
//! lives. Both the cached reader's seeder and the status readers'
//! children enumeration consult this.

use crate::identifier::GroupKind;

fn apps(kind: &str) -> GroupKind {
    GroupKind::new("apps", kind)
}

fn core(kind: &str) -> GroupKind {
    GroupKind::new("", kind)
}

/// Returns the `GroupKind`s a controller of `parent` is known to generate:
/// Deployment -> (ReplicaSet, Pod), StatefulSet -> Pod, ReplicaSet -> Pod.
/// Unknown kinds generate nothing.
pub fn generated_kinds(parent: &GroupKind) -> Vec<GroupKind> {
    if *parent == apps("Deployment") {
        vec![apps("ReplicaSet"), core("Pod")]
    } else if *parent == apps("StatefulSet") {
        vec![core("Pod")]
    } else if *parent == apps("ReplicaSet") {
        vec![core("Pod")]
    } else {
        Vec::new()
    }
}

/// Expands `seed` with every transitively generated kind, deduplicated,
/// preserving first-seen order. Used by the cached reader to build its
/// seed key set and by the watcher to build its informer set.
pub fn expand(seed: &[GroupKind]) -> Vec<GroupKind> {
    let mut out: Vec<GroupKind> = Vec::new();
    let mut stack: Vec<GroupKind> = seed.to_vec();
    while let Some(gk) = stack.pop() {
        if !out.contains(&gk) {
            out.push(gk.clone());
            stack.extend(generated_kinds(&gk));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_expands_to_replicaset_and_pod() {
        let expanded = expand(&[apps("Deployment")]);
        assert!(expanded.contains(&apps("Deployment")));
        assert!(expanded.contains(&apps("ReplicaSet")));
        assert!(expanded.contains(&core("Pod")));
    }

    #[test]
    fn unrelated_kind_does_not_expand() {
        let expanded = expand(&[core("Service")]);
        assert_eq!(expanded, vec![core("Service")]);
    }
}
