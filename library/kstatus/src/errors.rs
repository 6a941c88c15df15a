use thiserror::Error;

/// The crate-wide error type. Per-object read/compute failures are *not*
/// represented here — those live as a `String` on `ResourceStatus` so
/// that a single bad object never aborts a run. This type is reserved
/// for the handful of failures that legitimately end a `Poll`/`Watch`
/// invocation outright.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The cached reader's bulk refresh failed outright (not a per-key
    /// failure — those are stored in the cache instead, see
    /// [`crate::reader::cached`]).
    #[error("cache sync failed: {0}")]
    Sync(#[source] kube::Error),

    /// `Options::desired_status` was neither `Current` nor `NotFound`, or
    /// another option combination the engine cannot act on.
    #[error("invalid options: {0}")]
    Validation(String),

    /// A Get/List against the cluster failed in a way the caller asked to
    /// be told about directly (used by the cached reader's Sync and by the
    /// watcher's per-GVK informer bring-up; per-identifier reads during a
    /// poll cycle are classified instead via [`classify_kube_error`]).
    #[error("cluster read failed: {0}")]
    Read(#[source] kube::Error),

    /// A status rule was handed structurally invalid input (e.g.
    /// `status.conditions` present but not an array).
    #[error("status computation failed: {0}")]
    Compute(String),

    /// The REST mapper has no mapping for a `GroupKind` (kind not
    /// registered on the server, or CRD not yet installed).
    #[error("no REST mapping for {0}: {1}")]
    NoMatch(crate::identifier::GroupKind, String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// How a per-object `kube::Error` encountered while servicing a single
/// Get/List should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadErrorClass {
    /// Object genuinely does not exist — surfaces as `Status::NotFound`,
    /// not an error.
    NotFound,
    /// Kind is Forbidden or not registered on the server at all — a
    /// permanent, non-retryable read failure.
    PermanentKind,
    /// Network hiccup, throttling, or anything else worth retrying on the
    /// next polling cycle without surfacing specially.
    Transient,
}

/// Classifies a `kube::Error`: object-level 404s are `NotFound`,
/// kind-level 403/404s are `PermanentKind`, and everything else is
/// `Transient`.
pub fn classify_kube_error(err: &kube::Error) -> ReadErrorClass {
    if let kube::Error::Api(resp) = err {
        match resp.code {
            404 => ReadErrorClass::NotFound,
            403 => ReadErrorClass::PermanentKind,
            _ => ReadErrorClass::Transient,
        }
    } else {
        ReadErrorClass::Transient
    }
}

/// Kind-level variant of [`classify_kube_error`] for the watcher driver:
/// a 404 here means the resource *type* is not registered on the server
/// at all, not that one object is missing, so it is treated the same as
/// Forbidden — both terminate the watch for that GVK rather than being
/// retried.
pub fn classify_resource_level_error(err: &kube::Error) -> ReadErrorClass {
    if let kube::Error::Api(resp) = err {
        match resp.code {
            403 | 404 => ReadErrorClass::PermanentKind,
            _ => ReadErrorClass::Transient,
        }
    } else {
        ReadErrorClass::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_message() {
        let err = EngineError::Validation("desired status must be Current or NotFound".into());
        assert_eq!(
            err.to_string(),
            "invalid options: desired status must be Current or NotFound"
        );
    }
}
