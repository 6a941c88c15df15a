use crate::errors::{EngineError, Result};
use crate::status::Status;
use std::time::Duration;

/// The terminal status the aggregator checks every identifier against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DesiredStatus {
    Current,
    NotFound,
}

impl DesiredStatus {
    pub fn as_status(self) -> Status {
        match self {
            DesiredStatus::Current => Status::Current,
            DesiredStatus::NotFound => Status::NotFound,
        }
    }
}

/// Chooses how the watcher driver scopes its informers. Ignored by the
/// polling engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RestScopeStrategy {
    /// Namespace-scoped informers when every declared identifier shares
    /// one namespace, root-scoped otherwise.
    #[default]
    Automatic,
    /// Always cluster-wide informers.
    Root,
    /// Always per-namespace informers.
    Namespace,
}

/// Client-side or server-side restriction of which objects a watch
/// observes. Only consulted by the watcher driver.
#[derive(Clone, Debug, Default)]
pub struct ObjectFilter {
    pub labels: Option<String>,
    pub fields: Option<String>,
}

/// Configuration recognized by `Poll`/`Watch`.
#[derive(Clone, Debug)]
pub struct Options {
    pub poll_interval: Duration,
    pub poll_until_cancelled: bool,
    pub desired_status: DesiredStatus,
    pub use_cache: bool,
    pub object_filter: ObjectFilter,
    pub rest_scope_strategy: RestScopeStrategy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            poll_until_cancelled: false,
            desired_status: DesiredStatus::Current,
            use_cache: true,
            object_filter: ObjectFilter::default(),
            rest_scope_strategy: RestScopeStrategy::default(),
        }
    }
}

impl Options {
    /// Validates that `desired_status` is one the aggregator can act on,
    /// run before the engine's first cycle. `DesiredStatus` is already a
    /// closed enum of the two valid values, so this never actually fails
    /// today, but callers building `Options` from untyped input (e.g. a
    /// CLI flag) should still route through it as the named validation
    /// seam.
    pub fn validate(&self) -> Result<()> {
        match self.desired_status {
            DesiredStatus::Current | DesiredStatus::NotFound => Ok(()),
        }
    }

    pub fn poll_forever(mut self) -> Self {
        self.poll_until_cancelled = true;
        self
    }

    pub fn with_desired_status(mut self, desired: DesiredStatus) -> Self {
        self.desired_status = desired;
        self
    }
}

/// Parses a caller-supplied desired-status string (e.g. from a CLI flag)
/// into `DesiredStatus`, failing validation rather than panicking —
/// callers outside this crate own the flag parsing itself.
pub fn parse_desired_status(raw: &str) -> Result<DesiredStatus> {
    match raw {
        "Current" | "current" => Ok(DesiredStatus::Current),
        "NotFound" | "notfound" => Ok(DesiredStatus::NotFound),
        other => Err(EngineError::Validation(format!(
            "desired status must be Current or NotFound, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_poll_until_current() {
        let opts = Options::default();
        assert!(!opts.poll_until_cancelled);
        assert_eq!(opts.desired_status, DesiredStatus::Current);
        assert!(opts.use_cache);
    }

    #[test]
    fn parse_desired_status_accepts_both_cases() {
        assert_eq!(parse_desired_status("Current").unwrap(), DesiredStatus::Current);
        assert_eq!(parse_desired_status("notfound").unwrap(), DesiredStatus::NotFound);
        assert!(parse_desired_status("Bogus").is_err());
    }
}
