use std::fmt;

/// Closed enumeration of the lifecycle states this crate recognizes.
/// `Unknown` is the initial value before any observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Status {
    Unknown,
    InProgress,
    Current,
    Failed,
    NotFound,
    Terminating,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Unknown => "Unknown",
            Status::InProgress => "InProgress",
            Status::Current => "Current",
            Status::Failed => "Failed",
            Status::NotFound => "NotFound",
            Status::Terminating => "Terminating",
        };
        write!(f, "{s}")
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Unknown
    }
}
