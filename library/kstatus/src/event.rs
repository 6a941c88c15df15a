use crate::resource_status::ResourceStatus;
use crate::status::Status;
use chrono::Utc;

/// Tagged union of everything that can cross the event channel. `Sync`
/// always precedes any `ResourceUpdate`; `Completed`/`Aborted`, if
/// emitted, is the terminal event and closes the channel.
#[derive(Clone, Debug)]
pub enum Event {
    Sync,
    ResourceUpdate(ResourceStatus),
    Error(String),
    Completed(Status),
    Aborted(Status),
}

impl Event {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Completed(_) | Event::Aborted(_))
    }

    /// Discriminant name, for the collector's "last event kind" without
    /// cloning the event's payload.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Event::Sync => "Sync",
            Event::ResourceUpdate(_) => "ResourceUpdate",
            Event::Error(_) => "Error",
            Event::Completed(_) => "Completed",
            Event::Aborted(_) => "Aborted",
        }
    }

    /// The JSON printer's stable wire shape. Pure formatting over data
    /// this crate owns; writing the line to a file/stdout is the external
    /// printer's job. Returns `None` for event variants that carry no
    /// single resource (`Sync`, `Error`, `Completed`, `Aborted`).
    pub fn to_json_line(&self, inventory_name: &str) -> Option<serde_json::Value> {
        let ResourceStatus {
            identifier,
            status,
            message,
            ..
        } = match self {
            Event::ResourceUpdate(rs) => rs,
            _ => return None,
        };
        Some(serde_json::json!({
            "group": identifier.group_kind.group,
            "kind": identifier.group_kind.kind,
            "namespace": identifier.namespace,
            "name": identifier.name,
            "timestamp": Utc::now().to_rfc3339(),
            "type": "status",
            "inventory-name": inventory_name,
            "status": status.to_string(),
            "message": message,
        }))
    }

    /// The text printer's stable wire shape:
    /// `<inventory>/<lowercaseKind.group>/<namespace>/<name> is <Status>: <message>\n`
    pub fn to_text_line(&self, inventory_name: &str) -> Option<String> {
        let ResourceStatus {
            identifier,
            status,
            message,
            ..
        } = match self {
            Event::ResourceUpdate(rs) => rs,
            _ => return None,
        };
        Some(format!(
            "{inventory_name}/{}/{}/{} is {status}: {message}\n",
            identifier.group_kind.lowercase_dotted(),
            identifier.namespace,
            identifier.name,
        ))
    }
}
