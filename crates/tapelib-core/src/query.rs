//! Read-only views of the library for observers and command results.
//!
//! All types are owned copies with no references into library storage, so
//! they can be handed to renderers or serialized by a transport adapter.

use crate::collab::StoreMap;
use crate::command::CommandName;
use crate::inventory::InventorySnapshot;
use crate::topology::LocationKind;
use serde::Serialize;

/// Answer to the `state` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    pub locked: bool,
    /// A task is in progress or waiting.
    pub busy: bool,
}

/// Where a location sits and whether it physically holds a tape. This is
/// ground truth, not the controller's inventory knowledge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationSnapshot {
    pub name: String,
    pub kind: LocationKind,
    pub x: i32,
    pub y: i32,
    pub occupied: bool,
}

/// Successful result of a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// Tasks were appended (or, for park, replaced the queue).
    Queued {
        command: CommandName,
        tasks: usize,
        message: String,
    },
    Inventory(InventorySnapshot),
    /// Contents of a collaborator store (sensors or config).
    Store(StoreMap),
    State(StateSnapshot),
    Info { info: String },
    /// Result of lock/unlock.
    Lock { locked: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_serialize_untagged() {
        let queued = Outcome::Queued {
            command: CommandName::Load,
            tasks: 4,
            message: "Loading from s0000 to d0100".into(),
        };
        let json = serde_json::to_value(&queued).unwrap();
        assert_eq!(json["command"], "load");
        assert_eq!(json["tasks"], 4);

        let state = Outcome::State(StateSnapshot {
            locked: false,
            busy: true,
        });
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            serde_json::json!({"locked": false, "busy": true})
        );
    }

    #[test]
    fn location_snapshot_kind_is_snake_case() {
        let snap = LocationSnapshot {
            name: "a0000".into(),
            kind: LocationKind::AccessSlot,
            x: 4,
            y: 18,
            occupied: false,
        };
        assert_eq!(serde_json::to_value(&snap).unwrap()["kind"], "access_slot");
    }
}
