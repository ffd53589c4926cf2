//! What the library controller believes is in each location.
//!
//! Knowledge is gathered lazily: every location starts [`SlotState::Unknown`]
//! and becomes known when a scan reads it or a tape move passes through it.
//! Nothing ever sets a location back to unknown.

use crate::id::TapeId;
use crate::topology::{LocationKind, Topology};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Known state of one location.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Unknown,
    Empty,
    Occupied(TapeId),
}

impl SlotState {
    pub fn from_scan(tape: Option<&TapeId>) -> Self {
        match tape {
            Some(tape) => SlotState::Occupied(tape.clone()),
            None => SlotState::Empty,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SlotState::Unknown)
    }
}

/// Rendered as `null` (unknown), `false` (empty) or the tape label.
impl Serialize for SlotState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SlotState::Unknown => serializer.serialize_none(),
            SlotState::Empty => serializer.serialize_bool(false),
            SlotState::Occupied(tape) => serializer.serialize_str(tape.as_str()),
        }
    }
}

/// Key of an inventory entry: the location kind and its identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InventoryKey {
    pub kind: LocationKind,
    pub name: String,
}

impl InventoryKey {
    pub fn new(kind: LocationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// Typed map from every non-picker location to its [`SlotState`].
#[derive(Debug, Clone, Default)]
pub struct InventoryView {
    entries: BTreeMap<InventoryKey, SlotState>,
    picker: SlotState,
}

impl InventoryView {
    /// An all-unknown view covering every fixed location of `topology`.
    pub fn new(topology: &Topology) -> Self {
        let entries = topology
            .fixed_locations()
            .map(|(_, loc)| (InventoryKey::new(loc.kind, loc.name()), SlotState::Unknown))
            .collect();
        Self {
            entries,
            picker: SlotState::Unknown,
        }
    }

    /// Record a known state. The picker is tracked separately; unknown
    /// locations are ignored.
    pub fn record(&mut self, kind: LocationKind, name: &str, state: SlotState) {
        if !state.is_known() {
            return;
        }
        if kind == LocationKind::Picker {
            self.picker = state;
            return;
        }
        if let Some(entry) = self.entries.get_mut(&InventoryKey::new(kind, name)) {
            *entry = state;
        }
    }

    pub fn get(&self, kind: LocationKind, name: &str) -> Option<&SlotState> {
        self.entries.get(&InventoryKey::new(kind, name))
    }

    /// Look up by identifier alone; identifiers are unique across kinds.
    pub fn by_name(&self, name: &str) -> Option<&SlotState> {
        self.entries
            .iter()
            .find(|(key, _)| key.name == name)
            .map(|(_, state)| state)
    }

    pub fn picker(&self) -> &SlotState {
        &self.picker
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InventoryKey, &SlotState)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of locations whose state is known.
    pub fn known_count(&self) -> usize {
        self.entries.values().filter(|s| s.is_known()).count()
    }

    /// Owned snapshot grouped by location kind.
    pub fn snapshot(&self) -> InventorySnapshot {
        let mut snapshot = InventorySnapshot {
            picker: self.picker.clone(),
            ..InventorySnapshot::default()
        };
        for (key, state) in &self.entries {
            let group = match key.kind {
                LocationKind::Slot => &mut snapshot.slots,
                LocationKind::AccessSlot => &mut snapshot.access_slots,
                LocationKind::Drive => &mut snapshot.drives,
                LocationKind::Picker => continue,
            };
            group.insert(key.name.clone(), state.clone());
        }
        snapshot
    }
}

/// Serializable copy of an [`InventoryView`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySnapshot {
    pub slots: BTreeMap<String, SlotState>,
    pub access_slots: BTreeMap<String, SlotState>,
    pub drives: BTreeMap<String, SlotState>,
    pub picker: SlotState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::LayoutSpec;

    fn view() -> InventoryView {
        InventoryView::new(&Topology::build(&LayoutSpec::default()).unwrap())
    }

    #[test]
    fn starts_all_unknown() {
        let view = view();
        assert_eq!(view.len(), 176 + 6 + 2);
        assert_eq!(view.known_count(), 0);
        assert_eq!(view.get(LocationKind::Slot, "s0000"), Some(&SlotState::Unknown));
        assert_eq!(view.picker(), &SlotState::Unknown);
    }

    #[test]
    fn record_makes_known() {
        let mut view = view();
        view.record(LocationKind::Drive, "d0100", SlotState::Occupied(TapeId::new("tape6")));
        assert_eq!(
            view.by_name("d0100"),
            Some(&SlotState::Occupied(TapeId::new("tape6")))
        );
        assert_eq!(view.known_count(), 1);
    }

    #[test]
    fn unknown_never_overwrites_known() {
        let mut view = view();
        view.record(LocationKind::Slot, "s0000", SlotState::Empty);
        view.record(LocationKind::Slot, "s0000", SlotState::Unknown);
        assert_eq!(view.get(LocationKind::Slot, "s0000"), Some(&SlotState::Empty));
    }

    #[test]
    fn picker_is_tracked_beside_the_map() {
        let mut view = view();
        view.record(LocationKind::Picker, "picker", SlotState::Occupied(TapeId::new("t")));
        assert_eq!(view.picker(), &SlotState::Occupied(TapeId::new("t")));
        assert_eq!(view.len(), 176 + 6 + 2);
    }

    #[test]
    fn kind_is_part_of_the_key() {
        let mut view = view();
        view.record(LocationKind::Drive, "s0000", SlotState::Empty);
        assert_eq!(view.get(LocationKind::Slot, "s0000"), Some(&SlotState::Unknown));
        assert_eq!(view.get(LocationKind::Drive, "s0000"), None);
    }

    #[test]
    fn snapshot_serializes_tri_state() {
        let mut view = view();
        view.record(LocationKind::Slot, "s0000", SlotState::Empty);
        view.record(LocationKind::Drive, "d0000", SlotState::Occupied(TapeId::new("tape6")));
        let json = serde_json::to_value(view.snapshot()).unwrap();
        assert_eq!(json["slots"]["s0000"], serde_json::json!(false));
        assert_eq!(json["slots"]["s0001"], serde_json::Value::Null);
        assert_eq!(json["drives"]["d0000"], serde_json::json!("tape6"));
        assert_eq!(json["access_slots"].as_object().unwrap().len(), 6);
    }
}
