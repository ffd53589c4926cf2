//! Serde data file structs for library configuration.
//!
//! These structs define the on-disk format of a library configuration file.
//! They are deserialized from RON, JSON, or TOML and then converted into
//! core types by the loader. Every field is optional; a missing field takes
//! the value of the stock library.

use serde::Deserialize;
use tapelib_core::admission::DEFAULT_MAX_QUEUE_DEPTH;
use tapelib_core::event::DEFAULT_EVENT_CAPACITY;
use tapelib_core::topology::{Bounds, InitialTape, LayoutSpec, Position};

/// Milliseconds between scheduler ticks.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Number of tapes seeded when no explicit placement is given.
pub const DEFAULT_SEEDED_TAPES: usize = 7;

// ===========================================================================
// Top level
// ===========================================================================

/// A whole configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryFile {
    pub layout: LayoutData,
    pub admission: AdmissionData,
    pub scheduler: SchedulerData,
    pub events: EventsData,
}

// ===========================================================================
// Layout
// ===========================================================================

/// Physical layout of the library.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutData {
    pub bounds: Bounds,
    pub slot_columns: u8,
    pub slot_rows: u8,
    pub access_slots: u8,
    pub drives: u8,
    /// Picker start position.
    pub picker: Option<Position>,
    /// Explicit tape placement. When absent, `seeded_tapes` tapes are put
    /// in the first storage slots.
    pub initial_tapes: Option<Vec<InitialTape>>,
    pub seeded_tapes: usize,
    pub home_slot: String,
}

impl Default for LayoutData {
    fn default() -> Self {
        let stock = LayoutSpec::default();
        Self {
            bounds: stock.bounds,
            slot_columns: stock.slot_columns,
            slot_rows: stock.slot_rows,
            access_slots: stock.access_slots,
            drives: stock.drives,
            picker: stock.picker,
            initial_tapes: None,
            seeded_tapes: DEFAULT_SEEDED_TAPES,
            home_slot: stock.home_slot,
        }
    }
}

impl LayoutData {
    pub fn to_spec(&self) -> LayoutSpec {
        let initial_tapes = match &self.initial_tapes {
            Some(tapes) => tapes.clone(),
            None => LayoutSpec::seeded_tapes(self.slot_rows, self.seeded_tapes),
        };
        LayoutSpec {
            bounds: self.bounds,
            slot_columns: self.slot_columns,
            slot_rows: self.slot_rows,
            access_slots: self.access_slots,
            drives: self.drives,
            picker: self.picker,
            initial_tapes,
            home_slot: self.home_slot.clone(),
        }
    }
}

// ===========================================================================
// Admission, scheduler, events
// ===========================================================================

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdmissionData {
    pub max_queue_depth: usize,
}

impl Default for AdmissionData {
    fn default() -> Self {
        Self {
            max_queue_depth: DEFAULT_MAX_QUEUE_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerData {
    pub tick_interval_ms: u64,
}

impl Default for SchedulerData {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventsData {
    pub capacity: usize,
}

impl Default for EventsData {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_the_stock_library() {
        let file: LibraryFile = serde_json::from_str("{}").unwrap();
        assert_eq!(file.layout.to_spec(), LayoutSpec::default());
        assert_eq!(file.admission.max_queue_depth, 64);
        assert_eq!(file.scheduler.tick_interval_ms, 1000);
        assert_eq!(file.events.capacity, 256);
    }

    #[test]
    fn explicit_tapes_replace_seeding() {
        let file: LibraryFile = serde_json::from_str(
            r#"{"layout": {"initial_tapes": [{"location": "a0001", "tape": "cleaning"}]}}"#,
        )
        .unwrap();
        let spec = file.layout.to_spec();
        assert_eq!(spec.initial_tapes.len(), 1);
        assert_eq!(spec.initial_tapes[0].location, "a0001");
        assert_eq!(spec.initial_tapes[0].tape.as_str(), "cleaning");
    }

    #[test]
    fn seeded_count_is_configurable() {
        let file: LibraryFile = toml::from_str("[layout]\nseeded_tapes = 20\n").unwrap();
        let spec = file.layout.to_spec();
        assert_eq!(spec.initial_tapes.len(), 20);
        // Column-major: the seventeenth tape starts the second column.
        assert_eq!(spec.initial_tapes[16].location, "s0100");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<LibraryFile, _> = toml::from_str("[scheduler]\ntick_ms = 5\n");
        assert!(result.is_err());
    }
}
