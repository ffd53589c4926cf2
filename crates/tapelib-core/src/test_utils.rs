//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::command::Request;
use crate::inventory::SlotState;
use crate::library::{Library, LibraryConfig};
use crate::topology::{LayoutSpec, Position};

// ===========================================================================
// Library constructors
// ===========================================================================

/// The default layout: 176 slots, 6 access slots, 2 drives, 7 tapes.
pub fn fresh_library() -> Library {
    Library::new(&LibraryConfig::default()).unwrap()
}

pub fn library_with_depth(max_queue_depth: usize) -> Library {
    let mut config = LibraryConfig::default();
    config.admission.max_queue_depth = max_queue_depth;
    Library::new(&config).unwrap()
}

pub fn library_without_picker() -> Library {
    let config = LibraryConfig {
        layout: LayoutSpec {
            picker: None,
            ..LayoutSpec::default()
        },
        ..LibraryConfig::default()
    };
    Library::new(&config).unwrap()
}

// ===========================================================================
// Request builders
// ===========================================================================

pub fn load(slot: &str, drive: &str) -> Request {
    Request::new("load").param("slot", slot).param("drive", drive)
}

pub fn unload(slot: &str, drive: &str) -> Request {
    Request::new("unload").param("slot", slot).param("drive", drive)
}

pub fn transfer(source: &str, target: &str) -> Request {
    Request::new("transfer")
        .param("source", source)
        .param("target", target)
}

pub fn scan(slot: &str) -> Request {
    Request::new("scan").param("slot", slot)
}

// ===========================================================================
// Driving the clock
// ===========================================================================

/// Step until nothing is current or queued, or `max_ticks` have been tried.
/// Returns the number of steps taken.
pub fn run_until_idle(library: &mut Library, max_ticks: u64) -> u64 {
    let mut steps = 0;
    while library.is_busy() && steps < max_ticks {
        library.step();
        steps += 1;
    }
    steps
}

// ===========================================================================
// Query helpers
// ===========================================================================

pub fn picker_position(library: &Library) -> Position {
    library
        .topology()
        .picker_location()
        .map(|p| p.position())
        .unwrap()
}

/// Inventory knowledge for a named location; the picker is looked up by
/// its own name.
pub fn inventory_state(library: &Library, name: &str) -> SlotState {
    if name == crate::topology::PICKER_NAME {
        return library.inventory().picker().clone();
    }
    library
        .inventory()
        .by_name(name)
        .cloned()
        .unwrap_or_default()
}

/// Whether the named location physically holds a tape.
pub fn holds_tape(library: &Library, name: &str) -> bool {
    use crate::device::Device;
    let topology = library.topology();
    topology
        .resolve(name)
        .and_then(|id| topology.get(id))
        .is_some_and(|loc| loc.is_occupied())
}
