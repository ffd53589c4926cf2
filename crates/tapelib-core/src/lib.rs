//! Tapelib Core -- a deterministic simulator of an automated tape library.
//!
//! A single picker carries tapes between storage slots, access (mail) slots
//! and drives. Clients submit commands; each accepted motion command becomes
//! a short batch of primitive tasks on a FIFO queue, and a tick-driven
//! executor performs one step of work per tick.
//!
//! # Tick
//!
//! Each call to [`library::Library::step`] does exactly one of:
//!
//! 1. **Skip** -- the library is locked or has no picker. The tick counter
//!    does not advance.
//! 2. **Idle** -- nothing current, nothing queued.
//! 3. **Dequeue** -- move the front of the queue into the current slot.
//! 4. **Execute** -- one step of the current task. `goto` moves the picker
//!    one unit on one axis (X first) and finishes on the tick it is already
//!    in place.
//!
//! A failed tape move drops the current task and clears the whole queue.
//!
//! # Command path
//!
//! [`library::Library::handle`] takes a [`command::Request`] through four
//! checks, in order: name and parameters, lock, queue depth, and location
//! resolution. Any failure maps to a `{type, reason}` [`error::Rejection`]
//! and leaves the library untouched.
//!
//! ```rust
//! use tapelib_core::command::Request;
//! use tapelib_core::inventory::SlotState;
//! use tapelib_core::library::{Library, LibraryConfig};
//!
//! let mut library = Library::new(&LibraryConfig::default()).unwrap();
//! library
//!     .handle(&Request::new("load").param("slot", "s0000").param("drive", "d0100"))
//!     .unwrap();
//! while library.is_busy() {
//!     library.step();
//! }
//! assert_eq!(library.inventory().by_name("s0000"), Some(&SlotState::Empty));
//! ```
//!
//! # Key Types
//!
//! - [`library::Library`] -- owns all state; the only mutation entry points.
//! - [`topology::Topology`] -- named locations, coordinates and the picker.
//! - [`inventory::InventoryView`] -- what the controller believes each
//!   location holds, as unknown / empty / a tape id.
//! - [`task::TaskQueue`] -- FIFO of primitive [`task::Task`]s.
//! - [`event::EventLog`] -- bounded ring of [`event::LibraryEvent`]s.

pub mod admission;
pub mod collab;
pub mod command;
pub mod device;
mod dispatch;
pub mod error;
pub mod event;
pub mod executor;
pub mod id;
pub mod inventory;
pub mod library;
pub mod query;
pub mod sim;
pub mod task;
pub mod topology;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
