//! Physical layout of the library: addressable locations, their grid
//! coordinates, and the single picker.
//!
//! Locations are stored in a [`SlotMap`] keyed by [`LocationId`] with a
//! name index on the side. Every fixed location is placed at construction
//! from a [`LayoutSpec`]; only the picker's position changes afterwards.

use crate::device::{Device, DeviceError};
use crate::id::{LocationId, TapeId};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::BTreeMap;
use std::fmt;

/// Fixed identifier of the picker.
pub const PICKER_NAME: &str = "picker";

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A position on the library's 2-D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// One unit toward `target`, on X while X differs, otherwise on Y.
    /// Returns `self` unchanged once both axes match.
    pub fn step_toward(self, target: Position) -> Position {
        if self.x != target.x {
            Position::new(self.x + (target.x - self.x).signum(), self.y)
        } else if self.y != target.y {
            Position::new(self.x, self.y + (target.y - self.y).signum())
        } else {
            self
        }
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: &Position) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }
}

/// Inclusive bounding box `0..=x_max`, `0..=y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_max: i32,
    pub y_max: i32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self { x_max: 80, y_max: 50 }
    }
}

impl Bounds {
    pub fn contains(&self, pos: Position) -> bool {
        (0..=self.x_max).contains(&pos.x) && (0..=self.y_max).contains(&pos.y)
    }

    pub fn clamp(&self, pos: Position) -> Position {
        Position::new(pos.x.clamp(0, self.x_max), pos.y.clamp(0, self.y_max))
    }
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// What a location is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Slot,
    AccessSlot,
    Drive,
    Picker,
}

impl LocationKind {
    /// Single-letter prefix used when deriving identifiers.
    pub fn prefix(self) -> &'static str {
        match self {
            LocationKind::Slot => "s",
            LocationKind::AccessSlot => "a",
            LocationKind::Drive => "d",
            LocationKind::Picker => "p",
        }
    }

    /// Storage and access slots can both hold a tape at rest for a transfer.
    pub fn is_slot_like(self) -> bool {
        matches!(self, LocationKind::Slot | LocationKind::AccessSlot)
    }

    /// Identifier for a location of this kind at (`column`, `row`).
    pub fn location_name(self, column: u8, row: u8) -> String {
        match self {
            LocationKind::Picker => PICKER_NAME.to_string(),
            _ => format!("{}{:02}{:02}", self.prefix(), column, row),
        }
    }

    /// Grid coordinate of a fixed location. The picker has no fixed home
    /// and gets its start position from the layout.
    fn fixed_position(self, column: u8, row: u8) -> Option<Position> {
        let (c, r) = (i32::from(column), i32::from(row));
        match self {
            LocationKind::Slot => Some(Position::new(16 + c * 6, 2 + r * 3)),
            LocationKind::AccessSlot => Some(Position::new(4, 18 + r * 3)),
            LocationKind::Drive => Some(Position::new(6, 3 + c * 6 + r * 6)),
            LocationKind::Picker => None,
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LocationKind::Slot => "slot",
            LocationKind::AccessSlot => "access slot",
            LocationKind::Drive => "drive",
            LocationKind::Picker => "picker",
        })
    }
}

/// One addressable location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub kind: LocationKind,
    pub column: u8,
    pub row: u8,
    name: String,
    pub(crate) position: Position,
    tape: Option<TapeId>,
}

impl Location {
    fn fixed(kind: LocationKind, column: u8, row: u8) -> Option<Self> {
        let position = kind.fixed_position(column, row)?;
        Some(Self {
            kind,
            column,
            row,
            name: kind.location_name(column, row),
            position,
            tape: None,
        })
    }

    fn picker(start: Position) -> Self {
        Self {
            kind: LocationKind::Picker,
            column: 0,
            row: 0,
            name: PICKER_NAME.to_string(),
            position: start,
            tape: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

impl Device for Location {
    fn name(&self) -> &str {
        &self.name
    }

    fn cell(&self) -> &Option<TapeId> {
        &self.tape
    }

    fn cell_mut(&mut self) -> &mut Option<TapeId> {
        &mut self.tape
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// A tape placed in a location when the library is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialTape {
    pub location: String,
    pub tape: TapeId,
}

/// Everything needed to build a [`Topology`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSpec {
    pub bounds: Bounds,
    pub slot_columns: u8,
    pub slot_rows: u8,
    pub access_slots: u8,
    pub drives: u8,
    /// Picker start position. `None` builds a library without a picker,
    /// in which ticks do nothing.
    pub picker: Option<Position>,
    pub initial_tapes: Vec<InitialTape>,
    /// Where `park` sends the picker.
    pub home_slot: String,
}

impl LayoutSpec {
    /// `count` tapes in the first storage slots, column-major, labelled
    /// downward so that `s0000` holds the highest number.
    pub fn seeded_tapes(slot_rows: u8, count: usize) -> Vec<InitialTape> {
        let rows = usize::from(slot_rows.max(1));
        (0..count)
            .map(|i| InitialTape {
                location: LocationKind::Slot.location_name((i / rows) as u8, (i % rows) as u8),
                tape: TapeId(format!("tape{}", count - 1 - i)),
            })
            .collect()
    }
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            slot_columns: 11,
            slot_rows: 16,
            access_slots: 6,
            drives: 2,
            picker: Some(Position::new(10, 10)),
            initial_tapes: Self::seeded_tapes(16, 7),
            home_slot: "s0000".to_string(),
        }
    }
}

/// Errors raised while building a topology.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("duplicate location identifier '{0}'")]
    DuplicateName(String),

    #[error("location '{name}' at ({x}, {y}) lies outside the library bounds")]
    OutOfBounds { name: String, x: i32, y: i32 },

    #[error("home slot '{0}' is not a storage or access slot in this layout")]
    UnknownHome(String),

    #[error("initial tape '{tape}' names unknown location '{location}'")]
    UnknownTapeLocation { location: String, tape: TapeId },

    #[error("initial tape placement failed: {0}")]
    Placement(#[from] DeviceError),
}

// ---------------------------------------------------------------------------
// Topology
// ---------------------------------------------------------------------------

/// The set of locations of one library.
#[derive(Debug, Clone)]
pub struct Topology {
    locations: SlotMap<LocationId, Location>,
    by_name: BTreeMap<String, LocationId>,
    /// Construction order: drives, access slots, storage slots, picker.
    order: Vec<LocationId>,
    picker: Option<LocationId>,
    home: LocationId,
    bounds: Bounds,
}

impl Topology {
    /// Build and validate a topology from a layout.
    pub fn build(spec: &LayoutSpec) -> Result<Self, TopologyError> {
        let mut fixed = Vec::new();
        for column in 0..spec.drives {
            fixed.extend(Location::fixed(LocationKind::Drive, column, 0));
        }
        for row in 0..spec.access_slots {
            fixed.extend(Location::fixed(LocationKind::AccessSlot, 0, row));
        }
        for column in 0..spec.slot_columns {
            for row in 0..spec.slot_rows {
                fixed.extend(Location::fixed(LocationKind::Slot, column, row));
            }
        }

        let mut locations = SlotMap::with_key();
        let mut by_name = BTreeMap::new();
        let mut order = Vec::with_capacity(fixed.len() + 1);

        let picker_location = spec.picker.map(Location::picker);
        for location in fixed.into_iter().chain(picker_location) {
            if !spec.bounds.contains(location.position) {
                return Err(TopologyError::OutOfBounds {
                    name: location.name.clone(),
                    x: location.position.x,
                    y: location.position.y,
                });
            }
            if by_name.contains_key(&location.name) {
                return Err(TopologyError::DuplicateName(location.name));
            }
            let name = location.name.clone();
            let id = locations.insert(location);
            by_name.insert(name, id);
            order.push(id);
        }

        let picker = by_name.get(PICKER_NAME).copied();
        let home = by_name
            .get(&spec.home_slot)
            .copied()
            .filter(|&id| locations[id].kind.is_slot_like())
            .ok_or_else(|| TopologyError::UnknownHome(spec.home_slot.clone()))?;

        let mut topology = Self {
            locations,
            by_name,
            order,
            picker,
            home,
            bounds: spec.bounds,
        };

        for initial in &spec.initial_tapes {
            let id = topology
                .resolve(&initial.location)
                .filter(|&id| topology.locations[id].kind != LocationKind::Picker)
                .ok_or_else(|| TopologyError::UnknownTapeLocation {
                    location: initial.location.clone(),
                    tape: initial.tape.clone(),
                })?;
            topology.locations[id].enter(initial.tape.clone())?;
        }

        Ok(topology)
    }

    /// Look up a location by identifier.
    pub fn resolve(&self, name: &str) -> Option<LocationId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        self.locations.get_mut(id)
    }

    /// Name of a location, or `"?"` for a stale id.
    pub fn name(&self, id: LocationId) -> &str {
        self.locations.get(id).map_or("?", |l| l.name())
    }

    pub fn picker(&self) -> Option<LocationId> {
        self.picker
    }

    pub fn picker_location(&self) -> Option<&Location> {
        self.picker.and_then(|id| self.locations.get(id))
    }

    /// The slot `park` returns the picker to.
    pub fn home(&self) -> LocationId {
        self.home
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// All locations in construction order.
    pub fn iter(&self) -> impl Iterator<Item = (LocationId, &Location)> + '_ {
        self.order.iter().map(|&id| (id, &self.locations[id]))
    }

    /// All locations except the picker.
    pub fn fixed_locations(&self) -> impl Iterator<Item = (LocationId, &Location)> + '_ {
        self.iter().filter(|(_, l)| l.kind != LocationKind::Picker)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Move the occupant of `from` into `to`.
    ///
    /// Both ends are checked before either is touched: an empty source
    /// reports `EmptyLocation`, an occupied destination `OccupiedLocation`,
    /// and in both cases nothing moves.
    pub fn move_tape(&mut self, from: LocationId, to: LocationId) -> Result<TapeId, DeviceError> {
        let source = &self.locations[from];
        if !source.is_occupied() {
            return Err(DeviceError::EmptyLocation {
                location: source.name.clone(),
            });
        }
        let destination = &self.locations[to];
        if let Some(occupant) = destination.scan() {
            return Err(DeviceError::OccupiedLocation {
                location: destination.name.clone(),
                tape: occupant.clone(),
            });
        }

        let tape = self.locations[from].eject()?;
        self.locations[to].enter(tape.clone())?;
        Ok(tape)
    }
}
