//! The occupancy contract shared by every location kind.
//!
//! A device holds at most one tape. `eject` on an empty device and `enter`
//! on an occupied one are the only faults the physical model can raise;
//! both leave the device untouched.

use crate::id::TapeId;

/// Domain faults raised while moving tapes. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("{location} is empty")]
    EmptyLocation { location: String },

    /// `tape` is the cartridge that was refused, handed back to the caller.
    #[error("{location} is not empty")]
    OccupiedLocation { location: String, tape: TapeId },
}

impl DeviceError {
    /// Name of the location that raised the fault.
    pub fn location(&self) -> &str {
        match self {
            DeviceError::EmptyLocation { location } => location,
            DeviceError::OccupiedLocation { location, .. } => location,
        }
    }
}

/// Per-location occupancy. Implementors only expose their storage cell;
/// the scan/eject/enter rules live in the provided methods.
pub trait Device {
    /// Stable identifier used in error messages.
    fn name(&self) -> &str;

    /// The occupancy cell.
    fn cell(&self) -> &Option<TapeId>;

    fn cell_mut(&mut self) -> &mut Option<TapeId>;

    /// Read the current occupant without changing anything.
    fn scan(&self) -> Option<&TapeId> {
        self.cell().as_ref()
    }

    fn is_occupied(&self) -> bool {
        self.cell().is_some()
    }

    /// Remove and return the occupant.
    fn eject(&mut self) -> Result<TapeId, DeviceError> {
        match self.cell_mut().take() {
            Some(tape) => Ok(tape),
            None => Err(DeviceError::EmptyLocation {
                location: self.name().to_string(),
            }),
        }
    }

    /// Install `tape` as the occupant.
    fn enter(&mut self, tape: TapeId) -> Result<(), DeviceError> {
        if self.is_occupied() {
            return Err(DeviceError::OccupiedLocation {
                location: self.name().to_string(),
                tape,
            });
        }
        *self.cell_mut() = Some(tape);
        Ok(())
    }
}
