//! Errors returned to the caller of a command.
//!
//! Every [`CommandError`] maps to a stable [`Rejection`] pair that transport
//! adapters translate into their own status codes. Domain faults raised
//! while tasks run are [`crate::device::DeviceError`]s and never reach the
//! caller directly; they surface through `last error` and the event log.

use serde::Serialize;
use std::fmt;

/// Which role an unresolved location identifier was supplied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationRole {
    Slot,
    Drive,
}

impl LocationRole {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationRole::Slot => "slot",
            LocationRole::Drive => "drive",
        }
    }
}

impl fmt::Display for LocationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a command was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("missing parameter '{param}'")]
    MissingParameter { param: &'static str },

    #[error("empty parameter '{param}'")]
    EmptyParameter { param: &'static str },

    /// The identifier does not name any location.
    #[error("no such {role} '{name}'")]
    UnknownLocation { role: LocationRole, name: String },

    /// The identifier names a location of the wrong kind for its role.
    #[error("'{name}' is not a {role}")]
    WrongLocationKind { role: LocationRole, name: String },

    #[error("library is locked")]
    Locked,

    #[error("too many requests in progress ({depth} tasks outstanding, limit {limit})")]
    QueueFull { depth: usize, limit: usize },

    #[error("no such method '{0}'")]
    UnknownMethod(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable `{type, reason}` pair describing a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rejection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub reason: &'static str,
}

impl CommandError {
    pub fn rejection(&self) -> Rejection {
        let (kind, reason) = match self {
            CommandError::MissingParameter { .. } => ("parameter", "missing"),
            CommandError::EmptyParameter { .. } => ("parameter", "empty"),
            CommandError::UnknownLocation { role, .. } => (role.as_str(), "nosuch"),
            CommandError::WrongLocationKind { role, .. } => (role.as_str(), "notspecified"),
            CommandError::Locked => ("lock", "locked"),
            CommandError::QueueFull { .. } => ("taskqueue", "full"),
            CommandError::UnknownMethod(_) => ("method", "nosuch"),
            CommandError::Internal(_) => ("server", "internal"),
        };
        Rejection { kind, reason }
    }
}
