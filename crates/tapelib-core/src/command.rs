//! External commands and their parameter contracts.
//!
//! A transport adapter hands the core a [`Request`]: a command name plus
//! string parameters. [`Command::parse`] resolves the name to a
//! [`CommandName`] and checks required parameters, producing a typed
//! [`Command`]. Location identifiers are not resolved here; that happens in
//! the dispatcher against the live topology.

use crate::error::CommandError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A command invocation as received from outside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub name: String,
    pub params: BTreeMap<String, String>,
}

impl Request {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Required parameter: must be present and non-empty.
    fn require(&self, param: &'static str) -> Result<String, CommandError> {
        match self.params.get(param) {
            None => Err(CommandError::MissingParameter { param }),
            Some(value) if value.is_empty() => Err(CommandError::EmptyParameter { param }),
            Some(value) => Ok(value.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Command names
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandName {
    Load,
    Unload,
    Transfer,
    Scan,
    Park,
    Inventory,
    Sensors,
    Config,
    State,
    Info,
    Lock,
    Unlock,
}

impl CommandName {
    pub const ALL: [CommandName; 12] = [
        CommandName::Load,
        CommandName::Unload,
        CommandName::Transfer,
        CommandName::Scan,
        CommandName::Park,
        CommandName::Inventory,
        CommandName::Sensors,
        CommandName::Config,
        CommandName::State,
        CommandName::Info,
        CommandName::Lock,
        CommandName::Unlock,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandName::Load => "load",
            CommandName::Unload => "unload",
            CommandName::Transfer => "transfer",
            CommandName::Scan => "scan",
            CommandName::Park => "park",
            CommandName::Inventory => "inventory",
            CommandName::Sensors => "sensors",
            CommandName::Config => "config",
            CommandName::State => "state",
            CommandName::Info => "info",
            CommandName::Lock => "lock",
            CommandName::Unlock => "unlock",
        }
    }

    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            CommandName::Load | CommandName::Unload => &["slot", "drive"],
            CommandName::Transfer => &["source", "target"],
            CommandName::Scan => &["slot"],
            _ => &[],
        }
    }

    /// Accepted while the library is locked.
    pub fn is_lock_exempt(self) -> bool {
        matches!(
            self,
            CommandName::Inventory
                | CommandName::Sensors
                | CommandName::Config
                | CommandName::State
                | CommandName::Info
                | CommandName::Lock
                | CommandName::Unlock
        )
    }

    /// Number of tasks the command appends to the queue. Park replaces the
    /// queue instead of adding to it and reports zero.
    pub fn queued_tasks(self) -> usize {
        match self {
            CommandName::Load | CommandName::Unload | CommandName::Transfer => 4,
            CommandName::Scan => 2,
            _ => 0,
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandName {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| CommandError::UnknownMethod(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A validated command, ready for admission and dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Move a tape from a storage slot into a drive.
    Load { slot: String, drive: String },
    /// Move a tape from a drive back into a storage slot.
    Unload { slot: String, drive: String },
    /// Move a tape between two storage or access slots.
    Transfer { source: String, target: String },
    /// Drive to a slot and read its barcode.
    Scan { slot: String },
    /// Abandon pending work, return home and lock.
    Park,
    Inventory,
    Sensors,
    /// Read the configuration store, merging `updates` first if any.
    Config { updates: BTreeMap<String, String> },
    State,
    Info,
    Lock,
    Unlock,
}

impl Command {
    /// Resolve the request's name and validate its parameters.
    pub fn parse(request: &Request) -> Result<Self, CommandError> {
        let name: CommandName = request.name.parse()?;
        let command = match name {
            CommandName::Load => Command::Load {
                slot: request.require("slot")?,
                drive: request.require("drive")?,
            },
            CommandName::Unload => Command::Unload {
                slot: request.require("slot")?,
                drive: request.require("drive")?,
            },
            CommandName::Transfer => Command::Transfer {
                source: request.require("source")?,
                target: request.require("target")?,
            },
            CommandName::Scan => Command::Scan {
                slot: request.require("slot")?,
            },
            CommandName::Park => Command::Park,
            CommandName::Inventory => Command::Inventory,
            CommandName::Sensors => Command::Sensors,
            CommandName::Config => Command::Config {
                updates: request.params.clone(),
            },
            CommandName::State => Command::State,
            CommandName::Info => Command::Info,
            CommandName::Lock => Command::Lock,
            CommandName::Unlock => Command::Unlock,
        };
        Ok(command)
    }

    pub fn name(&self) -> CommandName {
        match self {
            Command::Load { .. } => CommandName::Load,
            Command::Unload { .. } => CommandName::Unload,
            Command::Transfer { .. } => CommandName::Transfer,
            Command::Scan { .. } => CommandName::Scan,
            Command::Park => CommandName::Park,
            Command::Inventory => CommandName::Inventory,
            Command::Sensors => CommandName::Sensors,
            Command::Config { .. } => CommandName::Config,
            Command::State => CommandName::State,
            Command::Info => CommandName::Info,
            Command::Lock => CommandName::Lock,
            Command::Unlock => CommandName::Unlock,
        }
    }
}
