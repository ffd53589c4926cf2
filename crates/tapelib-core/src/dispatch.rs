//! Turning admitted commands into queued tasks or immediate answers.
//!
//! Motion commands resolve every location identifier first and only then
//! append their whole task batch, so a bad identifier leaves the queue
//! untouched. `lock` and `unlock` act immediately; `park` replaces the
//! queue. Queries read the model and never mutate it.

use crate::command::{Command, CommandName};
use crate::error::{CommandError, LocationRole};
use crate::event::LibraryEvent;
use crate::id::LocationId;
use crate::library::Library;
use crate::query::Outcome;
use crate::task::{Task, move_plan};
use crate::topology::LocationKind;
use tracing::{error, info};

impl Library {
    pub(crate) fn dispatch(&mut self, command: Command) -> Result<Outcome, CommandError> {
        let name = command.name();
        match command {
            Command::Load { slot, drive } => {
                let from = self.resolve(&slot, LocationRole::Slot, |k| k == LocationKind::Slot)?;
                let to = self.resolve(&drive, LocationRole::Drive, |k| k == LocationKind::Drive)?;
                Ok(self.enqueue(name, move_plan(from, to), format!("Loading from {slot} to {drive}")))
            }
            Command::Unload { slot, drive } => {
                let to = self.resolve(&slot, LocationRole::Slot, |k| k == LocationKind::Slot)?;
                let from = self.resolve(&drive, LocationRole::Drive, |k| k == LocationKind::Drive)?;
                Ok(self.enqueue(name, move_plan(from, to), format!("Unloading from {drive} to {slot}")))
            }
            Command::Transfer { source, target } => {
                let from = self.resolve(&source, LocationRole::Slot, LocationKind::is_slot_like)?;
                let to = self.resolve(&target, LocationRole::Slot, LocationKind::is_slot_like)?;
                Ok(self.enqueue(
                    name,
                    move_plan(from, to),
                    format!("Transferring from {source} to {target}"),
                ))
            }
            Command::Scan { slot } => {
                let at = self.resolve(&slot, LocationRole::Slot, LocationKind::is_slot_like)?;
                Ok(self.enqueue(name, [Task::Goto(at), Task::Scan(at)], format!("Scanning {slot}")))
            }
            Command::Park => {
                self.abandon_work();
                let home = self.topology.home();
                Ok(self.enqueue(name, [Task::Goto(home), Task::Stop], "Parking".to_string()))
            }
            Command::Inventory => Ok(Outcome::Inventory(self.inventory.snapshot())),
            Command::Sensors => self.sensors.snapshot().map(Outcome::Store).map_err(|err| {
                error!(%err, "sensor read failed");
                CommandError::Internal(err.to_string())
            }),
            Command::Config { updates } => {
                self.config_store
                    .merge(&updates)
                    .map(Outcome::Store)
                    .map_err(|err| {
                        error!(%err, "config update failed");
                        CommandError::Internal(err.to_string())
                    })
            }
            Command::State => Ok(Outcome::State(self.state())),
            Command::Info => Ok(Outcome::Info { info: self.info() }),
            Command::Lock => {
                self.halt();
                Ok(Outcome::Lock { locked: true })
            }
            Command::Unlock => {
                self.unlock();
                Ok(Outcome::Lock { locked: false })
            }
        }
    }

    /// Resolve an identifier supplied in `role`, requiring a location kind
    /// accepted by `accepts`.
    fn resolve(
        &self,
        name: &str,
        role: LocationRole,
        accepts: impl Fn(LocationKind) -> bool,
    ) -> Result<LocationId, CommandError> {
        let id = self
            .topology
            .resolve(name)
            .ok_or_else(|| CommandError::UnknownLocation {
                role,
                name: name.to_string(),
            })?;
        match self.topology.get(id) {
            Some(location) if accepts(location.kind) => Ok(id),
            _ => Err(CommandError::WrongLocationKind {
                role,
                name: name.to_string(),
            }),
        }
    }

    fn enqueue(
        &mut self,
        command: CommandName,
        tasks: impl IntoIterator<Item = Task>,
        message: String,
    ) -> Outcome {
        let before = self.queue.len();
        self.queue.push_batch(tasks);
        let added = self.queue.len() - before;
        info!(%command, tasks = added, tick = self.sim_state.tick, "{message}");
        self.events.push(LibraryEvent::CommandAccepted {
            command,
            tasks: added,
            tick: self.sim_state.tick,
        });
        Outcome::Queued {
            command,
            tasks: added,
            message,
        }
    }
}
