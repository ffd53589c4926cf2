//! The library: owns the topology, inventory knowledge, task queue and lock
//! flag, and is the single entry point for both the tick and command paths.
//!
//! # Architecture
//!
//! The `Library` owns:
//! - A [`Topology`] (locations, their coordinates, and the picker)
//! - An [`InventoryView`] (what the controller believes each location holds)
//! - A [`TaskQueue`] plus the current in-progress task
//! - The `running` lock flag and the `last error` status line
//! - A [`SimState`] tick counter and an [`EventLog`]
//! - The sensor and config collaborators
//!
//! Only two call paths mutate it: [`Library::step`] (one tick, see
//! `executor`) and [`Library::handle`] (one command, see `dispatch`). The
//! owner serializes them; no interior locking is used.

use crate::admission::AdmissionConfig;
use crate::collab::{KeyValueStore, MemoryStore};
use crate::command::{Command, Request};
use crate::device::Device;
use crate::error::CommandError;
use crate::event::{DEFAULT_EVENT_CAPACITY, EventLog, LibraryEvent};
use crate::inventory::{InventorySnapshot, InventoryView};
use crate::query::{LocationSnapshot, Outcome, StateSnapshot};
use crate::sim::{SimState, StateHash};
use crate::task::{Task, TaskQueue};
use crate::topology::{LayoutSpec, Topology, TopologyError};
use tracing::{info, warn};

/// Construction parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    pub layout: LayoutSpec,
    pub admission: AdmissionConfig,
    pub event_capacity: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            layout: LayoutSpec::default(),
            admission: AdmissionConfig::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

// ---------------------------------------------------------------------------
// Library
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Library {
    pub(crate) topology: Topology,
    pub(crate) inventory: InventoryView,

    /// Lock flag. `false` means locked: ticks do nothing and only
    /// lock-exempt commands are admitted.
    pub(crate) running: bool,

    /// Task being executed, outside the queue.
    pub(crate) current: Option<Task>,
    pub(crate) queue: TaskQueue,

    /// Most recent failure, or the last scan result.
    pub(crate) last_error: Option<String>,

    pub(crate) admission: AdmissionConfig,
    pub(crate) sim_state: SimState,
    pub(crate) events: EventLog,
    pub(crate) last_state_hash: u64,

    pub(crate) sensors: Box<dyn KeyValueStore>,
    pub(crate) config_store: Box<dyn KeyValueStore>,
}

impl Library {
    /// Build a library from `config`. Starts unlocked and idle, with every
    /// inventory entry unknown.
    pub fn new(config: &LibraryConfig) -> Result<Self, TopologyError> {
        let topology = Topology::build(&config.layout)?;
        let inventory = InventoryView::new(&topology);
        let mut library = Self {
            topology,
            inventory,
            running: true,
            current: None,
            queue: TaskQueue::new(),
            last_error: None,
            admission: config.admission,
            sim_state: SimState::new(),
            events: EventLog::new(config.event_capacity),
            last_state_hash: 0,
            sensors: Box::new(MemoryStore::simulated_sensors()),
            config_store: Box::new(MemoryStore::empty_config()),
        };
        library.last_state_hash = library.compute_state_hash();
        Ok(library)
    }

    /// Replace the sensor collaborator.
    pub fn with_sensors(mut self, sensors: Box<dyn KeyValueStore>) -> Self {
        self.sensors = sensors;
        self
    }

    /// Replace the configuration collaborator.
    pub fn with_config_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        self.config_store = store;
        self
    }

    // -----------------------------------------------------------------------
    // Command path
    // -----------------------------------------------------------------------

    /// Validate, admit and dispatch one request.
    pub fn handle(&mut self, request: &Request) -> Result<Outcome, CommandError> {
        let command = Command::parse(request).inspect_err(|err| {
            warn!(command = %request.name, %err, "request rejected");
        })?;
        self.submit(command)
    }

    /// Admit and dispatch an already validated command.
    pub fn submit(&mut self, command: Command) -> Result<Outcome, CommandError> {
        let name = command.name();
        self.admission
            .admit(name, self.running, self.outstanding())
            .inspect_err(|err| warn!(command = %name, %err, "command not admitted"))?;
        self.dispatch(command)
    }

    // -----------------------------------------------------------------------
    // Lock handling
    // -----------------------------------------------------------------------

    /// Lock the library and drop all pending and in-progress work.
    pub(crate) fn halt(&mut self) {
        let was_running = self.running;
        self.running = false;
        self.last_error = None;
        self.abandon_work();
        if was_running {
            info!(tick = self.sim_state.tick, "library locked");
            self.events.push(LibraryEvent::LockChanged {
                locked: true,
                tick: self.sim_state.tick,
            });
        }
    }

    pub(crate) fn unlock(&mut self) {
        if !self.running {
            self.running = true;
            info!(tick = self.sim_state.tick, "library unlocked");
            self.events.push(LibraryEvent::LockChanged {
                locked: false,
                tick: self.sim_state.tick,
            });
        }
    }

    /// Empty the queue, recording how much was discarded.
    pub(crate) fn clear_queue(&mut self) -> usize {
        let dropped = self.queue.clear();
        self.record_cleared(dropped);
        dropped
    }

    /// Drop the task in progress along with the queue. The discarded count
    /// includes the task in progress.
    pub(crate) fn abandon_work(&mut self) {
        let dropped = self.queue.clear() + usize::from(self.current.take().is_some());
        self.record_cleared(dropped);
    }

    fn record_cleared(&mut self, dropped: usize) {
        if dropped > 0 {
            self.events.push(LibraryEvent::QueueCleared {
                dropped,
                tick: self.sim_state.tick,
            });
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn inventory(&self) -> &InventoryView {
        &self.inventory
    }

    pub fn inventory_snapshot(&self) -> InventorySnapshot {
        self.inventory.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some() || !self.queue.is_empty()
    }

    pub fn state(&self) -> StateSnapshot {
        StateSnapshot {
            locked: !self.running,
            busy: self.is_busy(),
        }
    }

    pub fn current_task(&self) -> Option<Task> {
        self.current
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Current task plus everything queued behind it.
    pub fn outstanding(&self) -> usize {
        self.queue.len() + usize::from(self.current.is_some())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn tick(&self) -> u64 {
        self.sim_state.tick
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    /// One-line status plus error and current task, if any.
    pub fn info(&self) -> String {
        let (x, y) = self
            .topology
            .picker_location()
            .map(|p| (p.position().x, p.position().y))
            .unwrap_or_default();
        let running = if self.running { "True" } else { "False" };
        let mut text = format!("Running={running} X={x} Y={y}");
        if let Some(error) = &self.last_error {
            text.push_str(&format!("\n Error: {error}"));
        }
        if let Some(task) = self.current {
            let target = task.target().map_or("", |id| self.topology.name(id));
            text.push_str(&format!("\n Task {}({target})", task.verb()));
        }
        text
    }

    /// Physical layout and occupancy for renderers.
    pub fn locations(&self) -> Vec<LocationSnapshot> {
        self.topology
            .iter()
            .map(|(_, loc)| LocationSnapshot {
                name: loc.name().to_string(),
                kind: loc.kind,
                x: loc.position().x,
                y: loc.position().y,
                occupied: loc.is_occupied(),
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // State hash
    // -----------------------------------------------------------------------

    /// Hash computed at the end of the most recent tick.
    pub fn state_hash(&self) -> u64 {
        self.last_state_hash
    }

    pub(crate) fn compute_state_hash(&self) -> u64 {
        let mut hash = StateHash::new();
        hash.write_u64(self.sim_state.tick);
        hash.write_bool(self.running);
        hash.write_u64(self.outstanding() as u64);
        for (_, loc) in self.topology.iter() {
            hash.write_i32(loc.position().x);
            hash.write_i32(loc.position().y);
            match loc.scan() {
                Some(tape) => hash.write_str(tape.as_str()),
                None => hash.write_bool(false),
            }
        }
        hash.finish()
    }
}
