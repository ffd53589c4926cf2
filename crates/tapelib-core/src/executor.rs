//! Per-tick execution of the task queue.
//!
//! Each call to [`Library::step`] is one tick and does exactly one of:
//!
//! 1. **Idle** -- no current task and nothing queued: nothing happens.
//! 2. **Dequeue** -- no current task: pop the front of the queue into the
//!    current-task slot.
//! 3. **Execute** -- apply one step of the current task. Multi-tick tasks
//!    (`goto`) stay current until they report done.
//!
//! A locked library, or one without a picker, skips the tick entirely.
//!
//! A tape move that fails (empty source, occupied destination) records the
//! error, drops the current task and clears the whole queue, including
//! work queued by unrelated commands.

use crate::device::{Device, DeviceError};
use crate::event::LibraryEvent;
use crate::id::LocationId;
use crate::inventory::SlotState;
use crate::library::Library;
use crate::task::{Task, Verb};
use crate::topology::LocationKind;
use tracing::{debug, error, warn};

/// Outcome of one verb step.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StepResult {
    /// Needs more ticks.
    Pending,
    Done,
    Failed(DeviceError),
}

/// What a tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickReport {
    /// Locked, or no picker.
    Skipped,
    Idle,
    Dequeued(Verb),
    InProgress(Verb),
    Completed(Verb),
    Failed { verb: Verb, error: DeviceError },
}

impl Library {
    /// Advance the simulation by one tick.
    pub fn step(&mut self) -> TickReport {
        if !self.running || self.topology.picker().is_none() {
            return TickReport::Skipped;
        }

        let report = match self.current.take() {
            None => match self.queue.pop_front() {
                None => TickReport::Idle,
                Some(task) => {
                    self.current = Some(task);
                    self.events.push(LibraryEvent::TaskStarted {
                        verb: task.verb(),
                        target: self.target_name(task),
                        tick: self.sim_state.tick,
                    });
                    TickReport::Dequeued(task.verb())
                }
            },
            Some(task) => self.execute(task),
        };

        self.sim_state.tick += 1;
        self.last_state_hash = self.compute_state_hash();
        report
    }

    /// Run `ticks` steps. Returns how many were not skipped.
    pub fn advance(&mut self, ticks: u64) -> u64 {
        let mut ran = 0;
        for _ in 0..ticks {
            if self.step() != TickReport::Skipped {
                ran += 1;
            }
        }
        ran
    }

    fn execute(&mut self, task: Task) -> TickReport {
        let verb = task.verb();
        let result = match task {
            Task::Goto(target) => self.step_goto(target),
            Task::Eject(target) => self.step_eject(target),
            Task::Enter(target) => self.step_enter(target),
            Task::Scan(target) => self.step_scan(target),
            Task::Stop => self.step_stop(),
        };

        match result {
            StepResult::Pending => {
                self.current = Some(task);
                TickReport::InProgress(verb)
            }
            StepResult::Done => {
                debug!(tick = self.sim_state.tick, %verb, location = ?self.target_name(task), "task done");
                self.events.push(LibraryEvent::TaskCompleted {
                    verb,
                    target: self.target_name(task),
                    tick: self.sim_state.tick,
                });
                TickReport::Completed(verb)
            }
            StepResult::Failed(err) => {
                error!(tick = self.sim_state.tick, %verb, %err, "task failed, aborting queue");
                self.last_error = Some(err.to_string());
                self.events.push(LibraryEvent::TaskFailed {
                    verb,
                    target: self.target_name(task),
                    error: err.to_string(),
                    tick: self.sim_state.tick,
                });
                self.clear_queue();
                TickReport::Failed { verb, error: err }
            }
        }
    }

    fn target_name(&self, task: Task) -> Option<String> {
        task.target().map(|id| self.topology.name(id).to_string())
    }

    // -----------------------------------------------------------------------
    // Verb steps
    // -----------------------------------------------------------------------

    fn step_goto(&mut self, target: LocationId) -> StepResult {
        let bounds = self.topology.bounds();
        let Some(destination) = self.topology.get(target).map(|l| l.position()) else {
            warn!(location = ?target, "goto target vanished, dropping task");
            return StepResult::Done;
        };
        let Some(picker) = self.topology.picker().and_then(|id| self.topology.get_mut(id)) else {
            return StepResult::Done;
        };

        if picker.position == destination {
            return StepResult::Done;
        }
        picker.position = bounds.clamp(picker.position.step_toward(destination));
        StepResult::Pending
    }

    /// Location to picker.
    fn step_eject(&mut self, target: LocationId) -> StepResult {
        let Some(picker) = self.topology.picker() else {
            return StepResult::Done;
        };
        match self.topology.move_tape(target, picker) {
            Ok(tape) => {
                self.record(target, SlotState::Empty);
                self.record(picker, SlotState::Occupied(tape));
                StepResult::Done
            }
            Err(err) => StepResult::Failed(err),
        }
    }

    /// Picker to location.
    fn step_enter(&mut self, target: LocationId) -> StepResult {
        let Some(picker) = self.topology.picker() else {
            return StepResult::Done;
        };
        match self.topology.move_tape(picker, target) {
            Ok(tape) => {
                self.record(picker, SlotState::Empty);
                self.record(target, SlotState::Occupied(tape));
                StepResult::Done
            }
            Err(err) => StepResult::Failed(err),
        }
    }

    fn step_scan(&mut self, target: LocationId) -> StepResult {
        let Some(location) = self.topology.get(target) else {
            return StepResult::Done;
        };
        let state = SlotState::from_scan(location.scan());
        let status = format!(
            "device {} has tape {}",
            location.name(),
            location.scan().map_or("none", |t| t.as_str())
        );
        self.record(target, state);
        self.last_error = Some(status);
        StepResult::Done
    }

    fn step_stop(&mut self) -> StepResult {
        self.halt();
        StepResult::Done
    }

    fn record(&mut self, id: LocationId, state: SlotState) {
        let Some(location) = self.topology.get(id) else {
            return;
        };
        let kind: LocationKind = location.kind;
        let name = location.name().to_string();
        self.inventory.record(kind, &name, state);
    }
}
