//! Primitive picker motions and the FIFO they wait in.
//!
//! Tasks are produced in whole batches by the command dispatcher and
//! consumed one at a time by the executor. A batch is appended atomically:
//! either every task of a command lands in the queue, in order, or none do.

use crate::id::LocationId;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// One primitive motion of the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Drive the picker toward a location, one unit per tick.
    Goto(LocationId),
    /// Take the tape out of a location into the picker.
    Eject(LocationId),
    /// Put the picker's tape into a location.
    Enter(LocationId),
    /// Read the barcode at a location.
    Scan(LocationId),
    /// Halt the library: lock it and drop all pending work.
    Stop,
}

/// Discriminant of a [`Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Goto,
    Eject,
    Enter,
    Scan,
    Stop,
}

impl Task {
    pub fn verb(&self) -> Verb {
        match self {
            Task::Goto(_) => Verb::Goto,
            Task::Eject(_) => Verb::Eject,
            Task::Enter(_) => Verb::Enter,
            Task::Scan(_) => Verb::Scan,
            Task::Stop => Verb::Stop,
        }
    }

    /// The location the task acts on. `Stop` has none.
    pub fn target(&self) -> Option<LocationId> {
        match *self {
            Task::Goto(id) | Task::Eject(id) | Task::Enter(id) | Task::Scan(id) => Some(id),
            Task::Stop => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verb::Goto => "goto",
            Verb::Eject => "eject",
            Verb::Enter => "enter",
            Verb::Scan => "scan",
            Verb::Stop => "stop",
        })
    }
}

/// Standard four-step tape move: fetch from `from`, deliver to `to`.
pub fn move_plan(from: LocationId, to: LocationId) -> [Task; 4] {
    [Task::Goto(from), Task::Eject(from), Task::Goto(to), Task::Enter(to)]
}

// ---------------------------------------------------------------------------
// TaskQueue
// ---------------------------------------------------------------------------

/// Pending tasks in submission order.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    pending: VecDeque<Task>,
    /// Total tasks ever accepted.
    total_pushed: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append all tasks of one command, in order.
    pub fn push_batch(&mut self, tasks: impl IntoIterator<Item = Task>) {
        let before = self.pending.len();
        self.pending.extend(tasks);
        self.total_pushed += (self.pending.len() - before) as u64;
    }

    pub fn pop_front(&mut self) -> Option<Task> {
        self.pending.pop_front()
    }

    /// Drop every pending task. Returns how many were discarded.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.pending.iter()
    }

    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn two_ids() -> (LocationId, LocationId) {
        let mut sm = SlotMap::<LocationId, ()>::with_key();
        (sm.insert(()), sm.insert(()))
    }

    #[test]
    fn new_queue_is_empty() {
        let queue = TaskQueue::new();
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
        assert_eq!(queue.total_pushed(), 0);
    }

    #[test]
    fn batch_preserves_order() {
        let (a, b) = two_ids();
        let mut queue = TaskQueue::new();
        queue.push_batch(move_plan(a, b));

        assert_eq!(queue.len(), 4);
        assert_eq!(queue.pop_front(), Some(Task::Goto(a)));
        assert_eq!(queue.pop_front(), Some(Task::Eject(a)));
        assert_eq!(queue.pop_front(), Some(Task::Goto(b)));
        assert_eq!(queue.pop_front(), Some(Task::Enter(b)));
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn batches_are_fifo_across_commands() {
        let (a, b) = two_ids();
        let mut queue = TaskQueue::new();
        queue.push_batch([Task::Goto(a), Task::Scan(a)]);
        queue.push_batch([Task::Goto(b), Task::Stop]);

        let verbs: Vec<Verb> = queue.iter().map(Task::verb).collect();
        assert_eq!(verbs, vec![Verb::Goto, Verb::Scan, Verb::Goto, Verb::Stop]);
        assert_eq!(queue.iter().next(), Some(&Task::Goto(a)));
    }

    #[test]
    fn clear_reports_dropped_count() {
        let (a, b) = two_ids();
        let mut queue = TaskQueue::new();
        queue.push_batch(move_plan(a, b));
        assert_eq!(queue.clear(), 4);
        assert!(queue.is_empty());
        assert_eq!(queue.total_pushed(), 4);
    }

    #[test]
    fn stop_has_no_target() {
        let (a, _) = two_ids();
        assert_eq!(Task::Stop.target(), None);
        assert_eq!(Task::Scan(a).target(), Some(a));
        assert_eq!(Task::Stop.verb().to_string(), "stop");
    }
}
