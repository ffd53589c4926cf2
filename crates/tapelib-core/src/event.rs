//! Library events recorded in a fixed-capacity ring buffer.
//!
//! The executor and the command path push events as they happen; observers
//! read them with [`EventLog::iter`] or take them with [`EventLog::drain`].
//! When the buffer is full the oldest event is dropped.

use crate::command::CommandName;
use crate::task::Verb;
use serde::Serialize;

/// Default number of events retained.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Something that happened in the library. All events carry the tick at
/// which they occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LibraryEvent {
    CommandAccepted {
        command: CommandName,
        tasks: usize,
        tick: u64,
    },
    TaskStarted {
        verb: Verb,
        target: Option<String>,
        tick: u64,
    },
    TaskCompleted {
        verb: Verb,
        target: Option<String>,
        tick: u64,
    },
    TaskFailed {
        verb: Verb,
        target: Option<String>,
        error: String,
        tick: u64,
    },
    QueueCleared {
        dropped: usize,
        tick: u64,
    },
    LockChanged {
        locked: bool,
        tick: u64,
    },
}

impl LibraryEvent {
    pub fn tick(&self) -> u64 {
        match *self {
            LibraryEvent::CommandAccepted { tick, .. }
            | LibraryEvent::TaskStarted { tick, .. }
            | LibraryEvent::TaskCompleted { tick, .. }
            | LibraryEvent::TaskFailed { tick, .. }
            | LibraryEvent::QueueCleared { tick, .. }
            | LibraryEvent::LockChanged { tick, .. } => tick,
        }
    }
}

// ---------------------------------------------------------------------------
// EventLog — pre-allocated ring buffer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EventLog {
    /// Pre-allocated storage.
    events: Vec<Option<LibraryEvent>>,
    /// Write position (wraps around).
    head: usize,
    /// Number of events currently stored.
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
    /// Events overwritten before anyone read them.
    dropped: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventLog {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: LibraryEvent) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        } else {
            self.dropped += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Number of events that were dropped because the buffer was full.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &LibraryEvent> + '_ {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head is the next write position, i.e. the oldest entry
            self.head
        };
        let capacity = self.capacity();
        (0..self.len).filter_map(move |i| self.events[(start + i) % capacity].as_ref())
    }

    /// Take every stored event, oldest first, leaving the log empty.
    pub fn drain(&mut self) -> Vec<LibraryEvent> {
        let drained: Vec<LibraryEvent> = self.iter().cloned().collect();
        self.clear();
        drained
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleared(tick: u64) -> LibraryEvent {
        LibraryEvent::QueueCleared { dropped: 0, tick }
    }

    #[test]
    fn push_and_iterate_in_order() {
        let mut log = EventLog::new(4);
        log.push(cleared(1));
        log.push(cleared(2));
        let ticks: Vec<u64> = log.iter().map(LibraryEvent::tick).collect();
        assert_eq!(ticks, vec![1, 2]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut log = EventLog::new(3);
        for tick in 1..=5 {
            log.push(cleared(tick));
        }
        let ticks: Vec<u64> = log.iter().map(LibraryEvent::tick).collect();
        assert_eq!(ticks, vec![3, 4, 5]);
        assert_eq!(log.total_written(), 5);
        assert_eq!(log.dropped_count(), 2);
    }

    #[test]
    fn zero_capacity_clamped() {
        let mut log = EventLog::new(0);
        assert_eq!(log.capacity(), 1);
        log.push(cleared(1));
        log.push(cleared(2));
        assert_eq!(log.iter().map(LibraryEvent::tick).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn drain_empties_the_log() {
        let mut log = EventLog::new(3);
        for tick in 1..=4 {
            log.push(cleared(tick));
        }
        let drained = log.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0].tick(), 2);
        assert!(log.is_empty());
        log.push(cleared(9));
        assert_eq!(log.iter().next().map(LibraryEvent::tick), Some(9));
    }

    #[test]
    fn events_serialize_with_tag() {
        let event = LibraryEvent::LockChanged { locked: true, tick: 7 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "lock_changed");
        assert_eq!(json["locked"], true);
        assert_eq!(json["tick"], 7);
    }
}
