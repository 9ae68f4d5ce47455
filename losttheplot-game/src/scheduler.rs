//! Single-threaded deferred actions polled once per frame.
//!
//! Entries fire in `(fire_at, sequence)` order, so two actions scheduled for
//! the same instant run in the order they were scheduled. Nothing can be
//! cancelled once queued.
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

/// Work the game performs later, on the frame that reaches its fire time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Nudge the camera by a fresh random offset.
    ShakeStep,
    /// Return the camera to rest after a shake sequence.
    ShakeSettle,
    /// Build the next level.
    AdvanceLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    fire_at: Duration,
    sequence: u64,
    action: Deferred,
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fire_at
            .cmp(&other.fire_at)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    queue: BinaryHeap<Reverse<Entry>>,
    next_sequence: u64,
}

impl TickScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire on the first poll at or after `fire_at`.
    pub fn schedule(&mut self, fire_at: Duration, action: Deferred) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.queue.push(Reverse(Entry {
            fire_at,
            sequence,
            action,
        }));
    }

    /// Remove and return every action due at `now`, earliest first.
    pub fn drain_due(&mut self, now: Duration) -> Vec<Deferred> {
        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.queue.peek() {
            if entry.fire_at > now {
                break;
            }
            if let Some(Reverse(entry)) = self.queue.pop() {
                log::trace!("scheduler | firing {:?} at {:?}", entry.action, now);
                due.push(entry.action);
            }
        }
        due
    }

    #[must_use]
    pub fn is_pending(&self, action: Deferred) -> bool {
        self.queue.iter().any(|Reverse(entry)| entry.action == action)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Fire time of the earliest queued action.
    #[must_use]
    pub fn next_fire_at(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(entry)| entry.fire_at)
    }
}
