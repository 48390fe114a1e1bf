//! Per-purpose, single-slot, cancellable timers.
//!
//! Each key owns at most one pending deadline. Arming a key replaces its
//! previous deadline, so only the latest-armed instance can ever fire
//! (latest-wins debounce). Time is supplied by the caller; nothing here
//! reads a clock.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Deadline {
    at: f64,
    serial: u64,
}

/// Set of restartable timers keyed by purpose.
#[derive(Debug, Clone)]
pub struct TimerSlots<K> {
    slots: HashMap<K, Deadline>,
    next_serial: u64,
}

impl<K> Default for TimerSlots<K> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            next_serial: 0,
        }
    }
}

impl<K: Copy + Eq + Hash> TimerSlots<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to fire at `at`, replacing any pending deadline for it.
    pub fn arm(&mut self, key: K, at: f64) {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.slots.insert(key, Deadline { at, serial });
    }

    /// Cancel `key`. Returns whether a deadline was pending.
    pub fn cancel(&mut self, key: K) -> bool {
        self.slots.remove(&key).is_some()
    }

    /// Cancel every pending timer.
    pub fn cancel_all(&mut self) {
        self.slots.clear();
    }

    #[must_use]
    pub fn is_armed(&self, key: K) -> bool {
        self.slots.contains_key(&key)
    }

    /// Pending deadline of `key`.
    #[must_use]
    pub fn deadline(&self, key: K) -> Option<f64> {
        self.slots.get(&key).map(|d| d.at)
    }

    /// Earliest pending deadline over all keys.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        self.slots.values().map(|d| d.at).reduce(f64::min)
    }

    /// Remove and return the earliest timer due at or before `now`,
    /// together with its deadline.
    ///
    /// Timers with equal deadlines fire in the order they were armed.
    pub fn pop_due(&mut self, now: f64) -> Option<(K, f64)> {
        let (key, deadline) = self
            .slots
            .iter()
            .filter(|(_, d)| d.at <= now)
            .min_by(|(_, a), (_, b)| a.at.total_cmp(&b.at).then(a.serial.cmp(&b.serial)))
            .map(|(k, d)| (*k, *d))?;

        self.slots.remove(&key);
        Some((key, deadline.at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        A,
        B,
    }

    #[test]
    fn test_rearm_replaces_deadline() {
        let mut timers = TimerSlots::new();
        timers.arm(Key::A, 1.0);
        timers.arm(Key::A, 3.0);

        assert_eq!(timers.pop_due(2.0), None);
        assert_eq!(timers.pop_due(3.0), Some((Key::A, 3.0)));
        assert_eq!(timers.pop_due(10.0), None);
    }

    #[test]
    fn test_cancel() {
        let mut timers = TimerSlots::new();
        timers.arm(Key::A, 1.0);
        assert!(timers.cancel(Key::A));
        assert!(!timers.cancel(Key::A));
        assert_eq!(timers.pop_due(5.0), None);
    }

    #[test]
    fn test_due_order() {
        let mut timers = TimerSlots::new();
        timers.arm(Key::B, 2.0);
        timers.arm(Key::A, 1.0);

        assert_eq!(timers.next_deadline(), Some(1.0));
        assert_eq!(timers.pop_due(5.0), Some((Key::A, 1.0)));
        assert_eq!(timers.pop_due(5.0), Some((Key::B, 2.0)));
    }

    #[test]
    fn test_equal_deadlines_fire_in_arm_order() {
        let mut timers = TimerSlots::new();
        timers.arm(Key::B, 1.0);
        timers.arm(Key::A, 1.0);

        assert_eq!(timers.pop_due(1.0).map(|(k, _)| k), Some(Key::B));
        assert_eq!(timers.pop_due(1.0).map(|(k, _)| k), Some(Key::A));
    }
}
