//! Deadline queue shared by every tick-driven system.
//!
//! Each system owns a [`Timers`] keyed by its own timer enum. Callers advance
//! the queue once per tick and then drain expired keys one at a time. While
//! draining, the queue clock sits on the deadline of the timer that just
//! fired, so timers scheduled in response are measured from the firing
//! instant rather than from the end of the tick.

use std::time::Duration;

#[derive(Clone, Debug)]
struct Entry<K> {
    key: K,
    deadline: Duration,
    sequence: u64,
}

/// Deadline queue firing keys in expiry order.
#[derive(Clone, Debug)]
pub struct Timers<K> {
    now: Duration,
    horizon: Duration,
    entries: Vec<Entry<K>>,
    next_sequence: u64,
}

impl<K> Default for Timers<K> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            horizon: Duration::ZERO,
            entries: Vec::new(),
            next_sequence: 0,
        }
    }
}

impl<K: Copy + PartialEq> Timers<K> {
    /// Creates an empty queue with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current queue clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `key` to fire after `delay`, replacing any pending entry for it.
    pub fn schedule(&mut self, key: K, delay: Duration) {
        let _ = self.cancel(key);
        let entry = Entry {
            key,
            deadline: self.now.saturating_add(delay),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.entries.push(entry);
    }

    /// Removes the pending entry for `key`, reporting whether one existed.
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.key != key);
        self.entries.len() != before
    }

    /// Reports whether `key` is waiting to fire.
    #[must_use]
    pub fn is_scheduled(&self, key: K) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    /// Time left before `key` fires, if it is scheduled.
    #[must_use]
    pub fn remaining(&self, key: K) -> Option<Duration> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.deadline.saturating_sub(self.now))
    }

    /// Extends the firing horizon by `dt`.
    ///
    /// Any undrained progress from the previous tick is settled first.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.horizon;
        self.horizon = self.horizon.saturating_add(dt);
    }

    /// Pops the earliest timer whose deadline lies within the horizon.
    ///
    /// Ties fire in scheduling order. Once nothing else is due the clock
    /// settles on the horizon and `None` is returned.
    pub fn pop_expired(&mut self) -> Option<K> {
        let position = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.deadline <= self.horizon)
            .min_by_key(|(_, entry)| (entry.deadline, entry.sequence))
            .map(|(index, _)| index);

        match position {
            Some(index) => {
                let entry = self.entries.remove(index);
                self.now = self.now.max(entry.deadline);
                Some(entry.key)
            }
            None => {
                self.now = self.horizon;
                None
            }
        }
    }

    /// Drops every pending entry without firing it and rewinds the clock.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.now = Duration::ZERO;
        self.horizon = Duration::ZERO;
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no entries are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Key {
        A,
        B,
        C,
    }

    fn drain(timers: &mut Timers<Key>) -> Vec<Key> {
        let mut fired = Vec::new();
        while let Some(key) = timers.pop_expired() {
            fired.push(key);
        }
        fired
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut timers = Timers::new();
        timers.schedule(Key::A, Duration::from_millis(300));
        timers.schedule(Key::B, Duration::from_millis(100));
        timers.schedule(Key::C, Duration::from_millis(200));

        timers.advance(Duration::from_millis(500));
        assert_eq!(drain(&mut timers), vec![Key::B, Key::C, Key::A]);
        assert_eq!(timers.now(), Duration::from_millis(500));
    }

    #[test]
    fn equal_deadlines_fire_in_scheduling_order() {
        let mut timers = Timers::new();
        timers.schedule(Key::C, Duration::from_millis(100));
        timers.schedule(Key::A, Duration::from_millis(100));

        timers.advance(Duration::from_millis(100));
        assert_eq!(drain(&mut timers), vec![Key::C, Key::A]);
    }

    #[test]
    fn follow_up_timers_are_relative_to_firing_instant() {
        let mut timers = Timers::new();
        timers.schedule(Key::A, Duration::from_millis(100));
        timers.advance(Duration::from_millis(1_000));

        assert_eq!(timers.pop_expired(), Some(Key::A));
        timers.schedule(Key::B, Duration::from_millis(100));
        assert_eq!(timers.pop_expired(), Some(Key::B));
        assert_eq!(timers.now(), Duration::from_millis(200));
        assert_eq!(timers.pop_expired(), None);
        assert_eq!(timers.now(), Duration::from_millis(1_000));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut timers = Timers::new();
        timers.schedule(Key::A, Duration::from_secs(1));
        assert!(timers.cancel(Key::A));
        assert!(!timers.cancel(Key::A));

        timers.advance(Duration::from_secs(2));
        assert_eq!(timers.pop_expired(), None);
    }

    #[test]
    fn clear_drops_entries_and_rewinds() {
        let mut timers = Timers::new();
        timers.schedule(Key::A, Duration::from_secs(1));
        timers.advance(Duration::from_millis(500));
        assert_eq!(timers.pop_expired(), None);
        assert!(timers.is_scheduled(Key::A));

        timers.clear();
        assert!(!timers.is_scheduled(Key::A));
        assert!(timers.is_empty());
        assert_eq!(timers.now(), Duration::ZERO);

        timers.schedule(Key::B, Duration::from_secs(1));
        timers.advance(Duration::from_millis(900));
        assert_eq!(timers.pop_expired(), None);
        assert_eq!(timers.remaining(Key::B), Some(Duration::from_millis(100)));
    }

    #[test]
    fn cancel_after_fire_is_a_no_op() {
        let mut timers = Timers::new();
        timers.schedule(Key::A, Duration::from_secs(1));
        timers.advance(Duration::from_secs(1));
        assert_eq!(timers.pop_expired(), Some(Key::A));
        assert!(!timers.cancel(Key::A));
        assert_eq!(timers.pop_expired(), None);
    }

    #[test]
    fn rescheduling_replaces_pending_entry() {
        let mut timers = Timers::new();
        timers.schedule(Key::A, Duration::from_secs(1));
        timers.schedule(Key::A, Duration::from_secs(3));
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.remaining(Key::A), Some(Duration::from_secs(3)));

        timers.advance(Duration::from_secs(2));
        assert_eq!(timers.pop_expired(), None);
        assert_eq!(timers.remaining(Key::A), Some(Duration::from_secs(1)));
    }

    #[test]
    fn undrained_ticks_do_not_lose_time() {
        let mut timers = Timers::new();
        timers.schedule(Key::A, Duration::from_millis(150));
        timers.advance(Duration::from_millis(100));
        timers.advance(Duration::from_millis(100));
        assert_eq!(timers.pop_expired(), Some(Key::A));
    }
}
