use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled one-shot timer. Used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Deterministic one-shot deferred-callback scheduler.
///
/// Timers are keyed by `(due, sequence)` so that events with the same due time
/// come out in the order they were scheduled. The owner drains due events with
/// [`Timeline::pop_due`] once per frame; anything scheduled while draining that
/// is already due comes out of the same drain loop.
#[derive(Debug, Clone)]
pub struct Timeline<E> {
    queue: BTreeMap<(Duration, u64), E>,
    next_seq: u64,
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self {
            queue: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<E> Timeline<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to become due `delay` after `now`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, event: E) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((now + delay, seq), event);
        TimerId(seq)
    }

    /// Cancel a pending timer. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.queue.keys().find(|(_, seq)| *seq == id.0).copied();
        match key {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Drop every pending timer. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.queue.len();
        self.queue.clear();
        n
    }

    /// Remove and return the earliest event due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, E)> {
        let (&(due, seq), _) = self.queue.first_key_value()?;
        if due > now {
            return None;
        }
        self.queue.remove(&(due, seq)).map(|event| (due, event))
    }

    /// Due time of the earliest pending event.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn nothing_due_before_delay() {
        let mut tl = Timeline::new();
        tl.schedule(ms(0), ms(100), "a");
        assert!(tl.pop_due(ms(99)).is_none());
        assert_eq!(tl.pop_due(ms(100)), Some((ms(100), "a")));
        assert!(tl.is_empty());
    }

    #[test]
    fn events_come_out_in_due_order() {
        let mut tl = Timeline::new();
        tl.schedule(ms(0), ms(300), 3);
        tl.schedule(ms(0), ms(100), 1);
        tl.schedule(ms(0), ms(200), 2);
        let mut out = Vec::new();
        while let Some((_, e)) = tl.pop_due(ms(1000)) {
            out.push(e);
        }
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn ties_keep_scheduling_order() {
        let mut tl = Timeline::new();
        tl.schedule(ms(0), ms(50), "first");
        tl.schedule(ms(0), ms(50), "second");
        assert_eq!(tl.pop_due(ms(50)).map(|(_, e)| e), Some("first"));
        assert_eq!(tl.pop_due(ms(50)).map(|(_, e)| e), Some("second"));
    }

    #[test]
    fn cancel_removes_only_that_timer() {
        let mut tl = Timeline::new();
        let a = tl.schedule(ms(0), ms(10), 'a');
        tl.schedule(ms(0), ms(20), 'b');
        assert!(tl.cancel(a));
        assert!(!tl.cancel(a));
        assert_eq!(tl.pending(), 1);
        assert_eq!(tl.pop_due(ms(100)).map(|(_, e)| e), Some('b'));
    }

    #[test]
    fn zero_delay_rescheduled_while_draining_fires_same_loop() {
        let mut tl = Timeline::new();
        tl.schedule(ms(0), ms(10), 0u32);
        let mut seen = Vec::new();
        while let Some((due, e)) = tl.pop_due(ms(10)) {
            seen.push(e);
            if e < 2 {
                tl.schedule(due, Duration::ZERO, e + 1);
            }
        }
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn cancel_all_clears() {
        let mut tl = Timeline::new();
        tl.schedule(ms(0), ms(1), ());
        tl.schedule(ms(0), ms(2), ());
        assert_eq!(tl.cancel_all(), 2);
        assert_eq!(tl.next_due(), None);
    }
}
