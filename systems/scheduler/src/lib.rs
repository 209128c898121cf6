#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic timer scheduler driven by a simulated clock.
//!
//! Hosts advance the clock explicitly and then drain due timers one at a time
//! with [`Scheduler::poll`]. Because timers are handed out lazily, a timer
//! cancelled while handling an earlier firing of the same advance never fires.

use std::time::Duration;

use tracing::trace;

/// Shortest period a repeating timer may use.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Cancellable reference to a scheduled timer.
///
/// Handles are never reused, so a stale handle cannot cancel a newer timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Timer that came due during the current advance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fired<K> {
    /// Handle of the timer that fired.
    pub handle: TimerHandle,
    /// Key the timer was scheduled with.
    pub key: K,
    /// Simulated time at which the timer fired.
    pub at: Duration,
}

#[derive(Clone, Debug)]
struct Entry<K> {
    handle: TimerHandle,
    due: Duration,
    period: Option<Duration>,
    order: u64,
    key: K,
}

/// One-shot and repeating timers keyed by `K`.
#[derive(Clone, Debug)]
pub struct Scheduler<K> {
    now: Duration,
    horizon: Duration,
    next_handle: u64,
    next_order: u64,
    entries: Vec<Entry<K>>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            horizon: Duration::ZERO,
            next_handle: 0,
            next_order: 0,
            entries: Vec::new(),
        }
    }
}

impl<K: Clone> Scheduler<K> {
    /// Creates an empty scheduler positioned at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the timer behind `handle` is still armed.
    #[must_use]
    pub fn is_armed(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    /// Arms a timer that fires once, `delay` after the current time.
    pub fn schedule_once(&mut self, delay: Duration, key: K) -> TimerHandle {
        self.arm(delay, None, key)
    }

    /// Arms a timer that fires every `period`, starting one period from now.
    ///
    /// Periods shorter than [`MIN_PERIOD`] are raised to it.
    pub fn schedule_repeating(&mut self, period: Duration, key: K) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        self.arm(period, Some(period), key)
    }

    /// Disarms the timer. Returns `false` when it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        let cancelled = self.entries.len() != before;
        if cancelled {
            trace!(handle = handle.get(), "timer cancelled");
        }
        cancelled
    }

    /// Moves the horizon `dt` into the future. Due timers are drained with [`poll`](Self::poll).
    pub fn advance(&mut self, dt: Duration) {
        self.horizon = self.horizon.max(self.now) + dt;
    }

    /// Returns the earliest timer due before the horizon, moving the clock to it.
    ///
    /// Timers due at the same instant fire in the order they were armed.
    /// Repeating timers are re-armed before they are returned. Once nothing
    /// else is due the clock settles on the horizon and `None` is returned.
    pub fn poll(&mut self) -> Option<Fired<K>> {
        let horizon = self.horizon;
        let Some(index) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= horizon)
            .min_by_key(|(_, entry)| (entry.due, entry.order))
            .map(|(index, _)| index)
        else {
            self.now = self.now.max(horizon);
            return None;
        };

        let due = self.entries[index].due;
        let period = self.entries[index].period;
        self.now = due;
        let fired = match period {
            Some(period) => {
                let order = self.take_order();
                let entry = &mut self.entries[index];
                entry.due = due + period;
                entry.order = order;
                Fired {
                    handle: entry.handle,
                    key: entry.key.clone(),
                    at: due,
                }
            }
            None => {
                let entry = self.entries.remove(index);
                Fired {
                    handle: entry.handle,
                    key: entry.key,
                    at: due,
                }
            }
        };

        trace!(handle = fired.handle.get(), at = ?fired.at, "timer fired");
        Some(fired)
    }

    fn arm(&mut self, delay: Duration, period: Option<Duration>, key: K) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        let order = self.take_order();
        self.entries.push(Entry {
            handle,
            due: self.now + delay,
            period,
            order,
            key,
        });
        handle
    }

    fn take_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }
}
