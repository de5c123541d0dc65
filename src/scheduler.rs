//! Delayed alarms
//!
//! The quiz never sleeps. Anything that should happen later (advancing
//! after a correct answer, flashing the answer, the timer tick) is handed
//! to a [`Scheduler`] as an [`Alarm`]; the host fires it back into
//! [`Game::receive_alarm`](crate::game::Game::receive_alarm) when it is due.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::Alarm;

/// Identifies a scheduled alarm so that it can be cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskHandle(pub u64);

/// Trait for scheduling alarms
///
/// Browser hosts back this with `setTimeout`/`clearTimeout`; tests and
/// polling hosts use [`ManualScheduler`].
pub trait Scheduler {
    /// Schedules `alarm` to fire after `delay`
    fn schedule(&mut self, alarm: Alarm, delay: Duration) -> TaskHandle;

    /// Cancels a scheduled alarm
    ///
    /// Cancelling an alarm that already fired or was already cancelled is a
    /// no-op.
    fn cancel(&mut self, handle: TaskHandle);
}

/// Deterministic scheduler driven by a virtual clock
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Alarm>,
}

impl ManualScheduler {
    /// Creates a scheduler at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of alarms waiting to fire
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether an alarm equal to `alarm` is waiting
    pub fn is_scheduled(&self, alarm: &Alarm) -> bool {
        self.queue.values().any(|queued| queued == alarm)
    }

    /// Pops the earliest alarm due at or before `until`
    ///
    /// The clock moves to the alarm's due time, so alarms scheduled while
    /// handling it are timed from there.
    pub fn pop_due(&mut self, until: Duration) -> Option<Alarm> {
        let (&(due, id), _) = self.queue.first_key_value()?;
        if due > until {
            return None;
        }
        self.now = self.now.max(due);
        self.queue.remove(&(due, id))
    }

    /// Moves the clock forward without firing anything
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, alarm: Alarm, delay: Duration) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.insert((self.now + delay, id), alarm);
        TaskHandle(id)
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.queue.retain(|(_, id), _| *id != handle.0);
    }
}
