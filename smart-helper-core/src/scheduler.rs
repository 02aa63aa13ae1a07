//! Virtual-time scheduler
//!
//! Each console owns one [`Scheduler`] holding its named periodic and
//! one-shot timers. Time only moves when the owner advances it, so tests step
//! through minutes of simulated activity instantly and deterministically,
//! while the session runtime advances it from the tokio clock.
//!
//! Timers are keyed by a task value: scheduling a task that is already
//! pending replaces it, and dropping the scheduler releases every timer.

use std::time::Duration;

/// Smallest period accepted for a repeating timer
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
struct Timer<T> {
    task: T,
    due: Duration,
    period: Option<Duration>,
    /// Registration order, used to break ties between timers due together
    seq: u64,
}

/// Named timers over a virtual clock that starts at zero
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    timers: Vec<Timer<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            timers: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T: Clone + PartialEq> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `task` every `period`, first at `now + period`
    pub fn every(&mut self, task: T, period: Duration) {
        let period = period.max(MIN_PERIOD);
        self.insert(task, self.now + period, Some(period));
    }

    /// Fire `task` once at `now + delay`
    pub fn after(&mut self, task: T, delay: Duration) {
        self.insert(task, self.now + delay, None);
    }

    fn insert(&mut self, task: T, due: Duration, period: Option<Duration>) {
        self.cancel(&task);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            task,
            due,
            period,
            seq,
        });
    }

    /// Remove a pending timer. Returns whether one was pending.
    pub fn cancel(&mut self, task: &T) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| &t.task != task);
        self.timers.len() != before
    }

    /// Remove every timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn is_scheduled(&self, task: &T) -> bool {
        self.timers.iter().any(|t| &t.task == task)
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// When the next timer fires, if any
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Pop the earliest timer due at or before `until`.
    ///
    /// The clock moves to the timer's due time and repeating timers are
    /// re-armed one period later. Call repeatedly until `None`, then
    /// [`Scheduler::settle`] to move the clock to `until`. Timers scheduled
    /// between calls take part in the same pass.
    pub fn pop_due(&mut self, until: Duration) -> Option<(Duration, T)> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;

        let due = self.timers[index].due;
        if due > self.now {
            self.now = due;
        }

        let task = match self.timers[index].period {
            Some(period) => {
                let timer = &mut self.timers[index];
                timer.due += period;
                timer.task.clone()
            }
            None => self.timers.swap_remove(index).task,
        };

        Some((due, task))
    }

    /// Move the clock forward to `until` once no timer is due before it
    pub fn settle(&mut self, until: Duration) {
        if until > self.now {
            self.now = until;
        }
    }

    /// Fire everything due up to `until`, in order, and move the clock there
    pub fn advance_to(&mut self, until: Duration) -> Vec<(Duration, T)> {
        let mut fired = Vec::new();
        while let Some(firing) = self.pop_due(until) {
            fired.push(firing);
        }
        self.settle(until);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Task {
        Fast,
        Slow,
        Once(u32),
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_periodic_fires_each_period() {
        let mut scheduler = Scheduler::new();
        scheduler.every(Task::Fast, secs(10));

        let fired = scheduler.advance_to(secs(35));
        assert_eq!(
            fired,
            vec![(secs(10), Task::Fast), (secs(20), Task::Fast), (secs(30), Task::Fast)]
        );
        assert_eq!(scheduler.now(), secs(35));
        assert_eq!(scheduler.next_due(), Some(secs(40)));
    }

    #[test]
    fn test_firings_interleave_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.every(Task::Slow, secs(15));
        scheduler.every(Task::Fast, secs(10));
        scheduler.after(Task::Once(1), secs(12));

        let fired: Vec<Task> = scheduler
            .advance_to(secs(30))
            .into_iter()
            .map(|(_, task)| task)
            .collect();

        // At 30s both repeating timers are due; registration order breaks the tie
        assert_eq!(
            fired,
            vec![Task::Fast, Task::Once(1), Task::Slow, Task::Fast, Task::Slow, Task::Fast]
        );
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut scheduler = Scheduler::new();
        scheduler.after(Task::Once(7), secs(3));

        assert!(scheduler.advance_to(secs(2)).is_empty());
        assert_eq!(scheduler.advance_to(secs(3)), vec![(secs(3), Task::Once(7))]);
        assert!(scheduler.advance_to(secs(100)).is_empty());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel_and_replace() {
        let mut scheduler = Scheduler::new();
        scheduler.after(Task::Once(1), secs(5));
        scheduler.after(Task::Once(2), secs(5));
        assert!(scheduler.cancel(&Task::Once(1)));
        assert!(!scheduler.cancel(&Task::Once(1)));

        // Rescheduling replaces rather than duplicates
        scheduler.after(Task::Once(2), secs(8));
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.advance_to(secs(10)), vec![(secs(8), Task::Once(2))]);
    }

    #[test]
    fn test_timers_added_mid_pass_can_fire() {
        let mut scheduler = Scheduler::new();
        scheduler.after(Task::Once(1), secs(1));

        let mut fired = Vec::new();
        while let Some((at, task)) = scheduler.pop_due(secs(10)) {
            if task == Task::Once(1) {
                // Relative to the firing time, not the pass target
                scheduler.after(Task::Once(2), secs(2));
            }
            fired.push((at, task));
        }
        scheduler.settle(secs(10));

        assert_eq!(fired, vec![(secs(1), Task::Once(1)), (secs(3), Task::Once(2))]);
        assert_eq!(scheduler.now(), secs(10));
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let mut scheduler = Scheduler::new();
        scheduler.every(Task::Fast, Duration::ZERO);
        let fired = scheduler.advance_to(Duration::from_millis(3));
        assert_eq!(fired.len(), 3);
    }
}
