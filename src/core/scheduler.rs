//! A single-threaded task queue keyed by clock deadlines.
//!
//! Nothing here runs on its own. The owner asks for due tasks with
//! [`TaskScheduler::pop_due`] and dispatches them itself, so every task runs
//! on the owner's thread with full `&mut` access to its state.

use std::time::Duration;

/// Identifies one registration. Cancelling a handle twice is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cadence {
    Once,
    Every(Duration),
}

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: TaskHandle,
    due: Duration,
    cadence: Cadence,
    task: T,
}

/// Pending one-shot and repeating tasks.
#[derive(Debug, Clone)]
pub struct TaskScheduler<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TaskScheduler<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T: Clone> TaskScheduler<T> {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once at `due`.
    pub fn schedule_once(&mut self, due: Duration, task: T) -> TaskHandle {
        self.insert(due, Cadence::Once, task)
    }

    /// Run `task` at `first` and then every `interval`.
    ///
    /// A zero interval is bumped to one millisecond so a repeating task can
    /// never starve the queue.
    pub fn schedule_every(&mut self, first: Duration, interval: Duration, task: T) -> TaskHandle {
        let interval = interval.max(Duration::from_millis(1));
        self.insert(first, Cadence::Every(interval), task)
    }

    /// Remove a registration. Returns whether it was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    /// Drop every pending task.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Whether `handle` is still registered.
    #[must_use]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    /// Deadline of a pending registration.
    #[must_use]
    pub fn due_of(&self, handle: TaskHandle) -> Option<Duration> {
        self.entries
            .iter()
            .find(|entry| entry.handle == handle)
            .map(|entry| entry.due)
    }

    /// Earliest deadline across all pending tasks.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    /// Number of pending registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take the earliest task due at or before `now`.
    ///
    /// Ties resolve in registration order. One-shot tasks are removed;
    /// repeating tasks move to their next deadline. Deadlines missed by
    /// more than one interval are coalesced into a single firing.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TaskHandle, T)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| (entry.due, entry.handle.0))
            .map(|(index, _)| index)?;

        match self.entries[index].cadence {
            Cadence::Once => {
                let entry = self.entries.remove(index);
                Some((entry.handle, entry.task))
            }
            Cadence::Every(interval) => {
                let entry = &mut self.entries[index];
                let mut next = entry.due + interval;
                if next <= now {
                    next = now + interval;
                }
                entry.due = next;
                Some((entry.handle, entry.task.clone()))
            }
        }
    }

    fn insert(&mut self, due: Duration, cadence: Cadence, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            handle,
            due,
            cadence,
            task,
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_pop_due_orders_by_deadline_then_registration() {
        let mut scheduler = TaskScheduler::new();
        scheduler.schedule_once(ms(20), "late");
        scheduler.schedule_once(ms(10), "first");
        scheduler.schedule_once(ms(10), "second");

        assert_eq!(scheduler.pop_due(ms(5)), None);
        assert_eq!(scheduler.pop_due(ms(30)).map(|(_, t)| t), Some("first"));
        assert_eq!(scheduler.pop_due(ms(30)).map(|(_, t)| t), Some("second"));
        assert_eq!(scheduler.pop_due(ms(30)).map(|(_, t)| t), Some("late"));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel_removes_only_that_registration() {
        let mut scheduler = TaskScheduler::new();
        let keep = scheduler.schedule_once(ms(10), 1);
        let drop = scheduler.schedule_once(ms(10), 2);

        assert!(scheduler.cancel(drop));
        assert!(!scheduler.cancel(drop));
        assert!(scheduler.is_pending(keep));
        assert_eq!(scheduler.pop_due(ms(10)), Some((keep, 1)));
    }

    #[test]
    fn test_repeating_task_reschedules() {
        let mut scheduler = TaskScheduler::new();
        let handle = scheduler.schedule_every(ms(0), ms(100), "tick");

        assert_eq!(scheduler.pop_due(ms(0)), Some((handle, "tick")));
        assert_eq!(scheduler.due_of(handle), Some(ms(100)));
        assert_eq!(scheduler.pop_due(ms(99)), None);
        assert_eq!(scheduler.pop_due(ms(100)), Some((handle, "tick")));
        assert_eq!(scheduler.next_due(), Some(ms(200)));
    }

    #[test]
    fn test_repeating_task_coalesces_missed_deadlines() {
        let mut scheduler = TaskScheduler::new();
        let handle = scheduler.schedule_every(ms(0), ms(10), ());

        assert!(scheduler.pop_due(ms(1_000)).is_some());
        assert_eq!(scheduler.due_of(handle), Some(ms(1_010)));
        assert!(scheduler.pop_due(ms(1_000)).is_none());
    }

    #[test]
    fn test_zero_interval_is_bumped() {
        let mut scheduler = TaskScheduler::new();
        let handle = scheduler.schedule_every(ms(0), Duration::ZERO, ());
        scheduler.pop_due(ms(0));
        assert_eq!(scheduler.due_of(handle), Some(ms(1)));
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = TaskScheduler::new();
        scheduler.schedule_once(ms(1), ());
        scheduler.schedule_every(ms(1), ms(1), ());
        assert_eq!(scheduler.len(), 2);

        scheduler.cancel_all();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.next_due(), None);
    }
}
