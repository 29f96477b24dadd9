//! Cancellable delayed actions driven by the simulation tick.
//!
//! A `Scheduler` owns its own clock, advanced by `advance(dt)`. Scheduled actions are
//! returned from `advance` once their due time is reached, in due order. Nothing runs on
//! another thread; the caller decides what to do with each fired action.

/// Handle identifying one scheduled action, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct ScheduledTask<T> {
    handle: TaskHandle,
    due: f32,
    action: T,
}

/// Single-threaded timer queue
#[derive(Debug)]
pub struct Scheduler<T> {
    /// Seconds elapsed since the scheduler was created
    now: f32,
    next_handle: u64,
    tasks: Vec<ScheduledTask<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_handle: 0,
            tasks: Vec::new(),
        }
    }

    /// Current scheduler time in seconds
    pub fn now(&self) -> f32 {
        self.now
    }

    /// Run `action` once `delay` seconds have elapsed.
    /// A non-positive delay fires on the next `advance`.
    pub fn schedule(&mut self, delay: f32, action: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;

        self.tasks.push(ScheduledTask {
            handle,
            due: self.now + delay.max(0.0),
            action,
        });

        handle
    }

    /// Cancel a pending action. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.handle != handle);
        self.tasks.len() != before
    }

    /// Seconds until the given action fires, if it is pending
    pub fn remaining(&self, handle: TaskHandle) -> Option<f32> {
        self.tasks
            .iter()
            .find(|task| task.handle == handle)
            .map(|task| (task.due - self.now).max(0.0))
    }

    /// Drop every pending action
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Advance the clock and return every action that became due, earliest first
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        self.now += dt.max(0.0);

        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|task| task.due <= now);
        self.tasks = pending;

        // Equal due times keep scheduling order
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.handle.0.cmp(&b.handle.0)));
        due.into_iter().map(|task| task.action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.5, "return");

        assert!(scheduler.advance(0.25).is_empty());
        assert_eq!(scheduler.advance(0.25), vec!["return"]);
        assert!(scheduler.advance(1.0).is_empty());
    }

    #[test]
    fn test_cancelled_task_never_fires() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(0.5, 1);

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(scheduler.advance(1.0).is_empty());
    }

    #[test]
    fn test_zero_delay_fires_on_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.0, 'a');
        scheduler.schedule(-1.0, 'b');

        assert_eq!(scheduler.advance(0.0), vec!['a', 'b']);
    }

    #[test]
    fn test_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.75, "late");
        scheduler.schedule(0.25, "early");
        scheduler.schedule(0.25, "early-second");

        assert_eq!(scheduler.advance(1.0), vec!["early", "early-second", "late"]);
    }

    #[test]
    fn test_remaining_until_fired() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(1.0, ());
        scheduler.advance(0.25);

        assert_eq!(scheduler.remaining(handle), Some(0.75));

        scheduler.advance(0.75);
        assert_eq!(scheduler.remaining(handle), None);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        scheduler.advance(0.5);
        scheduler.advance(-0.25);
        assert_eq!(scheduler.now(), 0.5);
    }
}
