//! Cancellable debounce timers

use std::time::Duration;

/// Handle for one scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Schedules callbacks the host delivers back through
/// `SettingsReconciler::timer_elapsed`.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration) -> TimerId;

    fn cancel(&mut self, id: TimerId);
}

/// Virtual-time scheduler advanced explicitly by the caller.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<(TimerId, Duration)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|(pending, _)| *pending == id)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Move time forward and return the timers that came due, earliest first.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerId> {
        self.now += by;
        let now = self.now;

        let mut due: Vec<(TimerId, Duration)> = Vec::new();
        self.pending.retain(|&(id, at)| {
            if at <= now {
                due.push((id, at));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(_, at)| at);
        due.into_iter().map(|(id, _)| id).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push((id, self.now + delay));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|(pending, _)| *pending != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_timer_fires_once_due() {
        let mut scheduler = ManualScheduler::new();
        let id = scheduler.schedule(500 * MS);

        assert!(scheduler.advance(499 * MS).is_empty());
        assert_eq!(scheduler.advance(MS), vec![id]);
        assert!(scheduler.advance(1000 * MS).is_empty());
        assert_eq!(scheduler.now(), 1500 * MS);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut scheduler = ManualScheduler::new();
        let id = scheduler.schedule(10 * MS);
        scheduler.cancel(id);

        assert!(!scheduler.is_pending(id));
        assert!(scheduler.advance(100 * MS).is_empty());
    }

    #[test]
    fn test_due_timers_in_deadline_order() {
        let mut scheduler = ManualScheduler::new();
        let late = scheduler.schedule(30 * MS);
        let early = scheduler.schedule(10 * MS);

        assert_eq!(scheduler.pending(), 2);
        assert_eq!(scheduler.advance(50 * MS), vec![early, late]);
    }
}
