//! Cancel-then-reschedule timer slots
//!
//! The engine never spawns timers of its own. Every delayed effect (position
//! polling, overlay auto-hide, lock flash, layout write-back) lives in a slot
//! that the owner re-arms and the host drives by calling `tick(now)` from its
//! UI loop. A slot holds at most one deadline, so re-arming replaces the
//! previous one instead of stacking a second callback.

use std::time::{Duration, Instant};

/// One-shot deadline slot
#[derive(Debug, Clone, Default)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self { deadline: None }
    }

    /// Cancel any pending deadline and schedule a fresh one `after` from `now`
    pub fn restart(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    /// Drop the pending deadline, if any
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True while a deadline is pending
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the deadline has passed, then disarms
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Repeating slot
///
/// `due` reports at most one firing per call even if several periods were
/// missed; the next firing is re-anchored to `now`.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// Start ticking, replacing a running interval
    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// True if a period elapsed since the last firing
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next {
            Some(next) if now >= next => {
                self.next = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_timer_fires_once() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.restart(t0, 100 * MS);

        assert!(!timer.fire(t0 + 99 * MS));
        assert!(timer.fire(t0 + 100 * MS));
        assert!(!timer.fire(t0 + 200 * MS));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_timer_restart_replaces_deadline() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.restart(t0, 100 * MS);
        timer.restart(t0 + 80 * MS, 100 * MS);

        assert!(!timer.fire(t0 + 150 * MS));
        assert!(timer.fire(t0 + 180 * MS));
    }

    #[test]
    fn test_timer_cancel() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.restart(t0, 10 * MS);
        timer.cancel();
        assert!(!timer.fire(t0 + 50 * MS));
    }

    #[test]
    fn test_interval_repeats_until_stopped() {
        let t0 = Instant::now();
        let mut interval = Interval::new(250 * MS);
        assert!(!interval.due(t0 + 1000 * MS));

        interval.start(t0);
        assert!(!interval.due(t0 + 249 * MS));
        assert!(interval.due(t0 + 250 * MS));
        assert!(!interval.due(t0 + 400 * MS));
        assert!(interval.due(t0 + 500 * MS));

        interval.stop();
        assert!(!interval.due(t0 + 2000 * MS));
    }

    #[test]
    fn test_interval_start_replaces_running() {
        let t0 = Instant::now();
        let mut interval = Interval::new(250 * MS);
        interval.start(t0);
        interval.start(t0 + 200 * MS);
        assert!(!interval.due(t0 + 250 * MS));
        assert!(interval.due(t0 + 450 * MS));
    }
}
