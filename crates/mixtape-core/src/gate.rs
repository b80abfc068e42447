//! HOLD lock gate
//!
//! Every user intent that touches playback or the device goes through
//! [`LockGate::guard`]. While HOLD is engaged the action is dropped and the
//! lock flash is shown instead; pressing again while flashing restarts the
//! flash window. [`LockGate::toggle_hold`] itself is never gated.

use std::time::{Duration, Instant};

use crate::timer::Timer;

pub struct LockGate {
    locked: bool,
    flash: Timer,
    flash_window: Duration,
}

impl LockGate {
    pub fn new(flash_window: Duration) -> Self {
        Self {
            locked: false,
            flash: Timer::new(),
            flash_window,
        }
    }

    /// Run `action` unless locked
    ///
    /// Returns `None` when the action was blocked.
    pub fn guard<R>(&mut self, now: Instant, action: impl FnOnce() -> R) -> Option<R> {
        if self.locked {
            log::debug!("gate: intent blocked by HOLD");
            self.flash.restart(now, self.flash_window);
            return None;
        }
        Some(action())
    }

    /// Flip HOLD; returns the new lock state
    pub fn toggle_hold(&mut self) -> bool {
        self.locked = !self.locked;
        log::debug!("gate: HOLD {}", if self.locked { "on" } else { "off" });
        self.locked
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// True while the lock flash overlay should be visible
    pub fn is_flashing(&self) -> bool {
        self.flash.is_armed()
    }

    pub fn tick(&mut self, now: Instant) {
        self.flash.fire(now);
    }

    pub fn teardown(&mut self) {
        self.flash.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn gate() -> LockGate {
        LockGate::new(1200 * MS)
    }

    #[test]
    fn test_unlocked_runs_action() {
        let mut gate = gate();
        let mut hits = 0;
        let result = gate.guard(Instant::now(), || {
            hits += 1;
            7
        });
        assert_eq!(result, Some(7));
        assert_eq!(hits, 1);
        assert!(!gate.is_flashing());
    }

    #[test]
    fn test_locked_blocks_and_flashes() {
        let t0 = Instant::now();
        let mut gate = gate();
        assert!(gate.toggle_hold());

        let mut hits = 0;
        assert_eq!(gate.guard(t0, || hits += 1), None);
        assert_eq!(hits, 0);
        assert!(gate.is_flashing());

        gate.tick(t0 + 1200 * MS);
        assert!(!gate.is_flashing());
    }

    #[test]
    fn test_repeated_block_restarts_flash() {
        let t0 = Instant::now();
        let mut gate = gate();
        gate.toggle_hold();

        gate.guard(t0, || ());
        gate.guard(t0 + 1000 * MS, || ());
        gate.tick(t0 + 1500 * MS);
        assert!(gate.is_flashing());
        gate.tick(t0 + 2200 * MS);
        assert!(!gate.is_flashing());
    }

    #[test]
    fn test_toggle_hold_releases() {
        let mut gate = gate();
        gate.toggle_hold();
        assert!(!gate.toggle_hold());
        assert!(!gate.is_locked());
        assert_eq!(gate.guard(Instant::now(), || "ran"), Some("ran"));
    }

    #[test]
    fn test_teardown_cancels_flash() {
        let mut gate = gate();
        gate.toggle_hold();
        gate.guard(Instant::now(), || ());
        gate.teardown();
        assert!(!gate.is_flashing());
    }
}
