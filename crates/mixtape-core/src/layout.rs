//! Debounced layout write-back
//!
//! Drag and resize gestures merge into the live disc immediately; the URL is
//! rewritten only after the gestures go quiet for the debounce window. Each
//! update restarts the window, so a burst of updates produces one write
//! carrying the latest merged disc.

use std::time::{Duration, Instant};

use crate::disc::{Disc, LayoutPatch};
use crate::location::{persist_disc, Location};
use crate::timer::Timer;

pub struct LayoutPersistence {
    debounce: Timer,
    window: Duration,
}

impl LayoutPersistence {
    pub fn new(window: Duration) -> Self {
        Self {
            debounce: Timer::new(),
            window,
        }
    }

    /// Merge `patch` into `disc` and (re)schedule the write
    pub fn update(&mut self, disc: &mut Disc, patch: &LayoutPatch, now: Instant) {
        *disc = disc.with_layout_patch(patch);
        self.debounce.restart(now, self.window);
    }

    /// Write the disc if the debounce window has elapsed
    ///
    /// Returns true when a write happened.
    pub fn tick<L: Location + ?Sized>(&mut self, now: Instant, disc: &Disc, location: &mut L) -> bool {
        if !self.debounce.fire(now) {
            return false;
        }
        match persist_disc(location, disc) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("layout: failed to persist disc: {}", e);
                false
            }
        }
    }

    /// True while a write is scheduled
    pub fn is_pending(&self) -> bool {
        self.debounce.is_armed()
    }

    /// Drop any scheduled write
    pub fn teardown(&mut self) {
        self.debounce.cancel();
    }
}
