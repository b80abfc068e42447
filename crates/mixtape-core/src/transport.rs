//! Transport state machine
//!
//! Owns the ephemeral playback state of one session (track index, position,
//! duration, volume, now-playing labels) and mediates every transport intent
//! against the attached player.
//!
//! ```text
//!   Idle ──attach──► Ready ──playing──► Playing ◄──► Paused
//!                      ▲                   │
//!                      └──── ended / skip ─┘   (index advances, wraps)
//! ```
//!
//! Buffering keeps whatever phase the transport is in; the UI keeps showing
//! "playing". Local state is updated optimistically on intents and
//! reconciled by the next player event.

use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::player::{PlayerHandle, PlayerState};
use crate::timer::{Interval, Timer};

/// Coarse transport phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportPhase {
    /// No player attached yet
    Idle,
    /// Player attached, current track not playing yet
    Ready,
    Playing,
    Paused,
}

/// Labels shown for the current track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Transport state for one mounted session
pub struct Transport {
    player: Option<Box<dyn PlayerHandle>>,
    tracks: Vec<String>,
    track_index: usize,
    phase: TransportPhase,
    position_secs: f64,
    duration_secs: f64,
    volume: u8,
    now_playing: NowPlaying,
    /// Samples the player position while playing
    position_poll: Interval,
    /// Auto-hide for the volume indicator
    volume_overlay: Timer,
    volume_overlay_window: Duration,
}

impl Transport {
    /// Create a transport for the given track list
    pub fn new(tracks: Vec<String>, config: &EngineConfig) -> Self {
        Self {
            player: None,
            tracks,
            track_index: 0,
            phase: TransportPhase::Idle,
            position_secs: 0.0,
            duration_secs: 0.0,
            volume: config.transport.initial_volume.min(100),
            now_playing: NowPlaying::default(),
            position_poll: Interval::new(config.timing.position_poll()),
            volume_overlay: Timer::new(),
            volume_overlay_window: config.timing.volume_overlay(),
        }
    }

    // =========================================================================
    // Player events
    // =========================================================================

    /// Attach the external player once it reports ready
    ///
    /// Pushes the current volume and picks up any metadata the player
    /// already has.
    pub fn attach_player(&mut self, mut player: Box<dyn PlayerHandle>) {
        log::debug!("transport: player attached (volume {})", self.volume);
        player.set_volume(self.volume);
        self.player = Some(player);
        if self.phase == TransportPhase::Idle {
            self.phase = TransportPhase::Ready;
        }
        self.refresh_now_playing();
    }

    /// Handle a raw state code from the player
    pub fn on_state_change(&mut self, code: i32, now: Instant) {
        let Some(state) = PlayerState::from_code(code) else {
            log::debug!("transport: ignoring unknown player state {}", code);
            return;
        };

        match state {
            PlayerState::Playing => {
                self.phase = TransportPhase::Playing;
                if let Some(player) = self.player.as_ref() {
                    self.duration_secs = player.duration().max(0.0);
                }
                self.refresh_now_playing();
                self.position_poll.start(now);
            }
            PlayerState::Paused => {
                self.phase = TransportPhase::Paused;
                self.position_poll.stop();
            }
            PlayerState::Ended => {
                self.position_poll.stop();
                self.phase = self.stopped_phase();
                self.position_secs = 0.0;
                self.duration_secs = 0.0;
                let total = self.tracks.len();
                if total > 0 {
                    self.switch_to((self.track_index + 1) % total);
                }
            }
            PlayerState::Cued => self.refresh_now_playing(),
            PlayerState::Buffering | PlayerState::Unstarted => {}
        }
    }

    // =========================================================================
    // Intents
    // =========================================================================

    /// Play or pause depending on what the player reports right now
    pub fn toggle_play_pause(&mut self) {
        let Some(player) = self.player.as_mut() else {
            log::debug!("transport: play/pause ignored, no player attached");
            return;
        };

        if player.player_state().is_active() {
            player.pause_video();
            self.phase = TransportPhase::Paused;
        } else {
            player.play_video();
            self.phase = TransportPhase::Playing;
        }
    }

    /// Seek relative to the player's current position, never before 0
    pub fn seek_relative(&mut self, delta_secs: f64) {
        let Some(player) = self.player.as_mut() else {
            log::debug!("transport: seek ignored, no player attached");
            return;
        };

        let target = (player.current_time() + delta_secs).max(0.0);
        player.seek_to(target, true);
        self.position_secs = target;
    }

    /// Skip forward, wrapping after the last track; stops playback
    pub fn next_track(&mut self) {
        let total = self.tracks.len();
        if total <= 1 {
            return;
        }
        self.stop_for_skip();
        self.switch_to((self.track_index + 1) % total);
    }

    /// Skip back, wrapping before the first track; stops playback
    pub fn prev_track(&mut self) {
        let total = self.tracks.len();
        if total <= 1 {
            return;
        }
        self.stop_for_skip();
        self.switch_to((self.track_index + total - 1) % total);
    }

    /// Jump straight to `index` (playlist view); keeps playing if it was
    pub fn select_track(&mut self, index: usize) {
        if index >= self.tracks.len() {
            log::warn!(
                "transport: track {} out of range ({} tracks)",
                index,
                self.tracks.len()
            );
            return;
        }
        self.switch_to(index);
    }

    /// Nudge the volume, clamp to 0..=100 and show the indicator
    pub fn change_volume(&mut self, delta: i32, now: Instant) {
        self.volume = (i32::from(self.volume) + delta).clamp(0, 100) as u8;
        if let Some(player) = self.player.as_mut() {
            player.set_volume(self.volume);
        }
        self.volume_overlay.restart(now, self.volume_overlay_window);
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Deliver due timers: sample the position, hide the volume indicator
    pub fn tick(&mut self, now: Instant) {
        if self.position_poll.due(now) {
            if let Some(player) = self.player.as_ref() {
                self.position_secs = player.current_time().max(0.0);
            }
        }
        if self.volume_overlay.fire(now) {
            log::debug!("transport: volume indicator hidden");
        }
    }

    /// Cancel every timer and drop the player
    pub fn teardown(&mut self) {
        self.position_poll.stop();
        self.volume_overlay.cancel();
        self.player = None;
        self.phase = TransportPhase::Idle;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn phase(&self) -> TransportPhase {
        self.phase
    }

    /// Playing as far as the UI is concerned
    pub fn is_playing(&self) -> bool {
        self.phase == TransportPhase::Playing
    }

    pub fn is_attached(&self) -> bool {
        self.player.is_some()
    }

    pub fn track_index(&self) -> usize {
        self.track_index
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    pub fn current_track(&self) -> Option<&str> {
        self.tracks.get(self.track_index).map(String::as_str)
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn now_playing(&self) -> &NowPlaying {
        &self.now_playing
    }

    pub fn volume_overlay_visible(&self) -> bool {
        self.volume_overlay.is_armed()
    }

    pub fn is_polling(&self) -> bool {
        self.position_poll.is_running()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn stopped_phase(&self) -> TransportPhase {
        if self.player.is_some() {
            TransportPhase::Ready
        } else {
            TransportPhase::Idle
        }
    }

    fn stop_for_skip(&mut self) {
        self.position_poll.stop();
        self.phase = self.stopped_phase();
    }

    /// Move to another track
    ///
    /// Labels are cleared before anything else so a stale title is never
    /// shown against the new track. If the transport is still playing the
    /// new track is started right away.
    fn switch_to(&mut self, index: usize) {
        if index == self.track_index {
            return;
        }

        self.track_index = index;
        self.now_playing = NowPlaying::default();
        self.position_secs = 0.0;
        self.duration_secs = 0.0;
        self.position_poll.stop();

        let resume = self.is_playing();
        log::debug!("transport: track {} (resume: {})", index, resume);

        if let (Some(player), Some(track_id)) = (self.player.as_mut(), self.tracks.get(index)) {
            player.load_track(track_id);
            if resume {
                player.play_video();
            }
        }
    }

    fn refresh_now_playing(&mut self) {
        let Some(data) = self.player.as_ref().and_then(|p| p.video_data()) else {
            return;
        };
        if data.title.is_empty() {
            return;
        }
        self.now_playing = NowPlaying {
            title: Some(data.title),
            author: (!data.author.is_empty()).then_some(data.author),
        };
    }
}
