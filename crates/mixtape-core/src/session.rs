//! Playback session
//!
//! One mounted device in playback mode. Owns the transport, the HOLD gate,
//! the device-level view flags (flipped, playlist open) and the metadata
//! cache, and is the only surface the host UI calls during playback.
//!
//! Every intent except [`PlaybackSession::toggle_hold`] is routed through
//! the lock gate and returns whether it was accepted.

use std::time::Instant;

use crate::config::EngineConfig;
use crate::gate::LockGate;
use crate::metadata::TrackMetadataCache;
use crate::player::PlayerHandle;
use crate::transport::Transport;

/// Transient layer drawn over the device screen
///
/// When several are active at once the highest priority wins:
/// lock flash, then volume indicator, then playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Playlist,
    VolumeIndicator,
    LockFlash,
}

/// One row of the playlist view
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    pub index: usize,
    pub track_id: String,
    /// Resolved title; `None` while the lookup is in flight
    pub title: Option<String>,
    pub author: Option<String>,
    pub is_current: bool,
}

pub struct PlaybackSession {
    transport: Transport,
    gate: LockGate,
    metadata: TrackMetadataCache,
    flipped: bool,
    playlist_open: bool,
    volume_step: i32,
    seek_step_secs: f64,
}

impl PlaybackSession {
    pub fn new(tracks: Vec<String>, config: &EngineConfig, metadata: TrackMetadataCache) -> Self {
        log::info!("session: starting playback of {} track(s)", tracks.len());
        Self {
            transport: Transport::new(tracks, config),
            gate: LockGate::new(config.timing.lock_flash()),
            metadata,
            flipped: false,
            playlist_open: false,
            volume_step: config.transport.volume_step,
            seek_step_secs: config.transport.seek_step_secs,
        }
    }

    // =========================================================================
    // Player events (never gated)
    // =========================================================================

    pub fn on_player_ready(&mut self, player: Box<dyn PlayerHandle>) {
        self.transport.attach_player(player);
    }

    pub fn on_player_state_change(&mut self, code: i32, now: Instant) {
        self.transport.on_state_change(code, now);
    }

    // =========================================================================
    // Gated intents
    // =========================================================================

    pub fn toggle_play_pause(&mut self, now: Instant) -> bool {
        self.gate
            .guard(now, || self.transport.toggle_play_pause())
            .is_some()
    }

    pub fn seek_relative(&mut self, delta_secs: f64, now: Instant) -> bool {
        self.gate
            .guard(now, || self.transport.seek_relative(delta_secs))
            .is_some()
    }

    /// Seek forward by the configured step
    pub fn seek_forward(&mut self, now: Instant) -> bool {
        self.seek_relative(self.seek_step_secs, now)
    }

    /// Seek back by the configured step
    pub fn seek_back(&mut self, now: Instant) -> bool {
        self.seek_relative(-self.seek_step_secs, now)
    }

    pub fn next_track(&mut self, now: Instant) -> bool {
        self.gate.guard(now, || self.transport.next_track()).is_some()
    }

    pub fn prev_track(&mut self, now: Instant) -> bool {
        self.gate.guard(now, || self.transport.prev_track()).is_some()
    }

    /// Pick a track from the playlist view; closes the view
    pub fn select_track(&mut self, index: usize, now: Instant) -> bool {
        let transport = &mut self.transport;
        let playlist_open = &mut self.playlist_open;
        self.gate
            .guard(now, || {
                transport.select_track(index);
                *playlist_open = false;
            })
            .is_some()
    }

    pub fn change_volume(&mut self, delta: i32, now: Instant) -> bool {
        self.gate
            .guard(now, || self.transport.change_volume(delta, now))
            .is_some()
    }

    pub fn volume_up(&mut self, now: Instant) -> bool {
        self.change_volume(self.volume_step, now)
    }

    pub fn volume_down(&mut self, now: Instant) -> bool {
        self.change_volume(-self.volume_step, now)
    }

    /// Flip the device to show its back panel
    pub fn toggle_flip(&mut self, now: Instant) -> bool {
        self.gate
            .guard(now, || self.flipped = !self.flipped)
            .is_some()
    }

    /// Show or hide the playlist; opening it starts title lookups
    pub fn toggle_playlist(&mut self, now: Instant) -> bool {
        let metadata = &mut self.metadata;
        let playlist_open = &mut self.playlist_open;
        let tracks = self.transport.tracks();
        self.gate
            .guard(now, || {
                *playlist_open = !*playlist_open;
                if *playlist_open {
                    for track_id in tracks {
                        metadata.request(track_id);
                    }
                }
            })
            .is_some()
    }

    /// Flip HOLD; never gated
    pub fn toggle_hold(&mut self) -> bool {
        self.gate.toggle_hold()
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Drive every timer and collect finished metadata lookups
    pub fn tick(&mut self, now: Instant) {
        self.transport.tick(now);
        self.gate.tick(now);
        self.metadata.poll();
    }

    /// Cancel every timer and stop background lookups
    pub fn teardown(&mut self) {
        log::info!("session: teardown");
        self.transport.teardown();
        self.gate.teardown();
        self.metadata.teardown();
    }

    // =========================================================================
    // View state
    // =========================================================================

    pub fn overlay(&self) -> Overlay {
        if self.gate.is_flashing() {
            Overlay::LockFlash
        } else if self.transport.volume_overlay_visible() {
            Overlay::VolumeIndicator
        } else if self.playlist_open {
            Overlay::Playlist
        } else {
            Overlay::None
        }
    }

    pub fn playlist_entries(&self) -> Vec<PlaylistEntry> {
        let current = self.transport.track_index();
        self.transport
            .tracks()
            .iter()
            .enumerate()
            .map(|(index, track_id)| {
                let info = self.metadata.get(track_id);
                PlaylistEntry {
                    index,
                    track_id: track_id.clone(),
                    title: info.map(|i| i.title.clone()),
                    author: info.and_then(|i| i.author.clone()),
                    is_current: index == current,
                }
            })
            .collect()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn is_locked(&self) -> bool {
        self.gate.is_locked()
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_playlist_open(&self) -> bool {
        self.playlist_open
    }
}
