//! External player boundary
//!
//! Audio never passes through this crate. Playback is delegated to an
//! embeddable video player; the engine only sends it fire-and-forget
//! commands and reads a few polled values back.

/// State codes reported by the embeddable player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Loaded but never started (-1)
    Unstarted,
    /// Reached the end of the track (0)
    Ended,
    /// Playing (1)
    Playing,
    /// Paused (2)
    Paused,
    /// Waiting for data (3)
    Buffering,
    /// Track cued and metadata available (5)
    Cued,
}

impl PlayerState {
    /// Decode the player's integer state code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(PlayerState::Unstarted),
            0 => Some(PlayerState::Ended),
            1 => Some(PlayerState::Playing),
            2 => Some(PlayerState::Paused),
            3 => Some(PlayerState::Buffering),
            5 => Some(PlayerState::Cued),
            _ => None,
        }
    }

    /// Playing or buffering; both count as "playing" for the UI
    pub fn is_active(self) -> bool {
        matches!(self, PlayerState::Playing | PlayerState::Buffering)
    }
}

/// Title/author the player knows for its current track
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoData {
    pub title: String,
    pub author: String,
}

/// Capability surface of an attached player
///
/// Commands are fire-and-forget; reads return the player's latest view.
pub trait PlayerHandle {
    /// Set output volume, 0..=100
    fn set_volume(&mut self, volume: u8);

    fn play_video(&mut self);

    fn pause_video(&mut self);

    /// Seek to an absolute position in seconds
    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool);

    /// Point the player at another track; it cues without starting
    fn load_track(&mut self, track_id: &str);

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Track duration in seconds (0 when unknown)
    fn duration(&self) -> f64;

    fn player_state(&self) -> PlayerState;

    /// Display metadata, once the player has it
    fn video_data(&self) -> Option<VideoData>;
}
