//! Test doubles shared by the unit tests

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::metadata::{LookupError, TrackInfo, TrackLookup};
use crate::player::{PlayerHandle, PlayerState, VideoData};

/// Command received by [`FakePlayer`]
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCall {
    SetVolume(u8),
    Play,
    Pause,
    SeekTo(f64),
    Load(String),
}

pub struct FakePlayerInner {
    pub calls: Vec<PlayerCall>,
    pub current_time: f64,
    pub duration: f64,
    pub state: PlayerState,
    pub video: Option<VideoData>,
}

/// Scriptable player; clones share state so tests keep a handle after
/// boxing one into the transport
#[derive(Clone)]
pub struct FakePlayer(Rc<RefCell<FakePlayerInner>>);

impl FakePlayer {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(FakePlayerInner {
            calls: Vec::new(),
            current_time: 0.0,
            duration: 0.0,
            state: PlayerState::Unstarted,
            video: None,
        })))
    }

    pub fn boxed(&self) -> Box<dyn PlayerHandle> {
        Box::new(self.clone())
    }

    pub fn set_state(&self, state: PlayerState) {
        self.0.borrow_mut().state = state;
    }

    pub fn set_time(&self, seconds: f64) {
        self.0.borrow_mut().current_time = seconds;
    }

    pub fn set_duration(&self, seconds: f64) {
        self.0.borrow_mut().duration = seconds;
    }

    pub fn set_video(&self, title: &str, author: &str) {
        self.0.borrow_mut().video = Some(VideoData {
            title: title.to_string(),
            author: author.to_string(),
        });
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.0.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.0.borrow_mut().calls.clear();
    }
}

impl PlayerHandle for FakePlayer {
    fn set_volume(&mut self, volume: u8) {
        self.0.borrow_mut().calls.push(PlayerCall::SetVolume(volume));
    }

    fn play_video(&mut self) {
        self.0.borrow_mut().calls.push(PlayerCall::Play);
    }

    fn pause_video(&mut self) {
        self.0.borrow_mut().calls.push(PlayerCall::Pause);
    }

    fn seek_to(&mut self, seconds: f64, _allow_seek_ahead: bool) {
        self.0.borrow_mut().calls.push(PlayerCall::SeekTo(seconds));
    }

    fn load_track(&mut self, track_id: &str) {
        self.0.borrow_mut().calls.push(PlayerCall::Load(track_id.to_string()));
    }

    fn current_time(&self) -> f64 {
        self.0.borrow().current_time
    }

    fn duration(&self) -> f64 {
        self.0.borrow().duration
    }

    fn player_state(&self) -> PlayerState {
        self.0.borrow().state
    }

    fn video_data(&self) -> Option<VideoData> {
        self.0.borrow().video.clone()
    }
}

/// In-memory lookup that counts how often it is asked
#[derive(Clone, Default)]
pub struct FakeLookup {
    known: HashMap<String, TrackInfo>,
    pub calls: Arc<AtomicUsize>,
}

impl FakeLookup {
    pub fn with(mut self, id: &str, title: &str, author: &str) -> Self {
        self.known.insert(
            id.to_string(),
            TrackInfo {
                title: title.to_string(),
                author: Some(author.to_string()),
            },
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TrackLookup for FakeLookup {
    fn lookup(&self, track_id: &str) -> Result<TrackInfo, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.known
            .get(track_id)
            .cloned()
            .ok_or(LookupError::Status(404))
    }
}
