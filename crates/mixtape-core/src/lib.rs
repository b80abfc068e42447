//! Mixtape Core - Disc-state engine for shareable mixtape players
//!
//! A disc (tracks, photos, a note and a label) travels entirely inside a URL
//! fragment. This crate owns everything between that fragment and the
//! rendered device: the versioned share codec, the transport state machine
//! that drives an external embeddable player, the HOLD lock gate, debounced
//! layout write-back and the loading/studio/playback mode flow.
//!
//! Rendering is not handled here. The host UI calls in through a narrow
//! surface (intents, player events and a periodic `tick`).

pub mod config;
pub mod disc;
pub mod gate;
pub mod layout;
pub mod location;
pub mod metadata;
pub mod mode;
pub mod player;
pub mod session;
pub mod timer;
pub mod track;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use config::EngineConfig;
pub use disc::{Disc, DiscDraft, DiscMeta, Layout, LayoutPatch};
pub use location::{Location, MemoryLocation};
pub use mode::{Mode, ModeController, ModeError};
pub use player::{PlayerHandle, PlayerState, VideoData};
pub use session::{Overlay, PlaybackSession, PlaylistEntry};
pub use transport::{NowPlaying, Transport, TransportPhase};
