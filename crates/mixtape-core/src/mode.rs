//! Top-level mode flow
//!
//! ```text
//!   Loading ──boot──► Studio ──burn──► Playback
//!      │                                  ▲
//!      └──────── valid fragment ──────────┘
//! ```
//!
//! `Loading` lasts only until [`ModeController::boot`] has read the
//! fragment. There is no way back from `Playback` to `Studio`; a fresh page
//! without a fragment is the only route to the studio.

use std::time::Instant;

use thiserror::Error;

use crate::config::EngineConfig;
use crate::disc::{self, CodecError, Disc, DiscDraft, DraftError, LayoutPatch};
use crate::layout::LayoutPersistence;
use crate::location::Location;
use crate::metadata::{MetadataService, TrackLookup, TrackMetadataCache};
use crate::session::PlaybackSession;

/// Which screen the device is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Loading,
    Studio,
    Playback,
}

/// Mode transition errors
#[derive(Debug, Error)]
pub enum ModeError {
    #[error("Discs can only be burned from the studio (current mode: {0:?})")]
    NotInStudio(Mode),

    #[error("Disc has no tracks")]
    EmptyDisc,

    #[error("Invalid disc: {0}")]
    Draft(#[from] DraftError),

    #[error("Failed to encode disc: {0}")]
    Encode(#[from] CodecError),
}

pub struct ModeController<L: Location> {
    config: EngineConfig,
    location: L,
    mode: Mode,
    disc: Option<Disc>,
    session: Option<PlaybackSession>,
    layout: LayoutPersistence,
    /// Handed to the metadata service when playback starts
    lookup: Option<Box<dyn TrackLookup>>,
}

impl<L: Location> ModeController<L> {
    pub fn new(location: L, config: EngineConfig) -> Self {
        let layout = LayoutPersistence::new(config.timing.layout_debounce());
        Self {
            config,
            location,
            mode: Mode::Loading,
            disc: None,
            session: None,
            layout,
            lookup: None,
        }
    }

    /// Use `lookup` to resolve playlist titles once playback starts
    pub fn with_lookup(mut self, lookup: Box<dyn TrackLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Read the fragment once and settle into studio or playback
    pub fn boot(&mut self) -> Mode {
        if self.mode != Mode::Loading {
            log::warn!("mode: boot called again in {:?} mode", self.mode);
            return self.mode;
        }

        match self.location.fragment().and_then(|token| disc::decode(&token)) {
            Some(disc) => {
                log::info!("mode: loaded disc {:?} from URL", disc.meta.title);
                self.start_playback(disc);
            }
            None => {
                log::info!("mode: no disc in URL, opening studio");
                self.mode = Mode::Studio;
            }
        }
        self.mode
    }

    /// Persist `disc` to the URL and switch to playback
    ///
    /// The session keeps the disc exactly as the URL decodes it, so a
    /// reload sees the same disc. Nothing changes if the disc does not
    /// survive encoding.
    pub fn burn_disc(&mut self, disc: Disc) -> Result<(), ModeError> {
        if self.mode != Mode::Studio {
            return Err(ModeError::NotInStudio(self.mode));
        }

        let token = disc::encode(&disc)?;
        let disc = match disc::decode_detailed(&token) {
            Ok(disc) => disc,
            Err(CodecError::NoTracks) => return Err(ModeError::EmptyDisc),
            Err(e) => return Err(e.into()),
        };

        self.location.replace_fragment(&token);
        log::info!("mode: burned disc {:?} ({} tracks)", disc.meta.title, disc.track_count());
        self.start_playback(disc);
        Ok(())
    }

    /// Validate raw studio input and burn it
    pub fn burn_draft(&mut self, draft: &DiscDraft) -> Result<(), ModeError> {
        if self.mode != Mode::Studio {
            return Err(ModeError::NotInStudio(self.mode));
        }
        let disc = draft.press()?;
        self.burn_disc(disc)
    }

    /// Merge a layout adjustment and schedule the URL write
    ///
    /// Not gated by HOLD.
    pub fn update_layout(&mut self, patch: &LayoutPatch, now: Instant) {
        match self.disc.as_mut() {
            Some(disc) if self.mode == Mode::Playback => self.layout.update(disc, patch, now),
            _ => log::debug!("mode: layout update ignored in {:?} mode", self.mode),
        }
    }

    /// Drive session timers and the pending layout write
    pub fn tick(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.tick(now);
        }
        if let Some(disc) = self.disc.as_ref() {
            self.layout.tick(now, disc, &mut self.location);
        }
    }

    /// Cancel every timer; the controller stays in its current mode
    pub fn teardown(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.teardown();
        }
        self.layout.teardown();
    }

    /// Full share URL when a base URL is configured, else `#<token>`
    pub fn share_url(&self) -> Option<String> {
        let disc = self.disc.as_ref()?;
        let result = match self.config.share.base_url.as_deref() {
            Some(base) => disc::codec::share_url(base, disc),
            None => disc::encode(disc).map(|token| format!("#{}", token)),
        };
        match result {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("mode: cannot build share URL: {}", e);
                None
            }
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn disc(&self) -> Option<&Disc> {
        self.disc.as_ref()
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut PlaybackSession> {
        self.session.as_mut()
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    fn start_playback(&mut self, disc: Disc) {
        let placeholder = self.config.metadata.placeholder.as_str();
        let metadata = match self.lookup.take() {
            Some(lookup) => match MetadataService::spawn(lookup) {
                Ok(service) => TrackMetadataCache::with_service(service, placeholder),
                Err(e) => {
                    log::warn!("mode: {}, playlist titles will use placeholders", e);
                    TrackMetadataCache::offline(placeholder)
                }
            },
            None => TrackMetadataCache::offline(placeholder),
        };

        self.session = Some(PlaybackSession::new(
            disc.tracks.clone(),
            &self.config,
            metadata,
        ));
        self.disc = Some(disc);
        self.mode = Mode::Playback;
    }
}
