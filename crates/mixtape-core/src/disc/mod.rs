//! The disc - the unit of sharing
//!
//! A [`Disc`] is a plain value: tracks, photos, a note, a label block and an
//! optional sparse layout. It is never edited in place once it is live;
//! every change produces a new value which is immediately re-persisted
//! (see [`crate::layout`]).
//!
//! - [`codec`] turns discs into URL-fragment tokens and back, including the
//!   historical payload shapes
//! - [`placement`] holds the per-element layout and its default placement
//! - [`draft`] validates creation-flow input into a disc

pub mod codec;
pub mod draft;
pub mod placement;

use serde::Deserialize;

pub use codec::{decode, decode_detailed, encode, CodecError};
pub use draft::{DiscDraft, DraftError};
pub use placement::{Layout, LayoutPatch, NotePlacement, PhotoPlacement, Point};

/// Sender label used when the creator leaves the field blank
pub const DEFAULT_SENDER: &str = "Anonymous";

/// Title given to legacy discs that were burned without a label
pub const DEFAULT_TITLE: &str = "Untitled";

/// Label block shown on the device
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscMeta {
    /// User-assigned disc label
    pub title: String,
    /// Who burned the disc ("Anonymous" when left blank)
    pub sender: String,
}

impl DiscMeta {
    /// Build a label block, defaulting a blank sender to "Anonymous"
    pub fn new(title: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sender: normalize_sender(sender.into()),
        }
    }
}

/// A shareable mixtape
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Disc {
    /// Track identifiers in playback order
    pub tracks: Vec<String>,
    /// Image URLs, may be empty
    pub photos: Vec<String>,
    /// Free-text note, may be empty
    pub note: String,
    /// Sparse element placement; `None` means every element uses its default
    pub layout: Option<Layout>,
    /// Label block
    pub meta: DiscMeta,
}

impl Disc {
    /// Create a disc without photos, note or layout
    pub fn new(tracks: Vec<String>, meta: DiscMeta) -> Self {
        Self {
            tracks,
            photos: Vec::new(),
            note: String::new(),
            layout: None,
            meta,
        }
    }

    /// Number of tracks on the disc
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Track id at `index`, if any
    pub fn track(&self, index: usize) -> Option<&str> {
        self.tracks.get(index).map(String::as_str)
    }

    /// Current layout, or an empty one when nothing has been placed yet
    pub fn layout_or_default(&self) -> Layout {
        self.layout.clone().unwrap_or_default()
    }

    /// Produce a new disc with `patch` merged into its layout
    ///
    /// The receiver is left untouched. Moves of photos the disc does not
    /// have are ignored.
    pub fn with_layout_patch(&self, patch: &LayoutPatch) -> Disc {
        if let LayoutPatch::PhotoMoved { index, .. } = *patch {
            if index >= self.photos.len() {
                log::warn!(
                    "disc: ignoring move of photo {} ({} photos on disc)",
                    index,
                    self.photos.len()
                );
                return self.clone();
            }
        }

        let mut layout = self.layout_or_default();
        layout.apply(patch);
        Disc {
            layout: Some(layout),
            ..self.clone()
        }
    }
}

/// Deserialize an explicit `null` as the type's default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Default a blank sender label to "Anonymous"
pub(crate) fn normalize_sender(sender: String) -> String {
    if sender.trim().is_empty() {
        DEFAULT_SENDER.to_string()
    } else {
        sender
    }
}
