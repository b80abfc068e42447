//! Creation-flow input validation
//!
//! The studio form collects raw text. [`DiscDraft::press`] turns it into a
//! canonical [`Disc`] or explains what is missing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Disc, DiscMeta};
use crate::track::extract_track_id;

/// Errors reported back to the studio form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// No track links were given
    #[error("Add at least one track")]
    NoTracks,

    /// A track link did not contain a recognizable track id
    #[error("Invalid track link at position {}", .index + 1)]
    InvalidTrack { index: usize },

    /// The disc label is blank
    #[error("Please enter a disc label")]
    MissingTitle,
}

/// Raw creation-flow input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscDraft {
    /// Track links or bare ids, in playback order
    pub tracks: Vec<String>,
    /// Photo URLs
    pub photos: Vec<String>,
    /// Note text
    pub note: String,
    /// Disc label
    pub title: String,
    /// Sender name, may be blank
    pub sender: String,
}

impl DiscDraft {
    /// Validate the draft and burn it into a canonical disc
    pub fn press(&self) -> Result<Disc, DraftError> {
        let links: Vec<&str> = self
            .tracks
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if links.is_empty() {
            return Err(DraftError::NoTracks);
        }

        let tracks = links
            .iter()
            .enumerate()
            .map(|(index, link)| extract_track_id(link).ok_or(DraftError::InvalidTrack { index }))
            .collect::<Result<Vec<_>, _>>()?;

        let title = self.title.trim();
        if title.is_empty() {
            return Err(DraftError::MissingTitle);
        }

        let photos = self
            .photos
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        let mut disc = Disc::new(tracks, DiscMeta::new(title, self.sender.trim()));
        disc.photos = photos;
        disc.note = self.note.trim().to_string();
        Ok(disc)
    }
}
