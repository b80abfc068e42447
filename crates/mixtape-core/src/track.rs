//! Track identifiers
//!
//! Tracks are 11-character video ids for the embeddable player. Creators
//! usually paste a full link; [`extract_track_id`] accepts every link form
//! the player site hands out.

use regex::Regex;
use std::sync::OnceLock;

const LINK_PATTERN: &str = r"(?:youtube\.com/watch\?v=|youtube\.com/embed/|youtube\.com/v/|youtu\.be/|youtube\.com/shorts/|music\.youtube\.com/watch\?v=)([a-zA-Z0-9_-]{11})";
const BARE_ID_PATTERN: &str = r"^([a-zA-Z0-9_-]{11})$";

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [LINK_PATTERN, BARE_ID_PATTERN]
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    log::error!("track: bad link pattern {}: {}", p, e);
                    None
                }
            })
            .collect()
    })
}

/// Pull the track id out of a pasted link or bare id
pub fn extract_track_id(input: &str) -> Option<String> {
    let input = input.trim();
    patterns()
        .iter()
        .find_map(|re| re.captures(input))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check that `id` has the shape of a track id
pub fn is_valid_track_id(id: &str) -> bool {
    id.len() == 11
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Canonical watch URL for a track id
pub fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}
