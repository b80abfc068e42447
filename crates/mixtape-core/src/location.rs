//! Page location boundary
//!
//! The URL fragment is the only persisted state. Writes always replace the
//! current history entry in place.

use crate::disc::codec::{encode, CodecResult};
use crate::disc::Disc;

/// Access to the host page's URL fragment
pub trait Location {
    /// Current fragment without the leading `#`, if any
    fn fragment(&self) -> Option<String>;

    /// Replace the fragment in place (no new history entry)
    fn replace_fragment(&mut self, token: &str);
}

/// In-memory location for tools and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryLocation {
    fragment: Option<String>,
    replacements: usize,
}

impl MemoryLocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Location that starts out carrying `fragment` (leading `#` optional)
    pub fn with_fragment(fragment: &str) -> Self {
        Self {
            fragment: Some(fragment.trim_start_matches('#').to_string()),
            replacements: 0,
        }
    }

    /// Number of in-place writes so far
    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl Location for MemoryLocation {
    fn fragment(&self) -> Option<String> {
        self.fragment.clone().filter(|f| !f.is_empty())
    }

    fn replace_fragment(&mut self, token: &str) {
        self.fragment = Some(token.to_string());
        self.replacements += 1;
    }
}

/// Encode the full disc and write it over the current fragment
pub fn persist_disc<L: Location + ?Sized>(location: &mut L, disc: &Disc) -> CodecResult<String> {
    let token = encode(disc)?;
    location.replace_fragment(&token);
    log::debug!("location: wrote {} byte token", token.len());
    Ok(token)
}
