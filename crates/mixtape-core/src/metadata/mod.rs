//! Track metadata resolution
//!
//! Display titles for the playlist view come from a lookup collaborator
//! keyed by track id. Lookups run on the [`MetadataService`] thread; the
//! session-owned [`TrackMetadataCache`] memoizes results per id and never
//! surfaces a failure, storing a placeholder label instead.

mod oembed;
mod service;

pub use oembed::OembedLookup;
pub use service::{MetadataClient, MetadataCommand, MetadataService, ServiceHandle};

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Display metadata for one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub title: String,
    pub author: Option<String>,
}

impl TrackInfo {
    /// Fallback entry used when a lookup fails
    pub fn placeholder(label: &str) -> Self {
        Self {
            title: label.to_string(),
            author: None,
        }
    }
}

/// Metadata lookup errors
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Invalid track id: {0}")]
    InvalidId(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Lookup endpoint returned status {0}")]
    Status(u16),

    #[error("Failed to parse lookup response: {0}")]
    Parse(String),

    #[error("Metadata service is not running")]
    ServiceUnavailable,
}

/// Request/response boundary for track metadata
///
/// Implementations block; they are only ever called on the service thread.
pub trait TrackLookup: Send {
    fn lookup(&self, track_id: &str) -> Result<TrackInfo, LookupError>;
}

type Reply = oneshot::Receiver<Result<TrackInfo, LookupError>>;

enum CacheEntry {
    Pending(Reply),
    Resolved(TrackInfo),
}

/// Per-session memo of resolved track metadata
pub struct TrackMetadataCache {
    client: Option<MetadataClient>,
    service: Option<ServiceHandle<MetadataCommand>>,
    entries: HashMap<String, CacheEntry>,
    placeholder: String,
}

impl TrackMetadataCache {
    /// Cache without a lookup service; every request resolves to the
    /// placeholder
    pub fn offline(placeholder: &str) -> Self {
        Self {
            client: None,
            service: None,
            entries: HashMap::new(),
            placeholder: placeholder.to_string(),
        }
    }

    /// Cache backed by a running [`MetadataService`]
    pub fn with_service(service: ServiceHandle<MetadataCommand>, placeholder: &str) -> Self {
        Self {
            client: Some(MetadataClient::new(&service)),
            service: Some(service),
            entries: HashMap::new(),
            placeholder: placeholder.to_string(),
        }
    }

    /// Start resolving `track_id` unless it is already known or in flight
    pub fn request(&mut self, track_id: &str) {
        if self.entries.contains_key(track_id) {
            return;
        }

        let entry = match self.client.as_ref().map(|c| c.resolve(track_id)) {
            Some(Ok(reply)) => CacheEntry::Pending(reply),
            Some(Err(e)) => {
                log::warn!("metadata: cannot queue lookup for {}: {}", track_id, e);
                CacheEntry::Resolved(TrackInfo::placeholder(&self.placeholder))
            }
            None => CacheEntry::Resolved(TrackInfo::placeholder(&self.placeholder)),
        };
        self.entries.insert(track_id.to_string(), entry);
    }

    /// Collect finished lookups; returns how many entries resolved
    pub fn poll(&mut self) -> usize {
        let mut resolved = 0;

        for (track_id, entry) in self.entries.iter_mut() {
            let CacheEntry::Pending(reply) = entry else {
                continue;
            };

            let info = match reply.try_recv() {
                Ok(Ok(info)) => info,
                Ok(Err(e)) => {
                    log::warn!("metadata: lookup for {} failed: {}", track_id, e);
                    TrackInfo::placeholder(&self.placeholder)
                }
                Err(TryRecvError::Empty) => continue,
                Err(TryRecvError::Closed) => {
                    log::debug!("metadata: reply for {} dropped", track_id);
                    TrackInfo::placeholder(&self.placeholder)
                }
            };

            *entry = CacheEntry::Resolved(info);
            resolved += 1;
        }

        resolved
    }

    /// Resolved metadata for `track_id`, if any
    pub fn get(&self, track_id: &str) -> Option<&TrackInfo> {
        match self.entries.get(track_id) {
            Some(CacheEntry::Resolved(info)) => Some(info),
            _ => None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.entries
            .values()
            .any(|entry| matches!(entry, CacheEntry::Pending(_)))
    }

    /// Stop the lookup service
    ///
    /// Lookups still queued are dropped without running and fall back to
    /// the placeholder on the next poll. A lookup already in progress
    /// finishes on the detached thread.
    pub fn teardown(&mut self) {
        if let Some(client) = self.client.take() {
            client.shutdown();
        }
        if let Some(service) = self.service.take() {
            log::debug!(
                "metadata: detaching service thread (running: {})",
                service.is_running()
            );
        }
    }
}
