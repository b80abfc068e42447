//! oEmbed-backed track lookup

use serde::Deserialize;

use super::{LookupError, TrackInfo, TrackLookup};
use crate::config::MetadataConfig;
use crate::track::{is_valid_track_id, watch_url};

#[derive(Debug, Deserialize)]
struct OembedResponse {
    title: String,
    #[serde(default)]
    author_name: Option<String>,
}

/// Resolves titles through an oEmbed endpoint (blocking HTTP)
pub struct OembedLookup {
    agent: ureq::Agent,
    endpoint: String,
}

impl OembedLookup {
    pub fn new(config: &MetadataConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self {
            agent,
            endpoint: config.endpoint.clone(),
        }
    }
}

impl TrackLookup for OembedLookup {
    fn lookup(&self, track_id: &str) -> Result<TrackInfo, LookupError> {
        if !is_valid_track_id(track_id) {
            return Err(LookupError::InvalidId(track_id.to_string()));
        }

        let response = self
            .agent
            .get(&self.endpoint)
            .query("url", &watch_url(track_id))
            .query("format", "json")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => LookupError::Status(code),
                other => LookupError::Http(other.to_string()),
            })?;

        let body = response
            .into_string()
            .map_err(|e| LookupError::Http(e.to_string()))?;

        parse_response(&body)
    }
}

fn parse_response(body: &str) -> Result<TrackInfo, LookupError> {
    let response: OembedResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Parse(e.to_string()))?;

    let title = response.title.trim();
    if title.is_empty() {
        return Err(LookupError::Parse("empty title".to_string()));
    }

    Ok(TrackInfo {
        title: title.to_string(),
        author: response
            .author_name
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()),
    })
}
