//! Disc codec - disc ⇄ URL-fragment token
//!
//! Encoding writes the canonical JSON shape and compresses it with the
//! LZ-String "encoded URI component" transform, so the token can sit in a
//! URL fragment without escaping and stays interchangeable with tokens made
//! by the browser build.
//!
//! Payloads carry no version number. Decoding sniffs the structure instead,
//! in priority order:
//!
//! 1. current: `tracks` array + `meta` object
//! 2. intermediate: `playlist` array + `meta` object (field rename only)
//! 3. legacy: flat `{ youtubeId, discLabel, senderName, secretMessage }`
//!
//! Anything else decodes to `None`. [`decode`] never fails loudly; use
//! [`decode_detailed`] when the reason matters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::placement::Layout;
use super::{normalize_sender, null_as_default, Disc, DiscMeta, DEFAULT_TITLE};

/// Why a token did not decode
#[derive(Error, Debug)]
pub enum CodecError {
    /// Nothing after the `#`
    #[error("Share token is empty")]
    Empty,

    /// Character outside the encoded-URI-component alphabet
    #[error("Invalid character {0:?} in share token")]
    InvalidCharacter(char),

    /// Decompression ran out of data or hit an unknown code
    #[error("Share token did not decompress")]
    Decompress,

    /// Decompressed text was not valid UTF-16
    #[error("Share token decompressed to invalid text")]
    InvalidText,

    /// Decompressed text was not JSON
    #[error("Share payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON that matches none of the known payload shapes
    #[error("Share payload matches no known disc shape")]
    UnknownShape,

    /// Payload shape is right but it carries no playable track
    #[error("Share payload has no tracks")]
    NoTracks,
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

// ============================================================================
// Wire shapes
// ============================================================================

/// Canonical payload as written by [`encode`]
#[derive(Serialize)]
struct CanonicalOut<'a> {
    tracks: &'a [String],
    photos: &'a [String],
    note: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<&'a Layout>,
    meta: MetaOut<'a>,
}

#[derive(Serialize)]
struct MetaOut<'a> {
    title: &'a str,
    sender: &'a str,
    /// Mirrors the top-level note for readers that only look inside `meta`
    note: &'a str,
}

/// Label block as found in current and intermediate payloads
#[derive(Deserialize)]
struct MetaIn {
    title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    sender: String,
    #[serde(default, alias = "message")]
    note: Option<String>,
}

#[derive(Deserialize)]
struct CurrentShape {
    tracks: Vec<String>,
    meta: MetaIn,
    #[serde(default, deserialize_with = "null_as_default")]
    photos: Vec<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    layout: Option<Layout>,
}

#[derive(Deserialize)]
struct PlaylistShape {
    playlist: Vec<String>,
    meta: MetaIn,
    #[serde(default, deserialize_with = "null_as_default")]
    photos: Vec<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    layout: Option<Layout>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyShape {
    youtube_id: String,
    #[serde(default)]
    disc_label: Option<String>,
    #[serde(default)]
    sender_name: Option<String>,
    #[serde(default)]
    secret_message: Option<String>,
}

/// Every payload shape ever shipped, tried in declaration order
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Current(CurrentShape),
    Playlist(PlaylistShape),
    Legacy(LegacyShape),
}

impl Payload {
    fn into_disc(self) -> CodecResult<Disc> {
        let disc = match self {
            Payload::Current(shape) => {
                log::debug!("codec: current payload with {} track(s)", shape.tracks.len());
                from_listed(shape.tracks, shape.meta, shape.photos, shape.note, shape.layout)
            }
            Payload::Playlist(shape) => {
                log::debug!("codec: playlist payload with {} track(s)", shape.playlist.len());
                from_listed(shape.playlist, shape.meta, shape.photos, shape.note, shape.layout)
            }
            Payload::Legacy(shape) => {
                log::debug!("codec: legacy single-track payload");
                from_legacy(shape)
            }
        };

        if disc.tracks.is_empty() || disc.tracks.iter().all(|t| t.trim().is_empty()) {
            return Err(CodecError::NoTracks);
        }
        Ok(disc)
    }
}

fn from_listed(
    tracks: Vec<String>,
    meta: MetaIn,
    photos: Vec<String>,
    note: Option<String>,
    layout: Option<Layout>,
) -> Disc {
    Disc {
        tracks,
        photos,
        note: resolve_note(note, meta.note),
        layout,
        meta: DiscMeta {
            title: meta.title,
            sender: normalize_sender(meta.sender),
        },
    }
}

fn from_legacy(shape: LegacyShape) -> Disc {
    let title = shape
        .disc_label
        .filter(|label| !label.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    Disc {
        tracks: vec![shape.youtube_id],
        photos: Vec::new(),
        note: shape.secret_message.unwrap_or_default(),
        layout: None,
        meta: DiscMeta {
            title,
            sender: normalize_sender(shape.sender_name.unwrap_or_default()),
        },
    }
}

/// Pick the single note from the top-level and `meta` copies
///
/// Top level wins when set. Two different non-empty copies are reported,
/// since historical builds disagreed about which one is authoritative.
fn resolve_note(top: Option<String>, in_meta: Option<String>) -> String {
    let top = top.unwrap_or_default();
    let in_meta = in_meta.unwrap_or_default();

    if top.is_empty() {
        return in_meta;
    }
    if !in_meta.is_empty() && in_meta != top {
        log::warn!(
            "codec: disc carries two different notes ({} vs {} chars), using the top-level one",
            top.chars().count(),
            in_meta.chars().count()
        );
    }
    top
}

// ============================================================================
// Token transform
// ============================================================================

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '$')
}

/// Strip a leading `#` if present
fn strip_hash(token: &str) -> &str {
    token.strip_prefix('#').unwrap_or(token)
}

/// Serialize a disc to its canonical JSON text
pub fn to_json(disc: &Disc, pretty: bool) -> CodecResult<String> {
    let payload = CanonicalOut {
        tracks: &disc.tracks,
        photos: &disc.photos,
        note: &disc.note,
        layout: disc.layout.as_ref(),
        meta: MetaOut {
            title: &disc.meta.title,
            sender: &disc.meta.sender,
            note: &disc.note,
        },
    };

    let json = if pretty {
        serde_json::to_string_pretty(&payload)?
    } else {
        serde_json::to_string(&payload)?
    };
    Ok(json)
}

/// Encode a disc into a URL-fragment-safe token (without the `#`)
pub fn encode(disc: &Disc) -> CodecResult<String> {
    let json = to_json(disc, false)?;
    let token = lz_str::compress_to_encoded_uri_component(json.as_str());
    log::debug!("codec: encoded {} bytes of JSON into {} token chars", json.len(), token.len());
    Ok(token)
}

/// Decode a token (with or without leading `#`), reporting why it failed
pub fn decode_detailed(token: &str) -> CodecResult<Disc> {
    let raw = strip_hash(token.trim());
    if raw.is_empty() {
        return Err(CodecError::Empty);
    }
    if let Some(bad) = raw.chars().find(|c| !is_token_char(*c)) {
        return Err(CodecError::InvalidCharacter(bad));
    }

    let wide = lz_str::decompress_from_encoded_uri_component(raw).ok_or(CodecError::Decompress)?;
    let json = String::from_utf16(&wide).map_err(|_| CodecError::InvalidText)?;
    if json.is_empty() {
        return Err(CodecError::Decompress);
    }

    let value: serde_json::Value = serde_json::from_str(&json)?;
    let payload = Payload::deserialize(value).map_err(|_| CodecError::UnknownShape)?;
    payload.into_disc()
}

/// Decode a token, returning `None` for anything that is not a disc
///
/// Callers treat `None` as "no shareable state present".
pub fn decode(token: &str) -> Option<Disc> {
    match decode_detailed(token) {
        Ok(disc) => Some(disc),
        Err(e) => {
            log::debug!("codec: token rejected: {}", e);
            None
        }
    }
}

/// Extract the fragment token from a full share URL
///
/// A string without `#` is assumed to be a bare token already.
pub fn token_from_url(url: &str) -> &str {
    match url.split_once('#') {
        Some((_, fragment)) => fragment,
        None => url,
    }
}

/// Build a full share URL: `base` with any existing fragment replaced
pub fn share_url(base: &str, disc: &Disc) -> CodecResult<String> {
    let token = encode(disc)?;
    let base = base.split_once('#').map(|(b, _)| b).unwrap_or(base);
    Ok(format!("{}#{}", base, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::LayoutPatch;

    fn sample_disc() -> Disc {
        let mut disc = Disc::new(
            vec![
                "dQw4w9WgXcQ".to_string(),
                "9bZkp7q19f0".to_string(),
                "kJQP7kiw5Fk".to_string(),
            ],
            DiscMeta::new("Summer '09", "Robin"),
        );
        disc.photos = vec!["https://example.com/a.jpg".to_string()];
        disc.note = "press play ✿ and think of me".to_string();
        disc
    }

    /// Compress raw JSON the way the browser build does
    fn token_for(json: &str) -> String {
        lz_str::compress_to_encoded_uri_component(json)
    }

    #[test]
    fn test_roundtrip_canonical() {
        let disc = sample_disc();
        let token = encode(&disc).unwrap();
        assert_eq!(decode(&token), Some(disc));
    }

    #[test]
    fn test_roundtrip_with_layout_and_hash() {
        let disc = sample_disc()
            .with_layout_patch(&LayoutPatch::NoteMoved { x: -12.5, y: 88.0 })
            .with_layout_patch(&LayoutPatch::PhotoMoved { index: 0, x: 3.25, y: -4.0 });
        let token = encode(&disc).unwrap();
        assert_eq!(decode(&format!("#{}", token)), Some(disc));
    }

    #[test]
    fn test_roundtrip_minimal_disc() {
        let disc = Disc::new(vec!["dQw4w9WgXcQ".to_string()], DiscMeta::new("x", ""));
        let token = encode(&disc).unwrap();
        assert_eq!(decode(&token), Some(disc));
    }

    #[test]
    fn test_token_is_fragment_safe() {
        let token = encode(&sample_disc()).unwrap();
        assert!(token.chars().all(is_token_char));
    }

    #[test]
    fn test_decode_canonical_defaults_missing_fields() {
        let token = token_for(r#"{"tracks":["dQw4w9WgXcQ"],"meta":{"title":"Mix","sender":"Sam"}}"#);
        let disc = decode(&token).unwrap();
        assert_eq!(disc.tracks, vec!["dQw4w9WgXcQ"]);
        assert!(disc.photos.is_empty());
        assert_eq!(disc.note, "");
        assert_eq!(disc.layout, None);
        assert_eq!(disc.meta, DiscMeta::new("Mix", "Sam"));
    }

    #[test]
    fn test_decode_playlist_shape() {
        let token = token_for(
            r#"{"playlist":["aaaaaaaaaaa","bbbbbbbbbbb"],"photos":["p.png"],"note":"hi","meta":{"title":"Old","sender":""}}"#,
        );
        let disc = decode(&token).unwrap();
        assert_eq!(disc.tracks, vec!["aaaaaaaaaaa", "bbbbbbbbbbb"]);
        assert_eq!(disc.photos, vec!["p.png"]);
        assert_eq!(disc.note, "hi");
        assert_eq!(disc.meta.sender, "Anonymous");
    }

    #[test]
    fn test_decode_legacy_shape() {
        let token = token_for(
            r#"{"youtubeId":"dQw4w9WgXcQ","discLabel":"Road Trip","senderName":"Alex","secretMessage":"drive safe"}"#,
        );
        let disc = decode(&token).unwrap();
        assert_eq!(disc.tracks, vec!["dQw4w9WgXcQ"]);
        assert_eq!(disc.meta.title, "Road Trip");
        assert_eq!(disc.meta.sender, "Alex");
        assert_eq!(disc.note, "drive safe");
        assert!(disc.photos.is_empty());
        assert!(disc.layout.is_none());
    }

    #[test]
    fn test_decode_legacy_blank_labels() {
        let token = token_for(
            r#"{"youtubeId":"dQw4w9WgXcQ","discLabel":"","senderName":"","secretMessage":""}"#,
        );
        let disc = decode(&token).unwrap();
        assert_eq!(disc.meta.title, "Untitled");
        assert_eq!(disc.meta.sender, "Anonymous");

        let token = token_for(r#"{"youtubeId":"dQw4w9WgXcQ"}"#);
        let disc = decode(&token).unwrap();
        assert_eq!(disc.meta.title, "Untitled");
        assert_eq!(disc.note, "");
    }

    #[test]
    fn test_roundtrip_varied_discs() {
        let many: Vec<String> = (0..40).map(|i| format!("trk{:08}", i)).collect();
        let photos = vec![
            "https://img.example/1.jpg".to_string(),
            "https://img.example/2.jpg".to_string(),
            "https://img.example/3.jpg".to_string(),
        ];

        let mut empty_note = sample_disc();
        empty_note.note = String::new();

        let mut unicode = sample_disc();
        unicode.note = "雨の日 🎧 «écoute» - ñ\n\tsecond line".to_string();
        unicode.meta = DiscMeta::new("ミックス 🌙", "Zoë");

        let mut sparse_photos = Disc::new(vec!["dQw4w9WgXcQ".to_string()], DiscMeta::new("Sparse", "S"));
        sparse_photos.photos = photos.clone();
        let sparse_photos = sparse_photos
            .with_layout_patch(&LayoutPatch::PhotoMoved { index: 2, x: -40.0, y: 12.5 });

        let note_only = sample_disc()
            .with_layout_patch(&LayoutPatch::NoteResized { width: 500.0, height: 10.0 });

        let mut many_tracks = Disc::new(many, DiscMeta::new("Long Drive", ""));
        many_tracks.photos = photos;
        let many_tracks = many_tracks
            .with_layout_patch(&LayoutPatch::NoteMoved { x: 0.0, y: -0.5 })
            .with_layout_patch(&LayoutPatch::PhotoMoved { index: 0, x: 1024.0, y: -0.125 });

        let cases = [
            ("empty note", empty_note),
            ("unicode", unicode),
            ("sparse photo layout", sparse_photos),
            ("note-only layout", note_only),
            ("many tracks", many_tracks),
        ];

        for (name, disc) in cases {
            let token = encode(&disc).unwrap();
            assert!(token.chars().all(is_token_char), "{}", name);
            assert_eq!(decode(&token), Some(disc), "{}", name);
        }
    }

    #[test]
    fn test_null_optional_fields_decode_as_empty() {
        let token = token_for(
            r#"{"tracks":["dQw4w9WgXcQ"],"photos":null,"note":null,"layout":null,"meta":{"title":"Nulls","sender":null,"note":null}}"#,
        );
        let disc = decode(&token).unwrap();
        assert!(disc.photos.is_empty());
        assert_eq!(disc.note, "");
        assert_eq!(disc.layout, None);
        assert_eq!(disc.meta.sender, "Anonymous");

        let token = token_for(
            r#"{"playlist":["dQw4w9WgXcQ"],"photos":null,"layout":{"photos":null},"meta":{"title":"Old"}}"#,
        );
        let disc = decode(&token).unwrap();
        assert!(disc.photos.is_empty());
        assert_eq!(disc.layout, Some(Layout::default()));
    }

    #[test]
    fn test_tracks_take_priority_over_legacy_fields() {
        let token = token_for(
            r#"{"youtubeId":"zzzzzzzzzzz","tracks":["aaaaaaaaaaa"],"meta":{"title":"New","sender":"S"}}"#,
        );
        assert_eq!(decode(&token).unwrap().tracks, vec!["aaaaaaaaaaa"]);
    }

    #[test]
    fn test_note_precedence() {
        // Only meta carries the note
        let token = token_for(r#"{"tracks":["a"],"meta":{"title":"t","sender":"s","note":"inner"}}"#);
        assert_eq!(decode(&token).unwrap().note, "inner");

        // Historical chassis build stored it as meta.message
        let token = token_for(r#"{"tracks":["a"],"meta":{"title":"t","sender":"s","message":"msg"}}"#);
        assert_eq!(decode(&token).unwrap().note, "msg");

        // Divergent copies: top level wins
        let token = token_for(
            r#"{"tracks":["a"],"note":"outer","meta":{"title":"t","sender":"s","note":"inner"}}"#,
        );
        assert_eq!(decode(&token).unwrap().note, "outer");
    }

    #[test]
    fn test_encoded_note_is_mirrored_into_meta() {
        let json = to_json(&sample_disc(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["note"], value["meta"]["note"]);
        assert!(value.get("layout").is_none());
    }

    #[test]
    fn test_decode_garbage_returns_none() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("#"), None);
        assert_eq!(decode("not a token!"), None);
        assert_eq!(decode("%7B%22tracks%22"), None);
        assert_eq!(decode("AAAAAAAAAAAA"), None);

        let token = encode(&sample_disc()).unwrap();
        let truncated = &token[..token.len() / 2];
        assert_eq!(decode(truncated), None);
    }

    #[test]
    fn test_decode_rejects_unknown_and_empty_shapes() {
        assert!(matches!(
            decode_detailed(&token_for(r#"{"hello":"world"}"#)),
            Err(CodecError::UnknownShape)
        ));
        assert!(matches!(
            decode_detailed(&token_for("[1,2,3]")),
            Err(CodecError::UnknownShape)
        ));
        assert!(matches!(
            decode_detailed(&token_for(r#"{"tracks":[],"meta":{"title":"t"}}"#)),
            Err(CodecError::NoTracks)
        ));
        assert!(matches!(
            decode_detailed(&token_for("definitely not json")),
            Err(CodecError::Json(_))
        ));
        assert!(matches!(decode_detailed("a b"), Err(CodecError::InvalidCharacter(' '))));
    }

    #[test]
    fn test_share_url_roundtrip() {
        let disc = sample_disc();
        let url = share_url("https://mixtape.example/#old", &disc).unwrap();
        assert!(url.starts_with("https://mixtape.example/#"));
        assert_eq!(decode(token_from_url(&url)), Some(disc));
        assert_eq!(token_from_url("abc"), "abc");
    }
}
