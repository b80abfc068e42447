//! Element placement for the note and photos around the device
//!
//! Layout is sparse: anything the user has not dragged keeps a computed
//! default placement. Photo entries are indexed by photo position; a `None`
//! slot means "use the default for this index".

use serde::{Deserialize, Serialize};

/// Smallest note edge length (px)
pub const NOTE_MIN_SIZE: f64 = 120.0;

/// Largest note edge length (px)
pub const NOTE_MAX_SIZE: f64 = 320.0;

/// Note edge length when the disc carries no size
pub const NOTE_DEFAULT_SIZE: f64 = 160.0;

/// Note position when the disc carries none
pub const NOTE_DEFAULT_POSITION: Point = Point { x: 40.0, y: 60.0 };

/// A 2D offset relative to the device centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Placement of the sticky note
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NotePlacement {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "w", alias = "width", default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(rename = "h", alias = "height", default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Computed placement of a photo: where it sits and how far it is tilted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoPlacement {
    pub position: Point,
    /// Tilt in degrees, -15..=15
    pub rotation_deg: f64,
}

/// A single user adjustment, produced when a drag or resize gesture ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutPatch {
    /// The note was dropped at a new position
    NoteMoved { x: f64, y: f64 },
    /// The note was resized from its corner handle
    NoteResized { width: f64, height: f64 },
    /// Photo `index` was dropped at a new position
    PhotoMoved { index: usize, x: f64, y: f64 },
}

/// Sparse per-element placement
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<NotePlacement>,
    #[serde(
        default,
        deserialize_with = "super::null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub photos: Vec<Option<Point>>,
}

impl Layout {
    /// Merge a single adjustment into this layout
    ///
    /// Non-finite coordinates are ignored so a bad gesture can never poison
    /// the share token.
    pub fn apply(&mut self, patch: &LayoutPatch) {
        match *patch {
            LayoutPatch::NoteMoved { x, y } => {
                if !(x.is_finite() && y.is_finite()) {
                    log::warn!("layout: ignoring non-finite note position ({}, {})", x, y);
                    return;
                }
                let note = self.note.get_or_insert(NotePlacement {
                    x,
                    y,
                    width: None,
                    height: None,
                });
                note.x = x;
                note.y = y;
            }
            LayoutPatch::NoteResized { width, height } => {
                if !(width.is_finite() && height.is_finite()) {
                    log::warn!("layout: ignoring non-finite note size {}x{}", width, height);
                    return;
                }
                let note = self.note.get_or_insert(NotePlacement {
                    x: NOTE_DEFAULT_POSITION.x,
                    y: NOTE_DEFAULT_POSITION.y,
                    width: None,
                    height: None,
                });
                note.width = Some(clamp_note_edge(width));
                note.height = Some(clamp_note_edge(height));
            }
            LayoutPatch::PhotoMoved { index, x, y } => {
                if !(x.is_finite() && y.is_finite()) {
                    log::warn!("layout: ignoring non-finite photo {} position ({}, {})", index, x, y);
                    return;
                }
                let Some(len) = index.checked_add(1) else {
                    log::warn!("layout: ignoring photo index {}", index);
                    return;
                };
                if self.photos.len() < len {
                    self.photos.resize(len, None);
                }
                self.photos[index] = Some(Point::new(x, y));
            }
        }
    }

    /// Where the note should be drawn
    pub fn note_position(&self) -> Point {
        self.note
            .map(|n| Point::new(n.x, n.y))
            .unwrap_or(NOTE_DEFAULT_POSITION)
    }

    /// Note size as (width, height), clamped into the allowed range
    pub fn note_size(&self) -> (f64, f64) {
        let width = self.note.and_then(|n| n.width).unwrap_or(NOTE_DEFAULT_SIZE);
        let height = self.note.and_then(|n| n.height).unwrap_or(NOTE_DEFAULT_SIZE);
        (clamp_note_edge(width), clamp_note_edge(height))
    }

    /// Placement for photo `index`, falling back to the radial default
    pub fn photo_placement(&self, index: usize) -> PhotoPlacement {
        let default = default_photo_placement(index);
        match self.photos.get(index).copied().flatten() {
            Some(position) => PhotoPlacement {
                position,
                rotation_deg: default.rotation_deg,
            },
            None => default,
        }
    }
}

/// Default photo spread: golden-angle distribution on three rings
pub fn default_photo_placement(index: usize) -> PhotoPlacement {
    let i = index as f64;
    let radius = 180.0 + (index % 3) as f64 * 80.0;
    let angle = (i * 137.5).to_radians();
    let rotation_deg = ((index * 17) % 31) as f64 - 15.0;

    PhotoPlacement {
        position: Point::new(angle.cos() * radius, angle.sin() * radius),
        rotation_deg,
    }
}

fn clamp_note_edge(value: f64) -> f64 {
    value.clamp(NOTE_MIN_SIZE, NOTE_MAX_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_move_keeps_size() {
        let mut layout = Layout::default();
        layout.apply(&LayoutPatch::NoteResized { width: 200.0, height: 180.0 });
        layout.apply(&LayoutPatch::NoteMoved { x: -20.0, y: 5.0 });

        let note = layout.note.unwrap();
        assert_eq!((note.x, note.y), (-20.0, 5.0));
        assert_eq!(note.width, Some(200.0));
        assert_eq!(note.height, Some(180.0));
    }

    #[test]
    fn test_note_resize_is_clamped() {
        let mut layout = Layout::default();
        layout.apply(&LayoutPatch::NoteResized { width: 50.0, height: 900.0 });

        let note = layout.note.unwrap();
        assert_eq!(note.width, Some(NOTE_MIN_SIZE));
        assert_eq!(note.height, Some(NOTE_MAX_SIZE));
        // Resizing an unplaced note anchors it at the default position
        assert_eq!(layout.note_position(), NOTE_DEFAULT_POSITION);
    }

    #[test]
    fn test_photo_move_pads_missing_entries() {
        let mut layout = Layout::default();
        layout.apply(&LayoutPatch::PhotoMoved { index: 2, x: 1.0, y: 2.0 });

        assert_eq!(layout.photos, vec![None, None, Some(Point::new(1.0, 2.0))]);
        assert_eq!(layout.photo_placement(0), default_photo_placement(0));
        assert_eq!(layout.photo_placement(2).position, Point::new(1.0, 2.0));
    }

    #[test]
    fn test_photo_move_at_max_index_does_not_panic() {
        let mut layout = Layout::default();
        layout.apply(&LayoutPatch::PhotoMoved { index: usize::MAX, x: 1.0, y: 2.0 });
        assert!(layout.photos.is_empty());
    }

    #[test]
    fn test_non_finite_patch_is_ignored() {
        let mut layout = Layout::default();
        layout.apply(&LayoutPatch::NoteMoved { x: f64::NAN, y: 1.0 });
        layout.apply(&LayoutPatch::PhotoMoved { index: 0, x: 1.0, y: f64::INFINITY });
        assert_eq!(layout, Layout::default());
    }

    #[test]
    fn test_default_photo_placement() {
        let first = default_photo_placement(0);
        assert_eq!(first.position, Point::new(180.0, 0.0));
        assert_eq!(first.rotation_deg, -15.0);

        let second = default_photo_placement(1);
        let radius = (second.position.x.powi(2) + second.position.y.powi(2)).sqrt();
        assert!((radius - 260.0).abs() < 1e-9);
        assert_eq!(second.rotation_deg, 2.0);
    }

    #[test]
    fn test_note_size_defaults() {
        let layout = Layout::default();
        assert_eq!(layout.note_size(), (NOTE_DEFAULT_SIZE, NOTE_DEFAULT_SIZE));
    }

    #[test]
    fn test_wire_keys() {
        let mut layout = Layout::default();
        layout.apply(&LayoutPatch::NoteResized { width: 150.0, height: 140.0 });
        let json = serde_json::to_string(&layout).unwrap();
        assert_eq!(json, r#"{"note":{"x":40.0,"y":60.0,"w":150.0,"h":140.0}}"#);

        let parsed: Layout =
            serde_json::from_str(r#"{"note":{"x":1,"y":2,"width":130,"height":125}}"#).unwrap();
        assert_eq!(parsed.note.unwrap().width, Some(130.0));
    }
}
