// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: per-image transform parameters and document-wide page
// styling.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Crop rectangle in normalised coordinates (fractions of the source image).
///
/// Out-of-range values are clamped when the crop is applied, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    /// The whole image.
    pub const FULL: CropRect = CropRect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when this is exactly the default full-image rectangle.
    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }
}

impl Default for CropRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// Clockwise rotation in right-angle steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Normalise an angle in degrees to the nearest right angle.
    ///
    /// Negative angles count counter-clockwise, so `-90` is `Deg270`.
    pub fn from_degrees(degrees: i32) -> Self {
        let normalised = degrees.rem_euclid(360);
        // Round to the nearest quarter turn; 315..360 wraps back to 0.
        match ((normalised + 45) / 90) % 4 {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// The rotation that undoes this one.
    pub fn inverse(&self) -> Self {
        Self::from_degrees(-self.degrees())
    }
}

impl From<i32> for Rotation {
    fn from(degrees: i32) -> Self {
        Self::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Where an image's encoded bytes come from. Both variants are read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// An image file on disk.
    Path(PathBuf),
    /// Encoded image bytes already in memory. Not persisted in project files.
    #[serde(skip)]
    Bytes(Arc<[u8]>),
}

impl ImageSource {
    /// Human-readable label used in logs and errors.
    pub fn label(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes(_) => "<memory>".to_string(),
        }
    }

    /// Resolve a relative path against `base`. Absolute paths and in-memory
    /// sources are returned unchanged.
    pub fn resolved_against(&self, base: &Path) -> Self {
        match self {
            Self::Path(path) if path.is_relative() => Self::Path(base.join(path)),
            other => other.clone(),
        }
    }
}

/// One image in the document, together with its transform parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub source: ImageSource,
    /// Multiplier on the fitted (or native) size. 1.0 = unchanged.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Normalised horizontal placement (0 = left, 0.5 = centre, 1 = right).
    #[serde(default = "default_position")]
    pub position_x: f64,
    /// Normalised vertical placement (0 = top, 0.5 = centre, 1 = bottom).
    #[serde(default = "default_position")]
    pub position_y: f64,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub crop: CropRect,
    /// Fit inside the page margins while preserving aspect ratio.
    #[serde(default = "default_fit_to_page")]
    pub fit_to_page: bool,
}

fn default_scale() -> f64 {
    1.0
}

fn default_position() -> f64 {
    0.5
}

fn default_fit_to_page() -> bool {
    true
}

impl ImageEntry {
    /// An entry for a file on disk with default parameters.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_source(ImageSource::Path(path.into()))
    }

    /// An entry for encoded image bytes held in memory.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::with_source(ImageSource::Bytes(bytes.into()))
    }

    pub fn with_source(source: ImageSource) -> Self {
        Self {
            source,
            scale: default_scale(),
            position_x: default_position(),
            position_y: default_position(),
            rotation: Rotation::Deg0,
            crop: CropRect::FULL,
            fit_to_page: default_fit_to_page(),
        }
    }
}

/// RGB colour, 0–255 per channel. Serialised as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    pub fn channels(&self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Page styling shared by every page of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    /// Key into [`crate::PageFormat`]; unknown names fall back to A4.
    pub format_name: String,
    pub background: Rgb,
    /// Margin in points on every side.
    pub margin: f64,
}

impl PageSpec {
    /// Resolve the page format, never failing.
    pub fn format(&self) -> crate::PageFormat {
        crate::PageFormat::lookup(&self.format_name)
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            format_name: crate::PageFormat::DEFAULT.name().to_string(),
            background: Rgb::WHITE,
            margin: 36.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_normalises_degrees() {
        assert_eq!(Rotation::from_degrees(0), Rotation::Deg0);
        assert_eq!(Rotation::from_degrees(90), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(450), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(-90), Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(360), Rotation::Deg0);
        // Off-axis values snap to the nearest quarter turn.
        assert_eq!(Rotation::from_degrees(100), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(350), Rotation::Deg0);
    }

    #[test]
    fn rotation_inverse() {
        assert_eq!(Rotation::Deg90.inverse(), Rotation::Deg270);
        assert_eq!(Rotation::Deg180.inverse(), Rotation::Deg180);
        assert_eq!(Rotation::Deg0.inverse(), Rotation::Deg0);
    }

    #[test]
    fn crop_default_is_full() {
        assert!(CropRect::default().is_full());
        assert!(!CropRect::new(0.0, 0.0, 0.5, 1.0).is_full());
    }

    #[test]
    fn entry_defaults() {
        let entry = ImageEntry::new("photo.jpg");
        assert_eq!(entry.scale, 1.0);
        assert_eq!(entry.position_x, 0.5);
        assert_eq!(entry.position_y, 0.5);
        assert_eq!(entry.rotation, Rotation::Deg0);
        assert!(entry.crop.is_full());
        assert!(entry.fit_to_page);
    }

    #[test]
    fn entry_deserialises_with_defaults() {
        let json = r#"{"source": {"path": "scan.png"}, "rotation": 270}"#;
        let entry: ImageEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.source, ImageSource::Path(PathBuf::from("scan.png")));
        assert_eq!(entry.rotation, Rotation::Deg270);
        assert_eq!(entry.scale, 1.0);
        assert!(entry.fit_to_page);
    }

    #[test]
    fn page_spec_serialises_colour_as_array() {
        let spec = PageSpec {
            background: Rgb(10, 20, 30),
            ..PageSpec::default()
        };
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["background"], serde_json::json!([10, 20, 30]));
        assert_eq!(json["format_name"], "A4");
    }

    #[test]
    fn relative_sources_resolve_against_base() {
        let source = ImageSource::Path(PathBuf::from("img/a.png"));
        let resolved = source.resolved_against(Path::new("/projects/album"));
        assert_eq!(
            resolved,
            ImageSource::Path(PathBuf::from("/projects/album/img/a.png"))
        );

        let bytes = ImageSource::Bytes(Arc::from(vec![1u8, 2, 3]));
        assert_eq!(bytes.resolved_against(Path::new("/x")), bytes);
        assert_eq!(bytes.label(), "<memory>");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn from_degrees_is_periodic(degrees in -3600i32..3600) {
            prop_assert_eq!(
                Rotation::from_degrees(degrees),
                Rotation::from_degrees(degrees + 360)
            );
        }

        #[test]
        fn degrees_round_trip(quarter in 0i32..4) {
            let rotation = Rotation::from_degrees(quarter * 90);
            prop_assert_eq!(rotation.degrees(), quarter * 90);
            prop_assert_eq!(Rotation::from_degrees(rotation.degrees()), rotation);
        }

        #[test]
        fn inverse_cancels(quarter in 0i32..4) {
            let rotation = Rotation::from_degrees(quarter * 90);
            let total = rotation.degrees() + rotation.inverse().degrees();
            prop_assert_eq!(total % 360, 0);
        }
    }
}
