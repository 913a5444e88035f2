// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page format registry. All dimensions are in points (1 inch = 72 points).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::BildwerkError;

/// Standard page formats.
///
/// Lookup by name never fails: unrecognised names resolve to
/// [`PageFormat::DEFAULT`] so that stale or hand-edited projects still render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageFormat {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PageFormat {
    /// Format used when a name cannot be resolved.
    pub const DEFAULT: PageFormat = PageFormat::A4;

    /// Every registered format, in presentation order.
    pub const ALL: [PageFormat; 6] = [
        Self::A4,
        Self::A3,
        Self::A5,
        Self::Letter,
        Self::Legal,
        Self::Tabloid,
    ];

    /// Resolve a format name, falling back to [`PageFormat::DEFAULT`].
    ///
    /// Names are matched exactly first, then case-insensitively.
    pub fn lookup(name: &str) -> PageFormat {
        match Self::find(name) {
            Some(format) => format,
            None => {
                warn!(
                    requested = name,
                    fallback = Self::DEFAULT.name(),
                    "Unknown page format, using default"
                );
                Self::DEFAULT
            }
        }
    }

    fn find(name: &str) -> Option<PageFormat> {
        let trimmed = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.name() == trimmed)
            .or_else(|| {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|format| format.name().eq_ignore_ascii_case(trimmed))
            })
    }

    /// Display name, also the registry key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::A4 => "A4",
            Self::A3 => "A3",
            Self::A5 => "A5",
            Self::Letter => "Letter",
            Self::Legal => "Legal",
            Self::Tabloid => "Tabloid",
        }
    }

    /// Dimensions in points (width, height), portrait.
    pub fn dimensions_pt(&self) -> (f64, f64) {
        match self {
            Self::A4 => (595.27, 841.89),     // 210mm x 297mm
            Self::A3 => (841.89, 1190.55),    // 297mm x 420mm
            Self::A5 => (419.53, 595.27),     // 148mm x 210mm
            Self::Letter => (612.0, 792.0),   // 8.5" x 11"
            Self::Legal => (612.0, 1008.0),   // 8.5" x 14"
            Self::Tabloid => (792.0, 1224.0), // 11" x 17"
        }
    }

    pub fn width_pt(&self) -> f64 {
        self.dimensions_pt().0
    }

    pub fn height_pt(&self) -> f64 {
        self.dimensions_pt().1
    }

    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f64, f64) {
        let (w, h) = self.dimensions_pt();
        (points_to_mm(w), points_to_mm(h))
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strict parsing, for callers that want to reject typos up front. Rendering
/// goes through [`PageFormat::lookup`] instead.
impl FromStr for PageFormat {
    type Err = BildwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::find(s).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(PageFormat::name).collect();
            BildwerkError::Config(format!(
                "unknown page format '{}' (known: {})",
                s,
                known.join(", ")
            ))
        })
    }
}

/// Convert millimetres to points.
pub fn mm_to_points(mm: f64) -> f64 {
    mm * 72.0 / 25.4
}

/// Convert points to millimetres.
pub fn points_to_mm(points: f64) -> f64 {
    points * 25.4 / 72.0
}
