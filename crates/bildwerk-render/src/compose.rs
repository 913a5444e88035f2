// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page compositor — resolves a page spec once and renders entries against it.

use bildwerk_core::error::Result;
use bildwerk_core::{ImageEntry, PageFormat, PageSpec};
use image::RgbImage;
use tracing::{debug, instrument};

use crate::image::pipeline;

/// Renders finished page rasters for one document's page spec.
///
/// Preview and export both go through [`PageCompositor::compose_page`], so a
/// given entry always produces the same pixels in either path.
#[derive(Debug, Clone)]
pub struct PageCompositor {
    spec: PageSpec,
    /// Resolved once; unknown format names have already fallen back to A4.
    format: PageFormat,
}

impl PageCompositor {
    pub fn new(spec: &PageSpec) -> Self {
        let format = spec.format();
        debug!(
            requested = %spec.format_name,
            resolved = %format,
            margin = spec.margin,
            "Page format resolved"
        );
        Self {
            spec: spec.clone(),
            format,
        }
    }

    pub fn format(&self) -> PageFormat {
        self.format
    }

    pub fn spec(&self) -> &PageSpec {
        &self.spec
    }

    /// Physical page size in points.
    pub fn page_size_pt(&self) -> (f64, f64) {
        self.format.dimensions_pt()
    }

    /// Raster size of every page this compositor produces.
    pub fn page_pixel_size(&self) -> (u32, u32) {
        let (w, h) = self.page_size_pt();
        pipeline::page_pixel_size(w, h)
    }

    /// Render one entry onto a page.
    #[instrument(skip_all, fields(format = %self.format, source = %entry.source.label()))]
    pub fn compose_page(&self, entry: &ImageEntry) -> Result<RgbImage> {
        let (w, h) = self.page_size_pt();
        pipeline::render_page(entry, w, h, self.spec.margin, self.spec.background)
    }

    /// A page showing only the background, for the empty-document state.
    pub fn blank_page(&self) -> RgbImage {
        let (w, h) = self.page_pixel_size();
        pipeline::blank_page(w, h, self.spec.background)
    }

    /// Render `entry`, or a blank page when there is nothing to show.
    pub fn compose(&self, entry: Option<&ImageEntry>) -> Result<RgbImage> {
        match entry {
            Some(entry) => self.compose_page(entry),
            None => Ok(self.blank_page()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{close_to, solid_entry};
    use bildwerk_core::Rgb;

    #[test]
    fn unknown_format_renders_at_a4() {
        let spec = PageSpec {
            format_name: "Poster-XL".into(),
            ..PageSpec::default()
        };
        let compositor = PageCompositor::new(&spec);
        assert_eq!(compositor.format(), PageFormat::A4);
        assert_eq!(compositor.page_pixel_size(), (595, 841));

        let page = compositor.compose_page(&solid_entry(10, 10, [1, 2, 3])).unwrap();
        assert_eq!(page.dimensions(), (595, 841));
    }

    #[test]
    fn blank_page_uses_background() {
        let spec = PageSpec {
            format_name: "Letter".into(),
            background: Rgb(12, 34, 56),
            margin: 0.0,
        };
        let compositor = PageCompositor::new(&spec);
        let page = compositor.compose(None).unwrap();
        assert_eq!(page.dimensions(), (612, 792));
        assert!(page.pixels().all(|p| p.0 == [12, 34, 56]));
    }

    #[test]
    fn margin_shrinks_fitted_image() {
        let entry = solid_entry(100, 100, [255, 0, 0]);
        let tight = PageSpec {
            margin: 0.0,
            background: Rgb::BLACK,
            ..PageSpec::default()
        };
        let roomy = PageSpec {
            margin: 100.0,
            ..tight.clone()
        };

        let count_red = |spec: &PageSpec| {
            PageCompositor::new(spec)
                .compose_page(&entry)
                .unwrap()
                .pixels()
                .filter(|p| close_to(p, [255, 0, 0]))
                .count()
        };
        // 595x595 square vs 395x395 square.
        assert!(count_red(&tight) > count_red(&roomy));
        assert_eq!(count_red(&roomy), 395 * 395);
    }
}
