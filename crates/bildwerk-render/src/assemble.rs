// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembler — turns an ordered list of image entries into a PDF,
// one page per entry, and renders single-page previews through the same path.

use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{Document, ImageEntry, PageSpec};
use image::RgbImage;
use tracing::{debug, info, instrument};

use crate::compose::PageCompositor;
use crate::pdf::writer::PdfWriter;

/// Builds multi-page PDFs from image entries.
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    /// Title embedded in the PDF metadata; the writer's default when unset.
    title: Option<String>,
}

impl DocumentAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }

    /// Render every entry to its page raster, in order.
    ///
    /// The first failing entry aborts the whole run.
    #[instrument(skip_all, fields(entries = entries.len(), format = %page.format_name))]
    pub fn render_pages(&self, entries: &[ImageEntry], page: &PageSpec) -> Result<Vec<RgbImage>> {
        let compositor = PageCompositor::new(page);
        render_with(&compositor, entries)
    }

    /// Build the PDF bytes for `entries`.
    ///
    /// An empty list fails with [`BildwerkError::EmptyDocument`] before any
    /// page is rendered.
    #[instrument(skip_all, fields(entries = entries.len(), format = %page.format_name))]
    pub fn build(&self, entries: &[ImageEntry], page: &PageSpec) -> Result<Vec<u8>> {
        if entries.is_empty() {
            return Err(BildwerkError::EmptyDocument);
        }

        let compositor = PageCompositor::new(page);
        let pages = render_with(&compositor, entries)?;

        let mut writer = PdfWriter::new(compositor.format());
        if let Some(title) = &self.title {
            writer.set_title(title.clone());
        }
        let bytes = writer.write_pages(&pages)?;

        info!(pages = pages.len(), output_bytes = bytes.len(), "Document built");
        Ok(bytes)
    }

    /// Build the PDF and write it to `path`.
    ///
    /// Nothing is written unless the whole build succeeds.
    pub fn build_to_file(
        &self,
        entries: &[ImageEntry],
        page: &PageSpec,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = self.build(entries, page)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }

    /// Render the page at `index`, clamped into range. With no entries the
    /// result is the blank background page.
    #[instrument(skip(self, entries, page), fields(entries = entries.len()))]
    pub fn preview_page(
        &self,
        entries: &[ImageEntry],
        page: &PageSpec,
        index: usize,
    ) -> Result<RgbImage> {
        let compositor = PageCompositor::new(page);
        let clamped = index.min(entries.len().saturating_sub(1));
        if clamped != index {
            debug!(requested = index, clamped, "Preview index clamped");
        }
        compositor.compose(entries.get(clamped))
    }

    pub fn build_document(&self, document: &Document) -> Result<Vec<u8>> {
        self.build(document.entries(), &document.page)
    }

    /// Preview the focused entry, or the first one when nothing is focused.
    pub fn preview_focused(&self, document: &Document) -> Result<RgbImage> {
        let index = document.focused().unwrap_or(0);
        self.preview_page(document.entries(), &document.page, index)
    }
}

fn render_with(compositor: &PageCompositor, entries: &[ImageEntry]) -> Result<Vec<RgbImage>> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let page = compositor.compose_page(entry)?;
            debug!(page = index + 1, "Page rendered");
            Ok(page)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::PdfReader;
    use crate::testutil::{close_to, entry_for, gradient_image, solid_entry};
    use bildwerk_core::{Rgb, Rotation};

    const RED: [u8; 3] = [255, 0, 0];
    const GREEN: [u8; 3] = [0, 255, 0];
    const BLUE: [u8; 3] = [0, 0, 255];

    fn coloured_entries() -> Vec<ImageEntry> {
        vec![
            solid_entry(40, 40, RED),
            solid_entry(40, 40, GREEN),
            solid_entry(40, 40, BLUE),
        ]
    }

    fn centre(page: &RgbImage) -> &image::Rgb<u8> {
        page.get_pixel(page.width() / 2, page.height() / 2)
    }

    #[test]
    fn preview_matches_build_pixels() {
        let mut rotated = entry_for(&gradient_image(120, 80));
        rotated.rotation = Rotation::Deg90;
        rotated.scale = 0.7;
        rotated.position_x = 0.1;
        let entries = vec![rotated, solid_entry(30, 60, GREEN)];
        let page = PageSpec::default();

        let assembler = DocumentAssembler::new();
        let rendered = assembler.render_pages(&entries, &page).unwrap();
        for (index, raster) in rendered.iter().enumerate() {
            let preview = assembler.preview_page(&entries, &page, index).unwrap();
            assert_eq!(&preview, raster, "page {index} differs");
        }
    }

    #[test]
    fn empty_build_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.pdf");

        let result = DocumentAssembler::new().build_to_file(&[], &PageSpec::default(), &out);
        assert!(matches!(result, Err(BildwerkError::EmptyDocument)));
        assert!(!out.exists());
    }

    #[test]
    fn one_pdf_page_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("album.pdf");
        let page = PageSpec {
            format_name: "A5".into(),
            ..PageSpec::default()
        };

        DocumentAssembler::with_title("Album")
            .build_to_file(&coloured_entries(), &page, &out)
            .unwrap();

        let reader = PdfReader::open(&out).unwrap();
        assert_eq!(reader.page_count(), 3);
        for (w, h) in reader.page_sizes_pt().unwrap() {
            assert!((w - 419.53).abs() < 0.5);
            assert!((h - 595.27).abs() < 0.5);
        }
    }

    #[test]
    fn pages_follow_document_order() {
        let mut document = Document::with_entries(PageSpec::default(), coloured_entries());
        assert!(document.move_down(0));

        let pages = DocumentAssembler::new()
            .render_pages(document.entries(), &document.page)
            .unwrap();
        let centres: Vec<bool> = pages
            .iter()
            .zip([GREEN, RED, BLUE])
            .map(|(page, expected)| close_to(centre(page), expected))
            .collect();
        assert_eq!(centres, vec![true, true, true]);
    }

    #[test]
    fn preview_index_is_clamped() {
        let entries = coloured_entries();
        let page = PageSpec::default();
        let assembler = DocumentAssembler::new();

        let last = assembler.preview_page(&entries, &page, 2).unwrap();
        let beyond = assembler.preview_page(&entries, &page, 99).unwrap();
        assert_eq!(last, beyond);
        assert!(close_to(centre(&beyond), BLUE));
    }

    #[test]
    fn preview_of_empty_list_is_blank() {
        let page = PageSpec {
            background: Rgb(9, 9, 9),
            ..PageSpec::default()
        };
        let preview = DocumentAssembler::new().preview_page(&[], &page, 0).unwrap();
        assert_eq!(preview.dimensions(), (595, 841));
        assert!(preview.pixels().all(|p| p.0 == [9, 9, 9]));
    }

    #[test]
    fn preview_focused_follows_focus() {
        let mut document = Document::with_entries(PageSpec::default(), coloured_entries());
        assert!(document.focus(1));

        let preview = DocumentAssembler::new().preview_focused(&document).unwrap();
        assert!(close_to(centre(&preview), GREEN));
    }

    #[test]
    fn load_failure_aborts_build() {
        let entries = vec![
            solid_entry(10, 10, RED),
            ImageEntry::new("/nonexistent/bildwerk/gone.png"),
        ];
        let err = DocumentAssembler::new()
            .build(&entries, &PageSpec::default())
            .err()
            .unwrap();
        assert!(matches!(err, BildwerkError::ImageLoad { .. }));
    }

    #[test]
    fn build_document_uses_document_page() {
        let page = PageSpec {
            format_name: "Letter".into(),
            ..PageSpec::default()
        };
        let document = Document::with_entries(page, vec![solid_entry(8, 8, RED)]);
        let bytes = DocumentAssembler::new().build_document(&document).unwrap();

        let sizes = PdfReader::from_bytes(&bytes).unwrap().page_sizes_pt().unwrap();
        assert_eq!(sizes.len(), 1);
        assert!((sizes[0].0 - 612.0).abs() < 0.5);
    }
}
