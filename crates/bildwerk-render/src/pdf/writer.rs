// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serialise composed page rasters as fixed-size PDF pages using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{PageFormat, points_to_mm};
use image::RgbImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

/// Rendering convention: one raster pixel per point.
const RASTER_DPI: f32 = 72.0;

/// Writes one full-bleed raster per PDF page.
///
/// Every page has the physical size of the writer's [`PageFormat`]; each
/// raster is stretched to cover its page exactly, so a raster rendered at the
/// page's pixel size maps 1:1 onto points.
pub struct PdfWriter {
    format: PageFormat,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    pub fn new(format: PageFormat) -> Self {
        Self {
            format,
            title: None,
        }
    }

    /// Create a new writer defaulting to A4.
    pub fn a4() -> Self {
        Self::new(PageFormat::A4)
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Page dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_pt, h_pt) = self.format.dimensions_pt();
        (Mm(points_to_mm(w_pt) as f32), Mm(points_to_mm(h_pt) as f32))
    }

    /// Serialise `pages` in order, one raster per page.
    ///
    /// An empty slice is rejected rather than producing a page-less PDF.
    #[instrument(skip_all, fields(pages = pages.len(), format = %self.format))]
    pub fn write_pages(&self, pages: &[RgbImage]) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(BildwerkError::EmptyDocument);
        }

        let title = self.title.as_deref().unwrap_or("Bildwerk Document");
        let (page_w, page_h) = self.page_dimensions();
        let (page_w_pt, page_h_pt) = self.format.dimensions_pt();

        info!(title, "Writing image PDF");

        let mut doc = PdfDocument::new(title);
        let mut pdf_pages: Vec<PdfPage> = Vec::with_capacity(pages.len());

        for (index, raster) in pages.iter().enumerate() {
            let (px_w, px_h) = raster.dimensions();
            if px_w == 0 || px_h == 0 {
                return Err(BildwerkError::Pdf(format!(
                    "page {} has an empty raster ({}x{})",
                    index + 1,
                    px_w,
                    px_h
                )));
            }

            let raw = RawImage {
                pixels: RawImageData::U8(raster.as_raw().clone()),
                width: px_w as usize,
                height: px_h as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            // At 72 DPI the raster's natural size is px_w x px_h points;
            // stretch it so truncated page pixels still cover the full page.
            let scale_x = page_w_pt as f32 / px_w as f32;
            let scale_y = page_h_pt as f32 / px_h as f32;

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    dpi: Some(RASTER_DPI),
                    rotate: None,
                },
            }];

            pdf_pages.push(PdfPage::new(page_w, page_h, ops));
            debug!(page = index + 1, px_w, px_h, scale_x, scale_y, "Page placed");
        }

        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        debug!(
            output_bytes = output.len(),
            warnings = warnings.len(),
            "PDF serialised"
        );
        Ok(output)
    }
}
