// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-render — Page rendering and PDF output for Bildwerk.
//
// Provides the image transform pipeline (load, crop, rotate, scale, place),
// page composition against a page spec, document assembly into multi-page
// PDFs, and PDF inspection/merging.

pub mod assemble;
pub mod compose;
pub mod image;
pub mod pdf;

#[cfg(test)]
mod testutil;

// Re-export the primary structs so callers can use `bildwerk_render::DocumentAssembler` etc.
pub use assemble::DocumentAssembler;
pub use compose::PageCompositor;
pub use crate::image::processor::ImageProcessor;
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
