// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — loading, crop/rotate/resize, and the page render pipeline.

pub mod pipeline;
pub mod processor;

pub use pipeline::render_page;
pub use processor::ImageProcessor;
