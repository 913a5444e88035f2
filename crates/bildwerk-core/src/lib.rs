// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — Core types, page formats, and error definitions shared across
// all crates.

pub mod config;
pub mod document;
pub mod error;
pub mod formats;
pub mod human_errors;
pub mod types;

pub use config::AppConfig;
pub use document::Document;
pub use error::BildwerkError;
pub use formats::{PageFormat, mm_to_points, points_to_mm};
pub use types::*;
