// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildwerk.

use thiserror::Error;

/// Top-level error type for all Bildwerk operations.
///
/// Unknown page formats are deliberately absent: they resolve to the default
/// format instead of failing.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Rendering errors --
    #[error("failed to load image {path}: {reason}")]
    ImageLoad { path: String, reason: String },

    #[error("image encoding failed: {0}")]
    ImageEncode(String),

    #[error("document has no pages to write")]
    EmptyDocument,

    // -- Output errors --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;
