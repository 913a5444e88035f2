// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{BildwerkError, Result};
use crate::types::PageSpec;

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Page styling applied to projects that do not specify their own.
    pub default_page: PageSpec,
    /// Allowed margin range in points for interactive editing (min, max).
    pub margin_range_pt: (f64, f64),
    /// Allowed per-image scale range for interactive editing (min, max).
    pub scale_range: (f64, f64),
    /// Title embedded in the PDF /Info dictionary.
    pub document_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_page: PageSpec::default(),
            margin_range_pt: (0.0, 100.0),
            scale_range: (0.1, 2.0),
            document_title: "Bildwerk Document".to_string(),
        }
    }
}

impl AppConfig {
    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject ranges that are inverted, negative, or not finite.
    pub fn validate(&self) -> Result<()> {
        let (margin_min, margin_max) = self.margin_range_pt;
        if !(margin_min.is_finite() && margin_max.is_finite())
            || margin_min < 0.0
            || margin_min > margin_max
        {
            return Err(BildwerkError::Config(format!(
                "margin range must satisfy 0 <= min <= max, got ({margin_min}, {margin_max})"
            )));
        }

        let (scale_min, scale_max) = self.scale_range;
        if !(scale_min.is_finite() && scale_max.is_finite())
            || scale_min <= 0.0
            || scale_min > scale_max
        {
            return Err(BildwerkError::Config(format!(
                "scale range must satisfy 0 < min <= max, got ({scale_min}, {scale_max})"
            )));
        }

        if !self.default_page.margin.is_finite() || self.default_page.margin < 0.0 {
            return Err(BildwerkError::Config(format!(
                "default margin must be non-negative, got {}",
                self.default_page.margin
            )));
        }

        Ok(())
    }

    /// Clamp a margin edit into the configured range.
    pub fn clamp_margin(&self, margin_pt: f64) -> f64 {
        let (min, max) = self.margin_range_pt;
        let clamped = if margin_pt.is_nan() {
            min
        } else {
            margin_pt.clamp(min, max)
        };
        if clamped != margin_pt {
            warn!(requested = margin_pt, clamped, "Margin outside configured range");
        }
        clamped
    }

    /// Clamp a scale edit into the configured range.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        let (min, max) = self.scale_range;
        let clamped = if scale.is_nan() {
            1.0_f64.clamp(min, max)
        } else {
            scale.clamp(min, max)
        };
        if clamped != scale {
            warn!(requested = scale, clamped, "Scale outside configured range");
        }
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_page.format_name, "A4");
        assert_eq!(config.default_page.margin, 36.0);
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let mut config = AppConfig::default();
        config.margin_range_pt = (50.0, 10.0);
        assert!(matches!(config.validate(), Err(BildwerkError::Config(_))));

        let mut config = AppConfig::default();
        config.scale_range = (0.0, 2.0);
        assert!(matches!(config.validate(), Err(BildwerkError::Config(_))));

        let mut config = AppConfig::default();
        config.default_page.margin = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn clamps_edits_into_range() {
        let config = AppConfig::default();
        assert_eq!(config.clamp_margin(-5.0), 0.0);
        assert_eq!(config.clamp_margin(500.0), 100.0);
        assert_eq!(config.clamp_margin(36.0), 36.0);
        assert_eq!(config.clamp_scale(0.0), 0.1);
        assert_eq!(config.clamp_scale(9.0), 2.0);
        assert_eq!(config.clamp_scale(1.5), 1.5);
        assert_eq!(config.clamp_scale(f64::NAN), 1.0);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bildwerk.json");
        std::fs::write(&path, r#"{"document_title": "Holiday"}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.document_title, "Holiday");
        assert_eq!(config.scale_range, (0.1, 2.0));
        assert_eq!(config.margin_range_pt, (0.0, 100.0));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bildwerk.json");
        let mut config = AppConfig::default();
        config.default_page.format_name = "Letter".into();
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }
}
