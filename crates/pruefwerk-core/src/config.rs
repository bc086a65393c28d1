// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Analysis configuration. Built once per request and passed immutably to
// every pipeline stage.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{ForensicsError, Result};

/// Pixel encoding handed to the analyser after rasterisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RasterFormat {
    /// Lossless; the rendered pixels reach the analyser untouched.
    Png,
    /// Pages are JPEG-encoded in memory at `quality` before analysis.
    Jpeg { quality: u8 },
}

/// Options for the rasterisation adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Render resolution. Higher DPI localises artefacts more finely at a
    /// higher cost.
    pub dpi: u32,
    pub format: RasterFormat,
}

impl RenderOptions {
    /// Cheaper settings for on-screen page previews (200 DPI, JPEG 75).
    pub fn preview() -> Self {
        Self {
            dpi: 200,
            format: RasterFormat::Jpeg { quality: 75 },
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: 300,
            format: RasterFormat::Png,
        }
    }
}

/// Inclusive HSV window (all components on a 0-255 scale) for the
/// colour-band highlight detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvBounds {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvBounds {
    /// Whether an (h, s, v) triple lies inside the window.
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
    }
}

impl Default for HsvBounds {
    /// Hue 0..=179 on the OpenCV scale maps to 0..=255 here.
    fn default() -> Self {
        Self {
            lower: [0, 10, 10],
            upper: [(179u32 * 255 / 179) as u8, 255, 245],
        }
    }
}

/// Parameters for the manipulation detector and the adapters around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// JPEG quality used for the ELA recompression (1-100).
    pub ela_quality: u8,
    /// Error level above which a pixel counts as deviating.
    pub deviation_threshold: u8,
    /// Radius of the disk used for morphological opening (2 = 5x5 kernel).
    pub kernel_radius: u8,
    /// Components must have strictly more foreground pixels than this.
    pub min_area: u32,
    pub render: RenderOptions,
    pub highlight: HsvBounds,
    /// Optional wall-clock budget for one request.
    pub timeout_secs: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ela_quality: 90,
            deviation_threshold: 20,
            kernel_radius: 2,
            min_area: 50,
            render: RenderOptions::default(),
            highlight: HsvBounds::default(),
            timeout_secs: None,
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&raw)?;
        debug!(?config, "Analysis configuration loaded");
        Ok(config)
    }

    /// Reject values the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.ela_quality) {
            return Err(ForensicsError::InvalidConfig(format!(
                "ela_quality must be in 1..=100, got {}",
                self.ela_quality
            )));
        }
        if !(1..=1200).contains(&self.render.dpi) {
            return Err(ForensicsError::InvalidConfig(format!(
                "render dpi must be in 1..=1200, got {}",
                self.render.dpi
            )));
        }
        if let RasterFormat::Jpeg { quality } = self.render.format
            && !(1..=100).contains(&quality)
        {
            return Err(ForensicsError::InvalidConfig(format!(
                "render JPEG quality must be in 1..=100, got {}",
                quality
            )));
        }
        if self.kernel_radius > 32 {
            return Err(ForensicsError::InvalidConfig(format!(
                "kernel_radius must be at most 32, got {}",
                self.kernel_radius
            )));
        }
        let bounds = &self.highlight;
        if (0..3).any(|i| bounds.lower[i] > bounds.upper[i]) {
            return Err(ForensicsError::InvalidConfig(format!(
                "highlight lower bound {:?} exceeds upper bound {:?}",
                bounds.lower, bounds.upper
            )));
        }
        Ok(())
    }

    /// The request budget, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.ela_quality, 90);
        assert_eq!(config.deviation_threshold, 20);
        assert_eq!(config.kernel_radius, 2);
        assert_eq!(config.min_area, 50);
        assert_eq!(config.render.dpi, 300);
        assert_eq!(config.highlight.upper, [255, 255, 245]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = AnalysisConfig::from_json_str(r#"{ "min_area": 150 }"#).unwrap();
        assert_eq!(config.min_area, 150);
        assert_eq!(config.ela_quality, 90);
    }

    #[test]
    fn zero_quality_is_rejected() {
        let err = AnalysisConfig::from_json_str(r#"{ "ela_quality": 0 }"#).unwrap_err();
        assert!(matches!(err, ForensicsError::InvalidConfig(_)));
    }

    #[test]
    fn inverted_highlight_bounds_are_rejected() {
        let config = AnalysisConfig {
            highlight: HsvBounds {
                lower: [0, 200, 10],
                upper: [255, 100, 245],
            },
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn jpeg_render_format_round_trips_through_json() {
        let json = r#"{ "render": { "dpi": 200, "format": { "kind": "jpeg", "quality": 75 } } }"#;
        let config = AnalysisConfig::from_json_str(json).unwrap();
        assert_eq!(config.render, RenderOptions::preview());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "deviation_threshold": 35, "timeout_secs": 30 }}"#).unwrap();
        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_eq!(config.deviation_threshold, 35);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = AnalysisConfig::load("/nonexistent/pruefwerk.json").unwrap_err();
        assert!(matches!(err, ForensicsError::Io(_)));
    }

    #[test]
    fn hsv_bounds_are_inclusive() {
        let bounds = HsvBounds::default();
        assert!(bounds.contains([0, 10, 245]));
        assert!(!bounds.contains([0, 9, 100]));
        assert!(!bounds.contains([0, 50, 246]));
    }
}
