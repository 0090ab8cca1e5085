use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DetectError, Result};

/// Tunable constants of the plate heuristic.
///
/// Every default equals the value the detector was tuned with, so
/// `DetectorConfig::default()` reproduces the reference behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Side of the square Gaussian kernel (odd).
    pub blur_kernel_size: u32,
    /// Gaussian sigma; `0.0` derives it from the kernel size.
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Side of the square structuring element used for closing (odd).
    pub morph_kernel_size: u32,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Minimum bounding-rectangle area in pixels.
    pub min_area: u64,
    pub min_aspect: f64,
    pub max_aspect: f64,
    /// A candidate is dominant when its area is strictly greater than
    /// `dominance_ratio * max_area`.
    pub dominance_ratio: f64,
    pub contour_color: [u8; 3],
    pub plate_color: [u8; 3],
    pub box_thickness: u32,
    /// Font used for plate labels. Common system fonts are tried when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            blur_sigma: 0.0,
            canny_low: 50.0,
            canny_high: 200.0,
            morph_kernel_size: 5,
            approx_epsilon_ratio: 0.02,
            min_area: 1000,
            min_aspect: 2.0,
            max_aspect: 6.5,
            dominance_ratio: 0.5,
            contour_color: [255, 190, 60],
            plate_color: [255, 180, 0],
            box_thickness: 3,
            font_path: None,
        }
    }
}

impl DetectorConfig {
    /// Sigma actually applied by the blur stage
    pub fn effective_blur_sigma(&self) -> f32 {
        if self.blur_sigma > 0.0 {
            return self.blur_sigma;
        }
        let k = self.blur_kernel_size as f32;
        0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(DetectError::InvalidConfig(msg));

        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return invalid(format!(
                "blur_kernel_size must be odd and positive, got {}",
                self.blur_kernel_size
            ));
        }
        if self.morph_kernel_size == 0 || self.morph_kernel_size % 2 == 0 {
            return invalid(format!(
                "morph_kernel_size must be odd and positive, got {}",
                self.morph_kernel_size
            ));
        }
        if self.blur_sigma < 0.0 {
            return invalid(format!("blur_sigma must not be negative, got {}", self.blur_sigma));
        }
        if self.canny_low < 0.0 || self.canny_low > self.canny_high {
            return invalid(format!(
                "canny thresholds must satisfy 0 <= low <= high, got ({}, {})",
                self.canny_low, self.canny_high
            ));
        }
        if self.approx_epsilon_ratio <= 0.0 {
            return invalid(format!(
                "approx_epsilon_ratio must be positive, got {}",
                self.approx_epsilon_ratio
            ));
        }
        if self.min_aspect <= 0.0 || self.min_aspect > self.max_aspect {
            return invalid(format!(
                "aspect band [{}, {}] is empty",
                self.min_aspect, self.max_aspect
            ));
        }
        if self.dominance_ratio <= 0.0 || self.dominance_ratio > 1.0 {
            return invalid(format!(
                "dominance_ratio must be in (0, 1], got {}",
                self.dominance_ratio
            ));
        }
        if self.box_thickness == 0 {
            return invalid("box_thickness must be at least 1".to_string());
        }

        Ok(())
    }
}

/// Load a JSON config file; missing fields keep their defaults
pub fn load_config(path: &Path) -> Result<DetectorConfig> {
    let data = fs::read_to_string(path).map_err(|e| DetectError::ConfigIo {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: DetectorConfig =
        serde_json::from_str(&data).map_err(|e| DetectError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
    config.validate()?;
    Ok(config)
}
