use crate::utils::{InvoiceError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Linear scale applied when rasterizing the first PDF page.
pub const PDF_RENDER_SCALE: f32 = 3.0;
/// Detections whose vertical midpoint sits above this fraction of the page
/// height feed the header text blob.
pub const HEADER_REGION_FRACTION: f32 = 0.30;
/// Side of the square coordinate space the layout classifier expects.
pub const NORMALIZED_EXTENT: i32 = 1000;

pub const ACCESS_KEY_SEED_CONFIDENCE: f32 = 0.4;
pub const ACCESS_KEY_Y_TOLERANCE: f32 = 15.0;
pub const ACCESS_KEY_X_GAP: i32 = 150;
pub const ACCESS_KEY_MERGED_CONFIDENCE: f32 = 0.95;
pub const ACCESS_KEY_DIGITS: usize = 44;
pub const ACCESS_KEY_GROUP: usize = 4;

pub const DEFAULT_CONFIDENCE_FLOOR: f32 = 0.50;
pub const LOWERED_CONFIDENCE_FLOOR: f32 = 0.20;

pub const FALLBACK_MIN_VALUE: f64 = 0.01;
pub const FALLBACK_YEAR_RANGE: (f64, f64) = (2020.0, 2035.0);

/// Tuning knobs for one extractor instance.
///
/// Every field defaults to the constant of the same name above, so a JSON
/// config file only needs to list the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub pdf_render_scale: f32,
    pub header_region_fraction: f32,
    pub access_key: AccessKeyConfig,
    pub default_confidence_floor: f32,
    pub lowered_confidence_floor: f32,
    pub fallback_min_value: f64,
    pub fallback_year_range: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessKeyConfig {
    pub seed_confidence: f32,
    pub y_tolerance: f32,
    pub x_gap: i32,
    pub merged_confidence: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            pdf_render_scale: PDF_RENDER_SCALE,
            header_region_fraction: HEADER_REGION_FRACTION,
            access_key: AccessKeyConfig::default(),
            default_confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            lowered_confidence_floor: LOWERED_CONFIDENCE_FLOOR,
            fallback_min_value: FALLBACK_MIN_VALUE,
            fallback_year_range: FALLBACK_YEAR_RANGE,
        }
    }
}

impl Default for AccessKeyConfig {
    fn default() -> Self {
        Self {
            seed_confidence: ACCESS_KEY_SEED_CONFIDENCE,
            y_tolerance: ACCESS_KEY_Y_TOLERANCE,
            x_gap: ACCESS_KEY_X_GAP,
            merged_confidence: ACCESS_KEY_MERGED_CONFIDENCE,
        }
    }
}

impl ExtractorConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: ExtractorConfig = serde_json::from_str(&raw)
            .map_err(|e| InvoiceError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pdf_render_scale <= 0.0 {
            return Err(InvoiceError::Config(format!(
                "pdf_render_scale must be positive, got {}",
                self.pdf_render_scale
            )));
        }
        if !(0.0..=1.0).contains(&self.header_region_fraction) {
            return Err(InvoiceError::Config(format!(
                "header_region_fraction must lie in [0, 1], got {}",
                self.header_region_fraction
            )));
        }
        let (low, high) = self.fallback_year_range;
        if low > high {
            return Err(InvoiceError::Config(format!(
                "fallback_year_range is inverted: ({}, {})",
                low, high
            )));
        }
        Ok(())
    }
}
