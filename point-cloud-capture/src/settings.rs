/// Capture tuning loaded from JSON, defaulting to the fixed pipeline constants
use crate::error::SettingsError;
use crate::frame::ConfidenceLevel;
use constants::capture_settings::{DOWNSAMPLE_STRIDE, GRID_DENSITY, MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Grid cells per metre for deduplication.
    pub grid_density: f32,
    /// Depth ceiling in metres; the first qualifying sample beyond it ends the frame.
    pub max_depth: f32,
    /// Display keeps one vertex in `downsample_stride`.
    pub downsample_stride: usize,
    /// Only pixels at exactly this confidence are fused.
    pub required_confidence: ConfidenceLevel,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            grid_density: GRID_DENSITY,
            max_depth: MAX_DEPTH,
            downsample_stride: DOWNSAMPLE_STRIDE,
            required_confidence: ConfidenceLevel::High,
        }
    }
}

impl CaptureSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }
}
