use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StraightedgeError};

/// Longer side of the working image
pub const DEFAULT_WORKING_SIZE: u32 = 300;
/// Half-width `k` of the `2k + 1` smoothing kernel
pub const DEFAULT_SMOOTHING_HALF_WIDTH: usize = 3;
pub const DEFAULT_HOUGH_SEED: u64 = 0xFFFF_FFFF;

/// Per-call tuning of the extraction pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DetectionParameters {
    /// Hysteresis low threshold of the edge detector
    pub canny_low: u8,
    /// Hysteresis high threshold of the edge detector
    pub canny_high: u8,
    /// Contours with fewer points than this are dropped as noise
    pub min_contour_size: usize,
    /// Width of the Gaussian used to smooth contours
    #[schemars(range(min = 0.01))]
    pub sigma: f32,
}

impl Default for DetectionParameters {
    fn default() -> Self {
        Self {
            canny_low: 0,
            canny_high: 255,
            min_contour_size: 10,
            sigma: 2.0,
        }
    }
}

impl DetectionParameters {
    /// Reject a sigma the smoothing kernel cannot be built from
    pub fn validate(&self) -> Result<()> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(StraightedgeError::InvalidInput(format!(
                "smoothing sigma must be positive, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}

/// Fixed tuning of the probabilistic line transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HoughParameters {
    /// Distance resolution in pixels
    pub rho: f32,
    /// Angular resolution in radians
    pub theta: f32,
    /// Minimum accumulator votes for a line
    pub threshold: u32,
    /// Segments shorter than this are discarded
    pub min_line_length: u32,
    /// Largest run of empty pixels bridged inside one segment
    pub max_line_gap: u32,
    /// Seed of the pixel sampling order
    pub seed: u64,
}

impl Default for HoughParameters {
    fn default() -> Self {
        Self {
            rho: 1.0,
            theta: std::f32::consts::PI / 180.0,
            threshold: 10,
            min_line_length: 0,
            max_line_gap: 0,
            seed: DEFAULT_HOUGH_SEED,
        }
    }
}

/// Full detector configuration, loadable from TOML or JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DetectorConfig {
    #[schemars(range(min = 1))]
    pub working_size: u32,
    pub smoothing_half_width: usize,
    pub detection: DetectionParameters,
    pub hough: HoughParameters,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            working_size: DEFAULT_WORKING_SIZE,
            smoothing_half_width: DEFAULT_SMOOTHING_HALF_WIDTH,
            detection: DetectionParameters::default(),
            hough: HoughParameters::default(),
        }
    }
}

impl DetectorConfig {
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DetectorConfig)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a configuration, picking the format from the file extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(StraightedgeError::UnsupportedFileFormat),
        }
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(StraightedgeError::UnsupportedFileFormat),
        };
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = DetectionParameters::default();
        assert_eq!(params.canny_low, 0);
        assert_eq!(params.canny_high, 255);
        assert_eq!(params.min_contour_size, 10);
        assert_eq!(params.sigma, 2.0);

        let hough = HoughParameters::default();
        assert_eq!(hough.threshold, 10);
        assert_eq!(hough.min_line_length, 0);
        assert_eq!(hough.max_line_gap, 0);
    }

    #[test]
    fn test_validate_rejects_non_positive_sigma() {
        assert!(DetectionParameters::default().validate().is_ok());
        for sigma in [0.0, -1.0, f32::NAN] {
            let params = DetectionParameters { sigma, ..DetectionParameters::default() };
            assert!(matches!(params.validate(), Err(StraightedgeError::InvalidInput(_))));
        }
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = DetectorConfig::from_toml(
            r#"
            working_size = 200

            [detection]
            canny_low = 30
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.working_size, 200);
        assert_eq!(config.detection.canny_low, 30);
        assert_eq!(config.detection.canny_high, 255);
        assert_eq!(config.hough, HoughParameters::default());
    }

    #[test]
    fn test_file_round_trip_by_extension() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut config = DetectorConfig::default();
        config.detection.sigma = 1.5;

        for name in ["detector.toml", "detector.json"] {
            let path = dir.path().join(name);
            config.to_file(&path).expect("write config");
            assert_eq!(DetectorConfig::from_file(&path).expect("read config"), config);
        }

        let err = config.to_file(dir.path().join("detector.yaml")).unwrap_err();
        assert!(matches!(err, StraightedgeError::UnsupportedFileFormat));
    }

    #[test]
    fn test_schema_names_sections() {
        let schema = serde_json::to_value(DetectorConfig::schema()).expect("schema serializes");
        let properties = &schema["properties"];
        assert!(properties.get("detection").is_some());
        assert!(properties.get("hough").is_some());
    }
}
