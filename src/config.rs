/// Cleaner configuration
///
/// Every field has a default, so an empty YAML document (or no file at all)
/// yields the stock 50 m/s / 6 371 000 m / degrees setup.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::anomaly_detector::{DetectorConfig, DEFAULT_MAX_SPEED_MPS};
use crate::error::{CleanError, Result};
use crate::geodesy::DEFAULT_EARTH_RADIUS_M;
use crate::trajectory::CoordinateFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanerConfig {
    /// Implied speeds strictly above this flag a fix (m/s)
    pub max_speed_mps: f64,
    /// Sphere radius for haversine distances (m)
    pub earth_radius_m: f64,
    /// How `lat`/`lon` values are encoded in input and output
    pub coordinate_format: CoordinateFormat,
    /// Treat `[]` as an error instead of echoing it back
    pub reject_empty_trajectory: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        CleanerConfig {
            max_speed_mps: DEFAULT_MAX_SPEED_MPS,
            earth_radius_m: DEFAULT_EARTH_RADIUS_M,
            coordinate_format: CoordinateFormat::Degrees,
            reject_empty_trajectory: false,
        }
    }
}

impl CleanerConfig {
    pub fn microdegrees() -> Self {
        CleanerConfig {
            coordinate_format: CoordinateFormat::Microdegrees,
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        // serde_yaml reads an empty document as unit, not as an empty map
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: CleanerConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_speed_mps.is_finite() || self.max_speed_mps <= 0.0 {
            return Err(CleanError::InvalidConfig(format!(
                "max_speed_mps must be a positive number, got {}",
                self.max_speed_mps
            )));
        }
        if !self.earth_radius_m.is_finite() || self.earth_radius_m <= 0.0 {
            return Err(CleanError::InvalidConfig(format!(
                "earth_radius_m must be a positive number, got {}",
                self.earth_radius_m
            )));
        }
        Ok(())
    }

    pub fn detector(&self) -> DetectorConfig {
        DetectorConfig {
            max_speed_mps: self.max_speed_mps,
            earth_radius_m: self.earth_radius_m,
        }
    }
}
