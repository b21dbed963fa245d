//! Configuration for roadtruth
//!
//! Holds the on-disk data layout used to resolve sector files and the
//! evaluation defaults. Can be loaded from a TOML file; every field has a
//! default so a partial file is enough.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default pixel to millimeter ratio of the terrain rasters (0.5 m cells).
pub const DEFAULT_SCALE: i64 = 500;

/// Default stroke width of the buffered ground truth, in pixels.
pub const DEFAULT_TOLERANCE_WIDTH: u32 = 28;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub data: DataLayout,
    pub evaluation: EvaluationConfig,
}

/// File naming conventions below a data root directory.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataLayout {
    /// Data root (contains roads/, roadsets/, areas/, detections/, outputs/)
    pub root: PathBuf,
}

/// Evaluation parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Pixel to millimeter ratio
    pub scale: i64,
    /// Stroke width of the buffered ground truth
    pub tolerance_width: u32,
    /// Also write the exclusion mask image
    pub write_mask: bool,
}

impl Default for DataLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("../Data"),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            tolerance_width: DEFAULT_TOLERANCE_WIDTH,
            write_mask: false,
        }
    }
}

impl DataLayout {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Track file for a road-set identifier.
    pub fn track_file(&self, id: &str) -> PathBuf {
        self.root.join("roads").join(format!("track_{}.txt", id))
    }

    pub fn last_track(&self) -> PathBuf {
        self.root.join("roads").join("last.txt")
    }

    pub fn last_area(&self) -> PathBuf {
        self.root.join("areas").join("last.txt")
    }

    pub fn road_set(&self, sector: &str) -> PathBuf {
        self.root.join("roadsets").join(format!("rgt_{}.txt", sector))
    }

    pub fn discarded_areas(&self, sector: &str) -> PathBuf {
        self.root.join("areas").join(format!("area_{}.txt", sector))
    }

    pub fn detection_map(&self, sector: &str) -> PathBuf {
        self.root.join("detections").join(format!("roads_{}.png", sector))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("outputs")
    }

    pub fn mask_output(&self, sector: &str) -> PathBuf {
        self.output_dir().join(format!("mask_{}.png", sector))
    }

    pub fn recall_output(&self, sector: &str) -> PathBuf {
        self.output_dir().join(format!("recall_{}.png", sector))
    }

    pub fn precision_output(&self, sector: &str) -> PathBuf {
        self.output_dir().join(format!("precision_{}.png", sector))
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
