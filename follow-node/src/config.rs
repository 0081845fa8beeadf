//! Node configuration, loaded from a JSON file

use crate::error::{FollowError, Result};
use crate::types::ImageFormat;
use reidtrack::FollowerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the follow node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Tracking and command tuning
    pub follower: FollowerConfig,
    /// Coordinate frame goals are expressed in
    pub base_frame: String,
    /// Channel order frames are converted to before histogramming
    pub pixel_format: ImageFormat,
    /// Detections narrower or shorter than this (pixels) are ignored
    pub min_candidate_size: u32,
    /// Detections below this score are ignored (0-1)
    pub min_confidence: f32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            follower: FollowerConfig::default(),
            base_frame: "base_link".to_string(),
            pixel_format: ImageFormat::Bgr,
            min_candidate_size: 1,
            min_confidence: 0.0,
        }
    }
}

impl NodeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            FollowError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        log::info!("Loading node configuration from {}", path.display());
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.follower.validate()?;

        if self.base_frame.trim().is_empty() {
            return Err(FollowError::config("base_frame must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(FollowError::config(format!(
                "min_confidence must be within 0-1, got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}
