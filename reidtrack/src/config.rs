//! Configuration types for the follower core
//!
//! Defaults reproduce the tuning the follower robot shipped with: a 25 px
//! heading deadband, 0.5 rad max yaw, a 50 px² area deadband, 0.75 max
//! forward rate, 64 bins per channel over [0, 256) and a 5 frame loss window.

use crate::error::{ReidError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on `AppearanceConfig::histogram_bins`
pub const MAX_HISTOGRAM_BINS: usize = 128;

/// How histogram bins are scaled after counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramNorm {
    /// Bins sum to 1, so intersection scores lie in [0, 1]
    #[default]
    Sum,
    /// Largest bin scaled to 1. Intersection scores are unbounded above.
    MinMax,
}

/// What happens to the reference signature after a non-cold-start match
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SignaturePolicy {
    /// Keep the appearance captured at cold start until the target is lost
    #[default]
    LockFirst,
    /// Replace the reference with the matched candidate's signature whenever
    /// its score reaches `min_score`
    RefreshOnMatch { min_score: f64 },
}

/// Motion command generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Horizontal offset in pixels tolerated before any yaw is commanded
    pub deadband_offset: f64,
    /// Yaw magnitude commanded at the frame edge (radians)
    pub max_yaw_rate: f64,
    /// Area change in pixels² tolerated before any forward motion is commanded
    pub deadband_area: f64,
    /// Upper bound on the forward offset magnitude
    pub max_forward_rate: f64,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            deadband_offset: 25.0,
            max_yaw_rate: 0.5,
            deadband_area: 50.0,
            max_forward_rate: 0.75,
        }
    }
}

/// Appearance signature quantization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Bins per color channel, at most 128. A signature holds `bins³` f32
    /// values, so 64 bins cost 1 MiB per candidate and 128 bins 8 MiB.
    pub histogram_bins: usize,
    /// Half-open value domain `[min, max)` per channel
    pub histogram_range: [f32; 2],
    pub normalization: HistogramNorm,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            histogram_bins: 64,
            histogram_range: [0.0, 256.0],
            normalization: HistogramNorm::Sum,
        }
    }
}

/// Loss and recovery behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Consecutive frames without candidates before the reference is dropped
    pub loss_threshold: u32,
    pub signature_policy: SignaturePolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            loss_threshold: 5,
            signature_policy: SignaturePolicy::LockFirst,
        }
    }
}

/// Complete configuration of the follower core
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerConfig {
    pub command: CommandConfig,
    pub appearance: AppearanceConfig,
    pub tracker: TrackerConfig,
}

impl FollowerConfig {
    /// Reject settings the core cannot operate with
    pub fn validate(&self) -> Result<()> {
        let command = &self.command;
        let non_negative = [
            ("deadband_offset", command.deadband_offset),
            ("max_yaw_rate", command.max_yaw_rate),
            ("deadband_area", command.deadband_area),
            ("max_forward_rate", command.max_forward_rate),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ReidError::config(format!(
                    "command.{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }

        let appearance = &self.appearance;
        if appearance.histogram_bins == 0 || appearance.histogram_bins > MAX_HISTOGRAM_BINS {
            return Err(ReidError::config(format!(
                "appearance.histogram_bins must be in 1..={}, got {}",
                MAX_HISTOGRAM_BINS,
                appearance.histogram_bins
            )));
        }
        let [min, max] = appearance.histogram_range;
        if !min.is_finite() || !max.is_finite() || max <= min {
            return Err(ReidError::config(format!(
                "appearance.histogram_range must be a non-empty finite interval, got [{}, {})",
                min, max
            )));
        }

        if self.tracker.loss_threshold == 0 {
            return Err(ReidError::config("tracker.loss_threshold must be at least 1"));
        }
        if let SignaturePolicy::RefreshOnMatch { min_score } = self.tracker.signature_policy {
            if !min_score.is_finite() || min_score < 0.0 {
                return Err(ReidError::config(format!(
                    "tracker.signature_policy.min_score must be non-negative, got {}",
                    min_score
                )));
            }
        }

        Ok(())
    }
}
