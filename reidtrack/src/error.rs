//! Error types for the re-identification core

use thiserror::Error;

/// Result type alias for the re-identification core
pub type Result<T> = std::result::Result<T, ReidError>;

/// Errors raised by the re-identification core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReidError {
    /// The matcher was invoked without candidates. Callers must route empty
    /// frames to the tracker's loss path instead.
    #[error("appearance matcher invoked with an empty candidate list")]
    NoCandidates,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid frame buffer: {width}x{height}x{channels} needs {expected} bytes, got {actual}")]
    InvalidFrame {
        width: u32,
        height: u32,
        channels: u32,
        expected: usize,
        actual: usize,
    },

    #[error("region {region} lies outside the {width}x{height} frame")]
    RegionOutOfBounds {
        region: String,
        width: u32,
        height: u32,
    },

    #[error("signatures are not comparable: {left} bins vs {right} bins")]
    IncompatibleSignatures { left: usize, right: usize },
}

impl ReidError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
