//! Error types for the follow node

use reidtrack::ReidError;
use thiserror::Error;

/// Result type alias for the follow node
pub type Result<T> = std::result::Result<T, FollowError>;

/// Errors that can occur while running the follow pipeline
#[derive(Error, Debug)]
pub enum FollowError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Detector failed: {0}")]
    DetectorError(String),

    #[error("Actuation failed: {0}")]
    ActuationError(String),

    #[error("Invalid image data: {0}")]
    ImageDataError(String),

    #[error("Tracking error: {0}")]
    TrackingError(#[from] ReidError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl FollowError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn detector<S: Into<String>>(msg: S) -> Self {
        Self::DetectorError(msg.into())
    }

    pub fn actuation<S: Into<String>>(msg: S) -> Self {
        Self::ActuationError(msg.into())
    }

    pub fn image_data<S: Into<String>>(msg: S) -> Self {
        Self::ImageDataError(msg.into())
    }
}
