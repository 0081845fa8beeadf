//! Person-following node
//!
//! Glue between a camera, a person detector and a robot's navigation stack.
//! Frames come in as [`ImageData`], a [`Detector`] proposes candidate boxes,
//! the [`reidtrack`] core picks the followed person and computes a motion
//! command, and the resulting [`TargetPose`] goal goes to a [`CommandSink`].

pub mod actuation;
pub mod config;
pub mod detector_replay;
pub mod detector_trait;
pub mod error;
pub mod pipeline;
pub mod types;

pub use actuation::{CommandSink, JsonLinesSink, LogSink, RecordingSink, TargetPose};
pub use config::NodeConfig;
pub use detector_replay::{ReplayDetector, ReplayDocument, ReplayFrame};
pub use detector_trait::Detector;
pub use error::{FollowError, Result};
pub use pipeline::{FollowPipeline, PipelineStats, SharedPipeline};
pub use types::{Detection, ImageData, ImageFormat};

/// Get library version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
