//! Single-target re-identification and follow control
//!
//! Given the person detector's candidate boxes for each camera frame, this
//! crate decides which candidate is the person being followed and turns its
//! position and size into a bounded motion command:
//!
//! 1. [`filter::filter_contained`] drops candidates nested inside another one.
//! 2. [`matcher::AppearanceMatcher`] scores candidates against a remembered
//!    color-histogram [`signature::Signature`] using histogram intersection.
//! 3. [`tracker::TargetTracker`] runs the loss/recovery state machine.
//! 4. [`command::CommandGenerator`] maps center offset and area change to a
//!    [`command::MotionCommand`].
//!
//! [`Follower`] chains the four steps for one frame:
//!
//! ```rust,ignore
//! use reidtrack::{Bbox, Follower, FollowerConfig, FrameView};
//!
//! let mut follower = Follower::new(FollowerConfig::default())?;
//! let frame = FrameView::new(&pixels, 640, 480, 3)?;
//! if let Some(cmd) = follower.process_frame(&[Bbox::new(280, 40, 100, 200)], &frame)? {
//!     println!("yaw={:.3} forward={:.3}", cmd.yaw, cmd.forward_offset);
//! }
//! ```

pub mod bbox;
pub mod command;
pub mod config;
pub mod error;
pub mod filter;
pub mod follower;
pub mod frame;
pub mod matcher;
pub mod signature;
pub mod tracker;

pub use bbox::Bbox;
pub use command::{CommandGenerator, MotionCommand};
pub use config::{
    AppearanceConfig, CommandConfig, FollowerConfig, HistogramNorm, SignaturePolicy,
    TrackerConfig,
};
pub use error::{ReidError, Result};
pub use follower::{Follower, FrameOutcome};
pub use frame::{CandidateView, FrameView};
pub use matcher::{AppearanceMatcher, MatchResult};
pub use signature::{Signature, SignatureExtractor};
pub use tracker::{TargetTracker, TrackedTarget, TrackerState, TrackingStatus};
