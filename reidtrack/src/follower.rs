//! Per-frame driver: filter, match, update the tracker, emit a command

use crate::bbox::Bbox;
use crate::command::{CommandGenerator, MotionCommand};
use crate::config::FollowerConfig;
use crate::error::Result;
use crate::filter::filter_contained;
use crate::frame::{CandidateView, FrameView};
use crate::tracker::{TargetTracker, TrackedTarget, TrackerState, TrackingStatus};

/// What happened on one processed frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    /// Candidates left after clipping and containment filtering
    pub candidates: usize,
    pub target: Option<TrackedTarget>,
    pub command: Option<MotionCommand>,
    /// Tracker status after the frame
    pub status: TrackingStatus,
}

/// Single-target follower.
///
/// Frames must be fed one at a time in arrival order; `&mut self` on every
/// entry point makes overlapping calls impossible without an outer lock.
#[derive(Debug, Clone)]
pub struct Follower {
    config: FollowerConfig,
    tracker: TargetTracker,
    generator: CommandGenerator,
}

impl Follower {
    pub fn new(config: FollowerConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Creating Follower: bins={}, loss_threshold={}, policy={:?}",
            config.appearance.histogram_bins,
            config.tracker.loss_threshold,
            config.tracker.signature_policy
        );

        Ok(Self {
            tracker: TargetTracker::new(config.tracker.clone(), &config.appearance),
            generator: CommandGenerator::new(config.command.clone()),
            config,
        })
    }

    pub fn config(&self) -> &FollowerConfig {
        &self.config
    }

    pub fn state(&self) -> &TrackerState {
        self.tracker.state()
    }

    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Process one frame's detector candidates and return the command, if a
    /// target was matched
    pub fn process_frame(
        &mut self,
        candidates: &[Bbox],
        frame: &FrameView<'_>,
    ) -> Result<Option<MotionCommand>> {
        Ok(self.step(candidates, frame)?.command)
    }

    /// Like [`Follower::process_frame`], reporting the full outcome
    pub fn step(&mut self, candidates: &[Bbox], frame: &FrameView<'_>) -> Result<FrameOutcome> {
        let clipped: Vec<Bbox> = candidates
            .iter()
            .filter_map(|c| c.clip_to(frame.width(), frame.height()))
            .collect();
        if clipped.len() < candidates.len() {
            log::debug!(
                "Dropped {} candidates outside the {}x{} frame",
                candidates.len() - clipped.len(),
                frame.width(),
                frame.height()
            );
        }

        let filtered = filter_contained(&clipped);
        let views = filtered
            .iter()
            .map(|rect| frame.region(*rect))
            .collect::<Result<Vec<CandidateView<'_>>>>()?;

        let target = self.tracker.update(&views)?;
        let command = target
            .as_ref()
            .map(|t| self.generator.generate(&t.rect, frame.width(), t.previous_area));

        Ok(FrameOutcome {
            candidates: filtered.len(),
            target,
            command,
            status: self.tracker.state().status(),
        })
    }

    /// Account for a frame that never reached the detector (decode failure,
    /// corrupt buffer). Counts as a frame without candidates.
    pub fn skip_frame(&mut self) -> FrameOutcome {
        self.tracker.miss();
        FrameOutcome {
            candidates: 0,
            target: None,
            command: None,
            status: self.tracker.state().status(),
        }
    }
}
