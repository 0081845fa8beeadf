/// Frame-by-frame follow pipeline
///
/// Each frame goes through four stages, strictly one frame at a time:
/// - validate the pixel buffer
/// - run the detector collaborator
/// - re-identify the target and compute a motion command
/// - hand the resulting goal to the actuation collaborator
///
/// A frame that fails before tracking (corrupt buffer, detector error) is
/// counted as a frame without candidates.
use crate::actuation::{CommandSink, TargetPose};
use crate::config::NodeConfig;
use crate::detector_trait::Detector;
use crate::error::Result;
use crate::types::ImageData;
use reidtrack::{Bbox, Follower, FrameOutcome, TrackingStatus};
use std::sync::{Arc, Mutex, PoisonError};

/// Counters accumulated over the pipeline's lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames: u64,
    /// Frames that produced a goal
    pub matched: u64,
    pub cold_starts: u64,
    /// Frames with no usable candidates, failed frames included
    pub empty_frames: u64,
    /// Transitions into the lost state
    pub losses: u64,
    pub invalid_frames: u64,
    pub detector_errors: u64,
    pub sink_errors: u64,
}

/// Drives a [`Follower`] from a detector and feeds goals to a sink
pub struct FollowPipeline<D: Detector, S: CommandSink> {
    config: NodeConfig,
    detector: D,
    sink: S,
    follower: Follower,
    stats: PipelineStats,
    last_status: TrackingStatus,
}

impl<D: Detector, S: CommandSink> FollowPipeline<D, S> {
    pub fn new(config: NodeConfig, detector: D, sink: S) -> Result<Self> {
        config.validate()?;
        let follower = Follower::new(config.follower.clone())?;
        log::info!(
            "Follow pipeline ready: detector={}, sink={}, base_frame={}",
            detector.name(),
            sink.name(),
            config.base_frame
        );

        Ok(Self {
            config,
            detector,
            sink,
            follower,
            stats: PipelineStats::default(),
            last_status: TrackingStatus::Lost,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn follower(&self) -> &Follower {
        &self.follower
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (D, S, PipelineStats) {
        (self.detector, self.sink, self.stats)
    }

    /// Process one frame; returns the goal sent to the sink, if any
    pub fn process(&mut self, image: &ImageData) -> Option<TargetPose> {
        self.stats.frames += 1;
        let seq = self.stats.frames;

        if !image.validate() {
            log::warn!(
                "Frame {}: invalid {}x{} {:?} buffer of {} bytes, skipping",
                seq,
                image.width,
                image.height,
                image.format,
                image.data.len()
            );
            self.stats.invalid_frames += 1;
            let outcome = self.follower.skip_frame();
            self.record(&outcome);
            return None;
        }

        let detections = match self.detector.detect(image) {
            Ok(detections) => detections,
            Err(e) => {
                log::warn!("Frame {}: detector {} failed: {}", seq, self.detector.name(), e);
                self.stats.detector_errors += 1;
                let outcome = self.follower.skip_frame();
                self.record(&outcome);
                return None;
            }
        };

        let candidates: Vec<Bbox> = detections
            .iter()
            .filter(|d| d.confidence >= self.config.min_confidence)
            .filter_map(|d| d.to_bbox(image.width, image.height, self.config.min_candidate_size))
            .collect();
        log::debug!(
            "Frame {}: {} detections, {} usable candidates",
            seq,
            detections.len(),
            candidates.len()
        );

        let outcome = match self.track(image, &candidates) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Frame {}: tracking failed: {}", seq, e);
                self.stats.invalid_frames += 1;
                self.follower.skip_frame()
            }
        };
        self.record(&outcome);

        let command = outcome.command?;
        let goal = TargetPose::from_command(&command, &self.config.base_frame, seq);
        if let Err(e) = self.sink.send(&goal) {
            log::error!("Frame {}: sink {} rejected goal: {}", seq, self.sink.name(), e);
            self.stats.sink_errors += 1;
        }
        Some(goal)
    }

    fn track(&mut self, image: &ImageData, candidates: &[Bbox]) -> Result<FrameOutcome> {
        let frame = image.view()?;
        Ok(self.follower.step(candidates, &frame)?)
    }

    fn record(&mut self, outcome: &FrameOutcome) {
        match &outcome.target {
            Some(target) => {
                self.stats.matched += 1;
                if target.cold_start {
                    self.stats.cold_starts += 1;
                }
            }
            None => self.stats.empty_frames += 1,
        }

        if outcome.status == TrackingStatus::Lost && self.last_status != TrackingStatus::Lost {
            self.stats.losses += 1;
        }
        self.last_status = outcome.status;
    }
}

/// Pipeline shared between frame-delivery threads.
///
/// The lock is held for a whole frame so scoring and the tracker update are
/// never interleaved with another frame.
pub struct SharedPipeline<D: Detector, S: CommandSink> {
    inner: Arc<Mutex<FollowPipeline<D, S>>>,
}

impl<D: Detector, S: CommandSink> Clone for SharedPipeline<D, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: Detector, S: CommandSink> SharedPipeline<D, S> {
    pub fn new(pipeline: FollowPipeline<D, S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pipeline)),
        }
    }

    pub fn process(&self, image: &ImageData) -> Option<TargetPose> {
        let mut pipeline = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        pipeline.process(image)
    }

    pub fn stats(&self) -> PipelineStats {
        let pipeline = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        pipeline.stats().clone()
    }
}
