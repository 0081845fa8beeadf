//! Loss/recovery state machine around the appearance matcher

use crate::bbox::Bbox;
use crate::config::{AppearanceConfig, SignaturePolicy, TrackerConfig};
use crate::error::Result;
use crate::frame::CandidateView;
use crate::matcher::{AppearanceMatcher, MatchResult};
use crate::signature::Signature;
use std::fmt;

/// Derived view of the tracker state, for logging and statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingStatus {
    /// A target was matched on the last observed frame
    Tracking,
    /// No candidates for `frames` consecutive frames, reference still valid
    Occluded { frames: u32 },
    /// No valid reference; the next match is a cold start
    Lost,
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tracking => write!(f, "tracking"),
            Self::Occluded { frames } => write!(f, "occluded ({} frames)", frames),
            Self::Lost => write!(f, "lost"),
        }
    }
}

/// Target selected on a frame, with what the command generator may use
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedTarget {
    pub rect: Bbox,
    /// Index of the target in the filtered candidate list
    pub index: usize,
    /// Intersection score, `None` on cold start
    pub score: Option<f64>,
    pub cold_start: bool,
    /// Area of the previously matched target. `None` on cold start.
    pub previous_area: Option<f64>,
}

/// Everything the tracker carries from one frame to the next
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerState {
    reference: Option<Signature>,
    signature_valid: bool,
    previous_area: Option<f64>,
    loss_count: u32,
    /// Number of frames observed, bumped by every transition
    version: u64,
}

impl TrackerState {
    /// Initial state: no reference, which behaves exactly like a lost target
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference(&self) -> Option<&Signature> {
        self.reference.as_ref()
    }

    pub fn signature_valid(&self) -> bool {
        self.signature_valid
    }

    /// Reference the matcher should compare against, if any
    pub fn valid_reference(&self) -> Option<&Signature> {
        if self.signature_valid {
            self.reference.as_ref()
        } else {
            None
        }
    }

    pub fn previous_area(&self) -> Option<f64> {
        self.previous_area
    }

    pub fn loss_count(&self) -> u32 {
        self.loss_count
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn status(&self) -> TrackingStatus {
        if !self.signature_valid {
            TrackingStatus::Lost
        } else if self.loss_count == 0 {
            TrackingStatus::Tracking
        } else {
            TrackingStatus::Occluded {
                frames: self.loss_count,
            }
        }
    }

    /// One frame's transition: `selection` is the matched candidate and the
    /// matcher's verdict, or `None` when the frame had no candidates.
    ///
    /// Needs no frame buffer, so the state machine can be driven directly.
    pub fn observe(
        &mut self,
        selection: Option<(Bbox, MatchResult)>,
        config: &TrackerConfig,
    ) -> Option<TrackedTarget> {
        match selection {
            Some((rect, result)) => Some(self.on_match(rect, result, config)),
            None => {
                self.on_empty(config);
                None
            }
        }
    }

    /// Transition for a frame where `result` picked `rect`
    pub fn on_match(
        &mut self,
        rect: Bbox,
        result: MatchResult,
        config: &TrackerConfig,
    ) -> TrackedTarget {
        let index = result.index();
        let score = result.score();
        let cold_start = result.is_cold_start();

        let previous_area = if cold_start {
            None
        } else {
            self.previous_area.filter(|area| *area > 0.0)
        };

        match result {
            MatchResult::ColdStart { signature, .. } => {
                log::info!("Cold start: locked onto {}", rect);
                self.reference = Some(signature);
            }
            MatchResult::Matched {
                score, signature, ..
            } => {
                if self.loss_count > 0 {
                    log::info!(
                        "Target reacquired at {} after {} empty frames (score {:.3})",
                        rect,
                        self.loss_count,
                        score
                    );
                }
                if let SignaturePolicy::RefreshOnMatch { min_score } = config.signature_policy {
                    if score >= min_score {
                        self.reference = Some(signature);
                    }
                }
            }
        }

        self.signature_valid = true;
        self.loss_count = 0;
        self.previous_area = Some(rect.area());
        self.version += 1;

        TrackedTarget {
            rect,
            index,
            score,
            cold_start,
            previous_area,
        }
    }

    /// Transition for a frame without candidates
    pub fn on_empty(&mut self, config: &TrackerConfig) {
        self.version += 1;
        if self.loss_count < config.loss_threshold {
            self.loss_count += 1;
        }

        if self.signature_valid && self.loss_count >= config.loss_threshold {
            log::info!(
                "Target lost after {} empty frames, next match is a cold start",
                self.loss_count
            );
            self.signature_valid = false;
        }
    }
}

/// Owns the tracker state and drives it once per frame
#[derive(Debug, Clone)]
pub struct TargetTracker {
    config: TrackerConfig,
    matcher: AppearanceMatcher,
    state: TrackerState,
}

impl TargetTracker {
    pub fn new(config: TrackerConfig, appearance: &AppearanceConfig) -> Self {
        Self {
            config,
            matcher: AppearanceMatcher::new(appearance),
            state: TrackerState::new(),
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn matcher(&self) -> &AppearanceMatcher {
        &self.matcher
    }

    /// Forget everything, as at process start
    pub fn reset(&mut self) {
        self.state = TrackerState::new();
    }

    /// Record a frame without candidates
    pub fn miss(&mut self) {
        self.state.observe(None, &self.config);
    }

    /// Observe one frame's filtered candidates.
    ///
    /// Returns the selected target, or `None` when the frame had no
    /// candidates. The state is left untouched if matching fails.
    pub fn update(&mut self, candidates: &[CandidateView<'_>]) -> Result<Option<TrackedTarget>> {
        if candidates.is_empty() {
            self.miss();
            return Ok(None);
        }

        let result = self.matcher.select(candidates, self.state.valid_reference())?;
        let rect = candidates[result.index()].rect();
        Ok(self.state.observe(Some((rect, result)), &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HistogramNorm;
    use crate::frame::FrameView;
    use ndarray::Array3;

    const RED: [u8; 3] = [220, 20, 20];
    const BLUE: [u8; 3] = [20, 20, 220];

    fn appearance() -> AppearanceConfig {
        AppearanceConfig {
            histogram_bins: 8,
            histogram_range: [0.0, 256.0],
            normalization: HistogramNorm::Sum,
        }
    }

    /// 40x10 frame, left half red, right half blue
    fn frame_data() -> Vec<u8> {
        let mut data = Vec::new();
        for _ in 0..10 {
            for x in 0..40 {
                data.extend_from_slice(if x < 20 { &RED } else { &BLUE });
            }
        }
        data
    }

    const RED_BOX: Bbox = Bbox {
        x: 0,
        y: 0,
        width: 20,
        height: 10,
    };
    const BLUE_BOX: Bbox = Bbox {
        x: 20,
        y: 0,
        width: 20,
        height: 10,
    };

    fn tracker(loss_threshold: u32) -> TargetTracker {
        TargetTracker::new(
            TrackerConfig {
                loss_threshold,
                signature_policy: SignaturePolicy::LockFirst,
            },
            &appearance(),
        )
    }

    /// 2-bin signature with all mass in one red-channel bin
    fn signature(bin: usize) -> Signature {
        let mut hist = Array3::zeros((2, 2, 2));
        hist[[bin, 0, 0]] = 1.0;
        Signature::from_histogram(hist, 1).unwrap()
    }

    fn lock_first(loss_threshold: u32) -> TrackerConfig {
        TrackerConfig {
            loss_threshold,
            signature_policy: SignaturePolicy::LockFirst,
        }
    }

    #[test]
    fn test_observe_cold_start_adopts_signature() {
        let config = lock_first(5);
        let mut state = TrackerState::new();
        let rect = Bbox::new(280, 40, 100, 200);

        let cold = MatchResult::ColdStart {
            index: 0,
            signature: signature(0),
        };
        let target = state.observe(Some((rect, cold)), &config).unwrap();

        assert!(target.cold_start);
        assert_eq!(target.score, None);
        assert_eq!(target.previous_area, None);
        assert!(state.signature_valid());
        assert_eq!(state.reference(), Some(&signature(0)));
        assert_eq!(state.previous_area(), Some(20000.0));
        assert_eq!(state.status(), TrackingStatus::Tracking);

        let matched = MatchResult::Matched {
            index: 1,
            score: 0.9,
            signature: signature(1),
        };
        let target = state.observe(Some((rect, matched)), &config).unwrap();
        assert!(!target.cold_start);
        assert_eq!(target.index, 1);
        assert_eq!(target.previous_area, Some(20000.0));
        assert_eq!(state.reference(), Some(&signature(0)));
    }

    #[test]
    fn test_observe_loss_threshold() {
        let config = lock_first(5);
        let mut state = TrackerState::new();
        let cold = MatchResult::ColdStart {
            index: 0,
            signature: signature(0),
        };
        state.observe(Some((Bbox::new(0, 0, 10, 10), cold)), &config);

        for _ in 0..4 {
            assert_eq!(state.observe(None, &config), None);
        }
        assert!(state.signature_valid());
        assert_eq!(state.valid_reference(), Some(&signature(0)));
        assert_eq!(state.status(), TrackingStatus::Occluded { frames: 4 });

        assert_eq!(state.observe(None, &config), None);
        assert!(!state.signature_valid());
        assert_eq!(state.valid_reference(), None);
        assert_eq!(state.status(), TrackingStatus::Lost);
        assert_eq!(state.version(), 6);

        let cold = MatchResult::ColdStart {
            index: 0,
            signature: signature(1),
        };
        let target = state.observe(Some((Bbox::new(5, 5, 20, 20), cold)), &config).unwrap();
        assert!(target.cold_start);
        assert_eq!(target.previous_area, None);
        assert_eq!(state.loss_count(), 0);
        assert_eq!(state.reference(), Some(&signature(1)));
    }

    #[test]
    fn test_initial_state_is_lost() {
        let state = TrackerState::new();
        assert!(!state.signature_valid());
        assert_eq!(state.loss_count(), 0);
        assert_eq!(state.previous_area(), None);
        assert_eq!(state.status(), TrackingStatus::Lost);
    }

    #[test]
    fn test_cold_start_adopts_first_candidate() {
        let data = frame_data();
        let frame = FrameView::new(&data, 40, 10, 3).unwrap();
        let mut t = tracker(5);

        let views = [frame.region(BLUE_BOX).unwrap(), frame.region(RED_BOX).unwrap()];
        let target = t.update(&views).unwrap().unwrap();

        assert!(target.cold_start);
        assert_eq!(target.rect, BLUE_BOX);
        assert_eq!(target.previous_area, None);
        assert!(t.state().signature_valid());
        assert_eq!(t.state().previous_area(), Some(200.0));
        assert_eq!(
            t.state().reference(),
            Some(&t.matcher().extractor().compute(&views[0]))
        );
    }

    #[test]
    fn test_follows_reference_regardless_of_order() {
        let data = frame_data();
        let frame = FrameView::new(&data, 40, 10, 3).unwrap();
        let mut t = tracker(5);

        t.update(&[frame.region(BLUE_BOX).unwrap()]).unwrap();
        let target = t
            .update(&[frame.region(RED_BOX).unwrap(), frame.region(BLUE_BOX).unwrap()])
            .unwrap()
            .unwrap();

        assert!(!target.cold_start);
        assert_eq!(target.rect, BLUE_BOX);
        assert_eq!(target.index, 1);
        assert_eq!(target.previous_area, Some(200.0));
    }

    #[test]
    fn test_loss_threshold() {
        let data = frame_data();
        let frame = FrameView::new(&data, 40, 10, 3).unwrap();
        let mut t = tracker(5);
        t.update(&[frame.region(RED_BOX).unwrap()]).unwrap();

        for _ in 0..4 {
            assert_eq!(t.update(&[]).unwrap(), None);
        }
        assert!(t.state().signature_valid());
        assert_eq!(t.state().status(), TrackingStatus::Occluded { frames: 4 });

        t.update(&[]).unwrap();
        assert!(!t.state().signature_valid());
        assert_eq!(t.state().status(), TrackingStatus::Lost);

        // Counter saturates at the threshold
        for _ in 0..10 {
            t.update(&[]).unwrap();
        }
        assert_eq!(t.state().loss_count(), 5);
    }

    #[test]
    fn test_occlusion_keeps_reference() {
        let data = frame_data();
        let frame = FrameView::new(&data, 40, 10, 3).unwrap();
        let mut t = tracker(5);
        t.update(&[frame.region(BLUE_BOX).unwrap()]).unwrap();
        let reference = t.state().reference().cloned();

        t.update(&[]).unwrap();
        t.update(&[]).unwrap();
        let target = t
            .update(&[frame.region(RED_BOX).unwrap(), frame.region(BLUE_BOX).unwrap()])
            .unwrap()
            .unwrap();

        assert!(!target.cold_start);
        assert_eq!(target.rect, BLUE_BOX);
        assert_eq!(t.state().loss_count(), 0);
        assert_eq!(t.state().reference().cloned(), reference);
    }

    #[test]
    fn test_loss_forces_cold_start() {
        let data = frame_data();
        let frame = FrameView::new(&data, 40, 10, 3).unwrap();
        let mut t = tracker(2);
        t.update(&[frame.region(BLUE_BOX).unwrap()]).unwrap();
        t.update(&[]).unwrap();
        t.update(&[]).unwrap();

        let target = t
            .update(&[frame.region(RED_BOX).unwrap(), frame.region(BLUE_BOX).unwrap()])
            .unwrap()
            .unwrap();

        assert!(target.cold_start);
        assert_eq!(target.rect, RED_BOX);
        assert_eq!(target.previous_area, None);
    }

    #[test]
    fn test_lock_first_never_replaces_reference() {
        let data = frame_data();
        let frame = FrameView::new(&data, 40, 10, 3).unwrap();
        let mut t = tracker(5);
        let half = Bbox::new(10, 0, 20, 10);

        t.update(&[frame.region(half).unwrap()]).unwrap();
        let reference = t.state().reference().cloned();
        t.update(&[frame.region(BLUE_BOX).unwrap()]).unwrap();

        assert_eq!(t.state().reference().cloned(), reference);
    }

    #[test]
    fn test_refresh_on_match_replaces_reference() {
        let data = frame_data();
        let frame = FrameView::new(&data, 40, 10, 3).unwrap();
        let mut t = TargetTracker::new(
            TrackerConfig {
                loss_threshold: 5,
                signature_policy: SignaturePolicy::RefreshOnMatch { min_score: 0.4 },
            },
            &appearance(),
        );
        let half = Bbox::new(10, 0, 20, 10);

        t.update(&[frame.region(half).unwrap()]).unwrap();
        // Blue scores 0.5 against the half-and-half reference
        let blue = frame.region(BLUE_BOX).unwrap();
        t.update(&[blue]).unwrap();

        assert_eq!(
            t.state().reference(),
            Some(&t.matcher().extractor().compute(&blue))
        );
    }

    #[test]
    fn test_refresh_below_min_score_keeps_reference() {
        let data = frame_data();
        let frame = FrameView::new(&data, 40, 10, 3).unwrap();
        let mut t = TargetTracker::new(
            TrackerConfig {
                loss_threshold: 5,
                signature_policy: SignaturePolicy::RefreshOnMatch { min_score: 0.9 },
            },
            &appearance(),
        );
        let half = Bbox::new(10, 0, 20, 10);

        t.update(&[frame.region(half).unwrap()]).unwrap();
        let reference = t.state().reference().cloned();
        t.update(&[frame.region(BLUE_BOX).unwrap()]).unwrap();

        assert_eq!(t.state().reference().cloned(), reference);
    }

    #[test]
    fn test_version_counts_frames() {
        let data = frame_data();
        let frame = FrameView::new(&data, 40, 10, 3).unwrap();
        let mut t = tracker(5);

        t.update(&[frame.region(RED_BOX).unwrap()]).unwrap();
        t.update(&[]).unwrap();
        t.update(&[]).unwrap();
        assert_eq!(t.state().version(), 3);

        t.reset();
        assert_eq!(t.state(), &TrackerState::new());
    }
}
