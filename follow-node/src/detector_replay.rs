//! Detector that replays recorded detections frame by frame

use crate::detector_trait::Detector;
use crate::error::{FollowError, Result};
use crate::types::{Detection, ImageData};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// One recorded frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub frame_id: u64,
    /// Frame image, relative to the document's directory
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// Recorded detector output for a sequence of frames
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayDocument {
    /// Size of frames that have no image on disk
    #[serde(default)]
    pub frame_size: Option<(u32, u32)>,
    pub frames: Vec<ReplayFrame>,
}

impl ReplayDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Hands out the recorded detections in order, one frame per call
#[derive(Debug, Clone)]
pub struct ReplayDetector {
    frames: VecDeque<ReplayFrame>,
    replayed: u64,
}

impl ReplayDetector {
    pub fn new(document: ReplayDocument) -> Self {
        log::info!("Replay detector loaded {} frames", document.frames.len());
        Self {
            frames: document.frames.into(),
            replayed: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn replayed(&self) -> u64 {
        self.replayed
    }
}

impl Detector for ReplayDetector {
    fn detect(&mut self, image: &ImageData) -> Result<Vec<Detection>> {
        let frame = self
            .frames
            .pop_front()
            .ok_or_else(|| FollowError::detector("replay exhausted"))?;
        self.replayed += 1;

        log::debug!(
            "Replaying frame {} ({}x{}): {} detections",
            frame.frame_id,
            image.width,
            image.height,
            frame.detections.len()
        );
        Ok(frame.detections)
    }

    fn name(&self) -> &str {
        "replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageFormat;

    const DOC: &str = r#"{
        "frame_size": [640, 480],
        "frames": [
            { "frame_id": 1, "detections": [ { "x": 280, "y": 40, "width": 100, "height": 200, "confidence": 0.8 } ] },
            { "frame_id": 2, "image": "frames/0002.png" }
        ]
    }"#;

    #[test]
    fn test_parse_document() {
        let doc = ReplayDocument::from_json(DOC).unwrap();
        assert_eq!(doc.frame_size, Some((640, 480)));
        assert_eq!(doc.frames.len(), 2);
        assert_eq!(doc.frames[0].image, None);
        assert_eq!(doc.frames[1].image, Some(PathBuf::from("frames/0002.png")));
        assert!(doc.frames[1].detections.is_empty());
    }

    #[test]
    fn test_replays_in_order_then_fails() {
        let mut detector = ReplayDetector::new(ReplayDocument::from_json(DOC).unwrap());
        let image = ImageData::filled(640, 480, [0, 0, 0], ImageFormat::Bgr);

        let first = detector.detect(&image).unwrap();
        assert_eq!(first, vec![Detection::new(280.0, 40.0, 100.0, 200.0, 0.8)]);
        assert!(detector.detect(&image).unwrap().is_empty());
        assert_eq!(detector.replayed(), 2);
        assert_eq!(detector.remaining(), 0);

        assert!(matches!(
            detector.detect(&image),
            Err(FollowError::DetectorError(_))
        ));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            ReplayDocument::from_json("{\"frames\": 3}"),
            Err(FollowError::SerializationError(_))
        ));
    }
}
