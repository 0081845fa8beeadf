/// Detector collaborator interface
///
/// The person detector itself lives outside this crate. Anything that turns
/// a frame into candidate boxes can drive the pipeline by implementing this
/// trait.
use crate::error::Result;
use crate::types::{Detection, ImageData};

/// Common interface for person detectors
pub trait Detector: Send {
    /// Detect people in a single frame. An empty list is a valid answer.
    fn detect(&mut self, image: &ImageData) -> Result<Vec<Detection>>;

    /// Get the detector name (for logging/debugging)
    fn name(&self) -> &str;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&mut self, image: &ImageData) -> Result<Vec<Detection>> {
        (**self).detect(image)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
