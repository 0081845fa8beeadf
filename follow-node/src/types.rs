//! Frame and detection types exchanged with the camera and detector

use crate::error::{FollowError, Result};
use reidtrack::{Bbox, FrameView};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pixel layout of an interleaved 8-bit frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Rgb,
    /// What the robot's camera driver publishes
    #[default]
    Bgr,
    Rgba,
    Bgra,
}

impl ImageFormat {
    pub fn channels(&self) -> u32 {
        match self {
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
        }
    }
}

/// Owned camera frame
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Pixel format
    pub format: ImageFormat,
}

impl ImageData {
    /// Create new image data
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: ImageFormat) -> Self {
        Self {
            data,
            width,
            height,
            format,
        }
    }

    /// Uniformly filled 3-channel frame
    pub fn filled(width: u32, height: u32, pixel: [u8; 3], format: ImageFormat) -> Self {
        let channels = format.channels() as usize;
        let mut data = Vec::with_capacity(width as usize * height as usize * channels);
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&pixel);
            if channels == 4 {
                data.push(255);
            }
        }
        Self::new(data, width, height, format)
    }

    /// Load image from file path, stored in `format` channel order
    pub fn from_file<P: AsRef<Path>>(path: P, format: ImageFormat) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| {
            FollowError::image_data(format!("Failed to load {}: {}", path.display(), e))
        })?;
        Ok(Self::from_dynamic(img, format))
    }

    /// Decode image from encoded bytes (PNG, JPEG, BMP)
    pub fn from_bytes(bytes: &[u8], format: ImageFormat) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(img, format))
    }

    fn from_dynamic(img: image::DynamicImage, format: ImageFormat) -> Self {
        let (width, height) = (img.width(), img.height());
        let mut data = match format {
            ImageFormat::Rgb | ImageFormat::Bgr => img.to_rgb8().into_raw(),
            ImageFormat::Rgba | ImageFormat::Bgra => img.to_rgba8().into_raw(),
        };

        if matches!(format, ImageFormat::Bgr | ImageFormat::Bgra) {
            for px in data.chunks_exact_mut(format.channels() as usize) {
                px.swap(0, 2);
            }
        }

        Self {
            data,
            width,
            height,
            format,
        }
    }

    /// Get number of channels
    pub fn channels(&self) -> u32 {
        self.format.channels()
    }

    /// Validate image data consistency
    pub fn validate(&self) -> bool {
        let expected_size = self.width as usize * self.height as usize * self.channels() as usize;
        self.width > 0 && self.height > 0 && self.data.len() == expected_size
    }

    /// Borrow as a frame the follower can read
    pub fn view(&self) -> Result<FrameView<'_>> {
        Ok(FrameView::new(
            &self.data,
            self.width,
            self.height,
            self.channels(),
        )?)
    }
}

/// One person detection in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Detector score; detectors without one report 1.0
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl Detection {
    pub fn new(x: f32, y: f32, width: f32, height: f32, confidence: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// Round to whole pixels and clip to the image. Boxes that end up
    /// narrower or shorter than `min_size` are dropped.
    pub fn to_bbox(&self, img_width: u32, img_height: u32, min_size: u32) -> Option<Bbox> {
        let coords = [self.x, self.y, self.width, self.height];
        if coords.iter().any(|v| !v.is_finite()) || self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }

        let x1 = self.x.round().max(0.0);
        let y1 = self.y.round().max(0.0);
        let x2 = (self.x + self.width).round().min(img_width as f32);
        let y2 = (self.y + self.height).round().min(img_height as f32);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        let bbox = Bbox::from_xyxy(x1 as u32, y1 as u32, x2 as u32, y2 as u32);
        let min_size = min_size.max(1);
        if bbox.width < min_size || bbox.height < min_size {
            None
        } else {
            Some(bbox)
        }
    }
}
