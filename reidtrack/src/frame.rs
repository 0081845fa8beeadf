//! Borrowed, read-only views into a frame's pixel buffer

use crate::bbox::Bbox;
use crate::error::{ReidError, Result};

/// Read-only view of an interleaved 8-bit frame.
///
/// Only the first three channels of each pixel are read, so 3- and
/// 4-channel layouts are both accepted. Channel order is whatever the camera
/// delivered; signatures are only compared against signatures built from the
/// same source.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    channels: u32,
}

impl<'a> FrameView<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32, channels: u32) -> Result<Self> {
        let expected = width as usize * height as usize * channels as usize;
        if !(3..=4).contains(&channels) || data.len() != expected {
            return Err(ReidError::InvalidFrame {
                width,
                height,
                channels,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Whole-frame rectangle
    pub fn bounds(&self) -> Bbox {
        Bbox::new(0, 0, self.width, self.height)
    }

    /// Borrow the pixels under `region`
    pub fn region(&self, region: Bbox) -> Result<CandidateView<'a>> {
        if !self.bounds().contains(&region) {
            return Err(ReidError::RegionOutOfBounds {
                region: region.to_string(),
                width: self.width,
                height: self.height,
            });
        }
        Ok(CandidateView {
            frame: *self,
            rect: region,
        })
    }
}

/// A candidate rectangle paired with the frame it was detected in. Lives only
/// for one frame's processing pass.
#[derive(Debug, Clone, Copy)]
pub struct CandidateView<'a> {
    frame: FrameView<'a>,
    rect: Bbox,
}

impl<'a> CandidateView<'a> {
    pub fn rect(&self) -> Bbox {
        self.rect
    }

    /// Iterate the first three channel values of every pixel in the region,
    /// row by row
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + 'a {
        let data: &'a [u8] = self.frame.data;
        let rect = self.rect;
        let channels = self.frame.channels as usize;
        let stride = self.frame.width as usize * channels;

        (rect.y..rect.y + rect.height).flat_map(move |row| {
            let start = row as usize * stride + rect.x as usize * channels;
            let end = start + rect.width as usize * channels;
            let row_data: &'a [u8] = &data[start..end];
            row_data
                .chunks_exact(channels)
                .map(|px| [px[0], px[1], px[2]])
        })
    }
}
