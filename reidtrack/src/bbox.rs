//! Axis-aligned candidate rectangles in pixel coordinates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned rectangle, top-left corner plus size, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bbox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bbox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create from corner coordinates; `x2`/`y2` are exclusive
    pub fn from_xyxy(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1))
    }

    /// Exclusive right edge
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    /// Horizontal center. Kept fractional so odd widths are not rounded.
    pub fn center_x(&self) -> f64 {
        self.x as f64 + self.width as f64 / 2.0
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection rectangle, `None` when the two do not overlap
    pub fn intersection(&self, other: &Bbox) -> Option<Bbox> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 <= x1 as u64 || y2 <= y1 as u64 {
            return None;
        }

        Some(Bbox::new(x1, y1, (x2 - x1 as u64) as u32, (y2 - y1 as u64) as u32))
    }

    /// Whether `inner` lies entirely within `self`, edges included
    pub fn contains(&self, inner: &Bbox) -> bool {
        inner.x >= self.x
            && inner.y >= self.y
            && inner.right() <= self.right()
            && inner.bottom() <= self.bottom()
    }

    /// Clip to a `width` x `height` frame. Returns `None` if nothing is left.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Bbox> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let x2 = self.right().min(width as u64) as u32;
        let y2 = self.bottom().min(height as u64) as u32;
        let clipped = Bbox::from_xyxy(self.x, self.y, x2, y2);

        if clipped.is_empty() {
            None
        } else {
            Some(clipped)
        }
    }
}

impl fmt::Display for Bbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bbox(x={}, y={}, w={}, h={})",
            self.x, self.y, self.width, self.height
        )
    }
}
