use std::fmt;

use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::error::{CalibrationError, Result};

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Roi {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    /// Fails unless the rectangle is non-empty and lies fully inside a
    /// `frame_width` x `frame_height` frame.
    pub fn check_within(&self, frame_width: usize, frame_height: usize) -> Result<()> {
        let fits = self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= frame_width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= frame_height);
        if fits {
            Ok(())
        } else {
            Err(CalibrationError::RoiOutOfBounds {
                roi: *self,
                width: frame_width,
                height: frame_height,
            })
        }
    }

    /// Row-major pixel indices covered by the rectangle in a frame of the given width.
    pub fn indices(&self, frame_width: usize) -> impl Iterator<Item = usize> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |row| (self.x..self.x + self.width).map(move |col| row * frame_width + col))
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}
