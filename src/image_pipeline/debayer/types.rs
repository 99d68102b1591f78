//! Types for debayering operations

use crate::image_pipeline::common::plane::Plane;

/// Three co-registered color planes after demosaicing.
#[derive(Debug, Clone)]
pub struct ColorImage {
    pub red: Plane,
    pub green: Plane,
    pub blue: Plane,
}

impl ColorImage {
    pub fn width(&self) -> usize {
        self.red.width
    }

    pub fn height(&self) -> usize {
        self.red.height
    }

    pub fn planes(&self) -> [&Plane; 3] {
        [&self.red, &self.green, &self.blue]
    }
}

/// Per-channel gains derived from the gray reference chip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhiteBalance {
    /// Multipliers applied to [R, G, B]; red is the anchor and stays 1
    pub gains: [f32; 3],
    /// Channel means inside the reference ROI before correction
    pub reference_means: [f64; 3],
}

impl WhiteBalance {
    /// Red-channel mean of the reference chip, the scale anchor for NIR.
    pub fn red_reference(&self) -> f64 {
        self.reference_means[0]
    }
}
