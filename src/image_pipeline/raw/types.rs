//! Raw sensor frame types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::error::{CalibrationError, Result};

/// Largest supported sample width; samples are held in `u16`.
pub const MAX_BITS_PER_SAMPLE: u32 = 16;

/// Which of the two co-registered sensors produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    /// Visible channel behind an RGGB color filter array
    Rgb,
    /// Near-infrared monochrome channel
    Nir,
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sensor::Rgb => write!(f, "RGB"),
            Sensor::Nir => write!(f, "NIR"),
        }
    }
}

/// What a frame was captured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameRole {
    /// Plant image to be calibrated
    Scene,
    /// Minimum exposure, lens shuttered
    Bias,
    /// Working exposure, lens shuttered
    Dark,
    /// Working exposure, lens uncovered on a uniform target
    Flat,
}

impl fmt::Display for FrameRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRole::Scene => write!(f, "scene"),
            FrameRole::Bias => write!(f, "bias"),
            FrameRole::Dark => write!(f, "dark"),
            FrameRole::Flat => write!(f, "flat"),
        }
    }
}

/// Fixed frame geometry declared by the acquisition setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: usize,
    pub height: usize,
    pub bits_per_sample: u32,
}

impl Default for FrameGeometry {
    fn default() -> Self {
        // Full-resolution Mono8 / BayerRG8 output of the dual-sensor camera
        Self {
            width: 2048,
            height: 1536,
            bits_per_sample: 8,
        }
    }
}

impl FrameGeometry {
    pub fn new(width: usize, height: usize, bits_per_sample: u32) -> Self {
        Self {
            width,
            height,
            bits_per_sample,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CalibrationError::InvalidDimensions(self.width, self.height));
        }
        if self.bits_per_sample == 0 || self.bits_per_sample > MAX_BITS_PER_SAMPLE {
            return Err(CalibrationError::UnsupportedBitDepth(self.bits_per_sample));
        }
        Ok(())
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Largest representable sample value, `2^bits - 1`.
    pub fn full_scale(&self) -> u32 {
        (1u32 << self.bits_per_sample) - 1
    }
}

/// Immutable single-channel frame as read from storage.
#[derive(Debug, Clone)]
pub struct RawFrame {
    geometry: FrameGeometry,
    sensor: Sensor,
    role: FrameRole,
    data: Vec<u16>,
}

impl RawFrame {
    /// Wraps decoded samples, checking length and that every sample fits the
    /// declared bit depth.
    pub fn new(geometry: FrameGeometry, sensor: Sensor, role: FrameRole, data: Vec<u16>) -> Result<Self> {
        geometry.validate()?;
        if data.len() != geometry.pixel_count() {
            return Err(CalibrationError::DecodeError(format!(
                "expected {} samples for {}x{}, got {}",
                geometry.pixel_count(),
                geometry.width,
                geometry.height,
                data.len()
            )));
        }
        let full_scale = geometry.full_scale();
        if let Some(&bad) = data.iter().find(|&&v| v as u32 > full_scale) {
            return Err(CalibrationError::DecodeError(format!(
                "sample {} exceeds {}-bit range",
                bad, geometry.bits_per_sample
            )));
        }
        Ok(Self {
            geometry,
            sensor,
            role,
            data,
        })
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn width(&self) -> usize {
        self.geometry.width
    }

    pub fn height(&self) -> usize {
        self.geometry.height
    }

    pub fn sensor(&self) -> Sensor {
        self.sensor
    }

    pub fn role(&self) -> FrameRole {
        self.role
    }

    pub fn data(&self) -> &[u16] {
        &self.data
    }

    /// Samples scaled to [0, 1] by the declared full scale.
    pub fn normalized(&self) -> Vec<f32> {
        let scale = 1.0 / self.geometry.full_scale() as f32;
        self.data.iter().map(|&v| v as f32 * scale).collect()
    }
}
