//! Calibration frame types

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::plane::Plane;
use crate::image_pipeline::raw::types::{FrameRole, Sensor};

/// Pixelwise mean of a set of calibration frames, in normalized sample units.
#[derive(Debug, Clone)]
pub struct MasterFrame {
    pub sensor: Sensor,
    pub role: FrameRole,
    /// Number of raw frames that were averaged
    pub frame_count: usize,
    pub plane: Plane,
}

impl MasterFrame {
    /// Pixelwise sum of two masters of the same sensor, used as the total
    /// offset (bias + dark) removed from flat frames.
    pub fn offset_sum(&self, other: &MasterFrame) -> Result<MasterFrame> {
        if self.sensor != other.sensor {
            return Err(CalibrationError::FrameTagMismatch {
                expected_sensor: self.sensor,
                expected_role: other.role,
                found_sensor: other.sensor,
                found_role: other.role,
            });
        }
        self.plane.ensure_same_shape(&other.plane, "offset master")?;

        let data = self
            .plane
            .data
            .iter()
            .zip(&other.plane.data)
            .map(|(a, b)| a + b)
            .collect();

        Ok(MasterFrame {
            sensor: self.sensor,
            role: other.role,
            frame_count: self.frame_count.min(other.frame_count),
            plane: Plane {
                width: self.plane.width,
                height: self.plane.height,
                data,
            },
        })
    }
}

/// The three reference frames needed to calibrate one sensor.
#[derive(Debug, Clone)]
pub struct MasterSet {
    pub sensor: Sensor,
    pub bias: MasterFrame,
    /// Dark current only: bias already removed
    pub dark: MasterFrame,
    /// Pixel response: bias and dark already removed
    pub flat: MasterFrame,
}

/// Scene frame after bias/dark/flat correction.
///
/// Values lie in [0, 1]; pixels whose flat response was degenerate hold
/// [`INVALID_PIXEL`](crate::image_pipeline::common::INVALID_PIXEL).
#[derive(Debug, Clone)]
pub struct CalibratedFrame {
    pub sensor: Sensor,
    pub plane: Plane,
}
