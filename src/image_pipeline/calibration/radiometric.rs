use tracing::{info, instrument, warn};

use crate::image_pipeline::calibration::types::{CalibratedFrame, MasterSet};
use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::plane::{INVALID_PIXEL, Plane};
use crate::image_pipeline::raw::types::{FrameRole, RawFrame};

/// Flat responses at or below this are treated as dead pixels.
pub const DEFAULT_FLAT_EPSILON: f32 = 1e-6;

/// Applies `clamp(((raw - bias) - dark) / flat, 0, 1)` to scene frames.
pub struct RadiometricCalibrator {
    flat_epsilon: f32,
}

impl Default for RadiometricCalibrator {
    fn default() -> Self {
        Self::new(DEFAULT_FLAT_EPSILON)
    }
}

impl RadiometricCalibrator {
    pub fn new(flat_epsilon: f32) -> Self {
        Self { flat_epsilon }
    }

    /// Calibrates one scene frame against the masters of the same sensor.
    ///
    /// Pixels whose flat value is not above the epsilon are written as
    /// `INVALID_PIXEL` instead of being divided.
    #[instrument(skip_all, fields(sensor = %raw.sensor()))]
    pub fn calibrate(&self, raw: &RawFrame, masters: &MasterSet) -> Result<CalibratedFrame> {
        if raw.sensor() != masters.sensor || raw.role() != FrameRole::Scene {
            return Err(CalibrationError::FrameTagMismatch {
                expected_sensor: masters.sensor,
                expected_role: FrameRole::Scene,
                found_sensor: raw.sensor(),
                found_role: raw.role(),
            });
        }

        let scene = Plane::from_vec(raw.width(), raw.height(), raw.normalized())?;
        scene.ensure_same_shape(&masters.bias.plane, "bias master")?;
        scene.ensure_same_shape(&masters.dark.plane, "dark master")?;
        scene.ensure_same_shape(&masters.flat.plane, "flat master")?;

        let mut invalid = 0usize;
        let data: Vec<f32> = scene
            .data
            .iter()
            .zip(&masters.bias.plane.data)
            .zip(&masters.dark.plane.data)
            .zip(&masters.flat.plane.data)
            .map(|(((&r, &b), &d), &f)| {
                if f > self.flat_epsilon {
                    (((r - b) - d) / f).clamp(0.0, 1.0)
                } else {
                    invalid += 1;
                    INVALID_PIXEL
                }
            })
            .collect();

        if invalid > 0 {
            warn!("{} pixels have a degenerate flat response and were marked invalid", invalid);
        }
        info!("Calibrated {}x{} frame", scene.width, scene.height);

        Ok(CalibratedFrame {
            sensor: raw.sensor(),
            plane: Plane {
                width: scene.width,
                height: scene.height,
                data,
            },
        })
    }
}
