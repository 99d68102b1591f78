use tracing::instrument;

use crate::image_pipeline::calibration::types::CalibratedFrame;
use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::roi::Roi;
use crate::image_pipeline::debayer::cpu_debayer::CpuDebayer;
use crate::image_pipeline::debayer::types::{ColorImage, WhiteBalance};
use crate::image_pipeline::debayer::white_balance::{apply_white_balance, measure_white_balance};
use crate::image_pipeline::raw::types::{FrameRole, Sensor};

/// Demosaics the calibrated RGB frame and white-balances it on a gray chip.
pub struct ColorReconstructor {
    debayer: CpuDebayer,
    reference_epsilon: f64,
}

impl ColorReconstructor {
    pub fn new(reference_epsilon: f64) -> Self {
        Self {
            debayer: CpuDebayer::new(),
            reference_epsilon,
        }
    }

    #[instrument(skip_all, fields(roi = %white_balance_roi))]
    pub fn reconstruct(
        &self,
        frame: &CalibratedFrame,
        white_balance_roi: &Roi,
    ) -> Result<(ColorImage, WhiteBalance)> {
        if frame.sensor != Sensor::Rgb {
            return Err(CalibrationError::FrameTagMismatch {
                expected_sensor: Sensor::Rgb,
                expected_role: FrameRole::Scene,
                found_sensor: frame.sensor,
                found_role: FrameRole::Scene,
            });
        }
        white_balance_roi.check_within(frame.plane.width, frame.plane.height)?;

        let color = self.debayer.process(&frame.plane)?;
        let balance = measure_white_balance(&color, white_balance_roi, self.reference_epsilon)?;
        Ok((apply_white_balance(&color, &balance), balance))
    }
}
