//! Cross-sensor intensity normalization.
//!
//! The RGB and NIR sensors run with independent gain and exposure. Both see
//! the same white reference, so one global factor puts the NIR response on
//! the scale of the RGB red channel before the two are combined.

use tracing::{info, instrument};

use crate::image_pipeline::calibration::types::CalibratedFrame;
use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::roi::Roi;
use crate::image_pipeline::raw::types::{FrameRole, Sensor};

/// NIR frame rescaled onto the RGB red-channel baseline.
#[derive(Debug, Clone)]
pub struct NormalizedNir {
    pub frame: CalibratedFrame,
    /// `rgb_red_ref_mean / nir_ref_mean`
    pub scale: f64,
    pub nir_reference_mean: f64,
}

pub struct ChannelNormalizer {
    reference_epsilon: f64,
}

impl ChannelNormalizer {
    pub fn new(reference_epsilon: f64) -> Self {
        Self { reference_epsilon }
    }

    #[instrument(skip(self, nir), fields(roi = %roi))]
    pub fn normalize(&self, nir: &CalibratedFrame, roi: &Roi, rgb_red_reference: f64) -> Result<NormalizedNir> {
        if nir.sensor != Sensor::Nir {
            return Err(CalibrationError::FrameTagMismatch {
                expected_sensor: Sensor::Nir,
                expected_role: FrameRole::Scene,
                found_sensor: nir.sensor,
                found_role: FrameRole::Scene,
            });
        }
        roi.check_within(nir.plane.width, nir.plane.height)?;

        if !(rgb_red_reference > self.reference_epsilon) {
            return Err(CalibrationError::DegenerateReference {
                what: "RGB red reference",
                value: rgb_red_reference,
            });
        }

        let nir_mean = nir.plane.roi_mean(roi).unwrap_or(f64::NAN);
        if !(nir_mean > self.reference_epsilon) {
            return Err(CalibrationError::DegenerateReference {
                what: "NIR reference",
                value: nir_mean,
            });
        }

        let scale = rgb_red_reference / nir_mean;
        info!("NIR scale factor {:.5} (NIR ref {:.5}, RGB red ref {:.5})", scale, nir_mean, rgb_red_reference);

        let factor = scale as f32;
        let plane = nir.plane.map(|v| if v.is_finite() { (v * factor).clamp(0.0, 1.0) } else { v });

        Ok(NormalizedNir {
            frame: CalibratedFrame {
                sensor: Sensor::Nir,
                plane,
            },
            scale,
            nir_reference_mean: nir_mean,
        })
    }
}
