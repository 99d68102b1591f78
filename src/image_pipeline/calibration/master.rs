//! Master calibration frame creation.

use tracing::{debug, info, instrument};

use crate::image_pipeline::calibration::types::{MasterFrame, MasterSet};
use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::plane::Plane;
use crate::image_pipeline::raw::types::{FrameRole, RawFrame, Sensor};

pub struct MasterFrameBuilder;

impl MasterFrameBuilder {
    /// Averages a stack of raw frames of one sensor and role.
    ///
    /// When `subtract` is given it is removed from every frame before
    /// averaging. Since the mean is linear this equals subtracting it from
    /// the finished master, but keeping it here makes the master frame
    /// self-contained.
    ///
    /// # Errors
    /// * `EmptyFrameSet` if `frames` is empty
    /// * `FrameTagMismatch` if any frame carries a different sensor or role
    /// * `GeometryMismatch` if frames or `subtract` disagree in size
    #[instrument(skip(frames, subtract), fields(count = frames.len()))]
    pub fn build(
        frames: &[RawFrame],
        sensor: Sensor,
        role: FrameRole,
        subtract: Option<&MasterFrame>,
    ) -> Result<MasterFrame> {
        let first = frames
            .first()
            .ok_or(CalibrationError::EmptyFrameSet { sensor, role })?;
        let (width, height) = (first.width(), first.height());

        for frame in frames {
            if frame.sensor() != sensor || frame.role() != role {
                return Err(CalibrationError::FrameTagMismatch {
                    expected_sensor: sensor,
                    expected_role: role,
                    found_sensor: frame.sensor(),
                    found_role: frame.role(),
                });
            }
            if frame.width() != width || frame.height() != height {
                return Err(CalibrationError::GeometryMismatch {
                    context: "calibration stack",
                    expected_width: width,
                    expected_height: height,
                    found_width: frame.width(),
                    found_height: frame.height(),
                });
            }
        }

        let mut sum = vec![0.0f64; width * height];
        for frame in frames {
            for (acc, v) in sum.iter_mut().zip(frame.normalized()) {
                *acc += v as f64;
            }
        }

        if let Some(reference) = subtract {
            if reference.sensor != sensor {
                return Err(CalibrationError::FrameTagMismatch {
                    expected_sensor: sensor,
                    expected_role: reference.role,
                    found_sensor: reference.sensor,
                    found_role: reference.role,
                });
            }
            if reference.plane.dimensions() != (width, height) {
                return Err(CalibrationError::GeometryMismatch {
                    context: "subtracted master",
                    expected_width: width,
                    expected_height: height,
                    found_width: reference.plane.width,
                    found_height: reference.plane.height,
                });
            }
            debug!("Subtracting {} master before averaging", reference.role);
            let n = frames.len() as f64;
            for (acc, &r) in sum.iter_mut().zip(&reference.plane.data) {
                *acc -= n * r as f64;
            }
        }

        let n = frames.len() as f64;
        let data = sum.into_iter().map(|v| (v / n) as f32).collect();

        info!("Built {} {} master from {} frames", sensor, role, frames.len());

        Ok(MasterFrame {
            sensor,
            role,
            frame_count: frames.len(),
            plane: Plane { width, height, data },
        })
    }

    /// Builds the full bias → dark → flat chain for one sensor.
    ///
    /// The dark master is bias-subtracted and the flat master has both bias
    /// and dark removed, so the calibrator can apply them in sequence without
    /// subtracting any offset twice.
    pub fn build_set(
        sensor: Sensor,
        bias_frames: &[RawFrame],
        dark_frames: &[RawFrame],
        flat_frames: &[RawFrame],
    ) -> Result<MasterSet> {
        let bias = Self::build(bias_frames, sensor, FrameRole::Bias, None)?;
        let dark = Self::build(dark_frames, sensor, FrameRole::Dark, Some(&bias))?;
        let offset = bias.offset_sum(&dark)?;
        let flat = Self::build(flat_frames, sensor, FrameRole::Flat, Some(&offset))?;

        Ok(MasterSet {
            sensor,
            bias,
            dark,
            flat,
        })
    }
}
