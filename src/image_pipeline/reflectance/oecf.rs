//! Empirical-line (OECF) reflectance calibration.
//!
//! For each channel the mean response inside every chip is regressed against
//! the chip's known reflectance by ordinary least squares, and the resulting
//! line is applied to every pixel of that channel.

use tracing::{debug, info, instrument, warn};

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::plane::Plane;
use crate::image_pipeline::debayer::types::ColorImage;
use crate::image_pipeline::reflectance::chips::{ChipSet, MIN_CHIPS};
use crate::image_pipeline::reflectance::types::{CalibrationCurve, Channel, ReflectanceFrame};

/// Spread of the measured chip means below which the fit is undetermined.
const MIN_MEASURED_SPREAD: f64 = 1e-12;

/// Least-squares line through `(measured, reference)` pairs.
///
/// # Errors
/// * `InsufficientChips` for fewer than two points
/// * `DegenerateFit` when all measured values coincide
pub fn fit_line(channel: Channel, points: &[(f64, f64)]) -> Result<CalibrationCurve> {
    if points.len() < MIN_CHIPS {
        return Err(CalibrationError::InsufficientChips(points.len()));
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();

    if sxx <= MIN_MEASURED_SPREAD {
        return Err(CalibrationError::DegenerateFit(format!(
            "{} channel: all {} chips measure {:.6}",
            channel,
            points.len(),
            mean_x
        )));
    }

    let slope = sxy / sxx;
    Ok(CalibrationCurve {
        channel,
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

pub struct ReflectanceCalibrator;

impl ReflectanceCalibrator {
    /// Mean response inside each chip paired with its reference reflectance.
    pub fn measure_chips(plane: &Plane, chips: &ChipSet) -> Result<Vec<(f64, f64)>> {
        chips.validate(plane.width, plane.height)?;
        chips
            .chips()
            .iter()
            .map(|chip| {
                let measured = plane.roi_mean(&chip.roi).ok_or_else(|| {
                    CalibrationError::DegenerateFit(format!("chip {} has no valid pixels", chip.roi))
                })?;
                Ok((measured, chip.reflectance()))
            })
            .collect()
    }

    /// Fits and applies the OECF for one channel.
    #[instrument(skip(plane, chips), fields(chip_count = chips.len()))]
    pub fn calibrate_plane(
        plane: &Plane,
        channel: Channel,
        chips: &ChipSet,
    ) -> Result<(ReflectanceFrame, CalibrationCurve)> {
        let points = Self::measure_chips(plane, chips)?;
        for (measured, reference) in &points {
            debug!("{} chip: measured {:.5} -> reference {:.3}", channel, measured, reference);
        }

        let curve = fit_line(channel, &points)?;
        info!(
            "{} OECF: reflectance = {:.5} * value + {:.5}",
            channel, curve.slope, curve.intercept
        );

        let frame = ReflectanceFrame {
            channel,
            plane: plane.map(|v| if v.is_finite() { curve.apply(v) } else { v }),
        };

        let out_of_band = frame.out_of_band();
        if out_of_band > 0 {
            warn!("{} {} pixels fall outside the nominal [0, 1] reflectance band", out_of_band, channel);
        }

        Ok((frame, curve))
    }

    /// Calibrates red, green and blue independently against the same chips.
    pub fn calibrate_color(
        image: &ColorImage,
        chips: &ChipSet,
    ) -> Result<([ReflectanceFrame; 3], [CalibrationCurve; 3])> {
        let (red, red_curve) = Self::calibrate_plane(&image.red, Channel::Red, chips)?;
        let (green, green_curve) = Self::calibrate_plane(&image.green, Channel::Green, chips)?;
        let (blue, blue_curve) = Self::calibrate_plane(&image.blue, Channel::Blue, chips)?;
        Ok(([red, green, blue], [red_curve, green_curve, blue_curve]))
    }
}
