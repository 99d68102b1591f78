//! Gray-reference white balance.
//!
//! Gains are anchored on red: green and blue are rescaled so that their mean
//! inside the reference chip equals the red mean.

use tracing::info;

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::roi::Roi;
use crate::image_pipeline::debayer::types::{ColorImage, WhiteBalance};

const CHANNEL_NAMES: [&str; 3] = ["white-balance red", "white-balance green", "white-balance blue"];

/// Measures channel means inside `roi` and derives red-anchored gains.
pub fn measure_white_balance(image: &ColorImage, roi: &Roi, epsilon: f64) -> Result<WhiteBalance> {
    roi.check_within(image.width(), image.height())?;

    let mut means = [0.0f64; 3];
    for (i, plane) in image.planes().into_iter().enumerate() {
        let mean = plane.roi_mean(roi).ok_or(CalibrationError::DegenerateReference {
            what: CHANNEL_NAMES[i],
            value: f64::NAN,
        })?;
        if mean <= epsilon {
            return Err(CalibrationError::DegenerateReference {
                what: CHANNEL_NAMES[i],
                value: mean,
            });
        }
        means[i] = mean;
    }

    let gains = [
        1.0,
        (means[0] / means[1]) as f32,
        (means[0] / means[2]) as f32,
    ];

    info!(
        "White balance gains R={:.4} G={:.4} B={:.4} (reference means {:.4}/{:.4}/{:.4})",
        gains[0], gains[1], gains[2], means[0], means[1], means[2]
    );

    Ok(WhiteBalance {
        gains,
        reference_means: means,
    })
}

/// Applies per-channel gains; invalid pixels stay invalid.
pub fn apply_white_balance(image: &ColorImage, balance: &WhiteBalance) -> ColorImage {
    let [gr, gg, gb] = balance.gains;
    ColorImage {
        red: image.red.map(|v| v * gr),
        green: image.green.map(|v| v * gg),
        blue: image.blue.map(|v| v * gb),
    }
}
