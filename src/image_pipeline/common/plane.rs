//! Single-plane floating point image storage shared by every pipeline stage.
//!
//! Invalid pixels are stored as `f32::NAN`. Producers write the sentinel
//! where a value cannot be defined (degenerate flat field, degenerate index
//! denominator); consumers skip non-finite values when reducing.

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::roi::Roi;

/// Marker value for pixels that carry no defined result.
pub const INVALID_PIXEL: f32 = f32::NAN;

#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    /// Width of the plane in pixels
    pub width: usize,
    /// Height of the plane in pixels
    pub height: usize,
    /// Row-major samples
    pub data: Vec<f32>,
}

impl Plane {
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(CalibrationError::InvalidDimensions(width, height));
        }
        Ok(Self { width, height, data })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    pub fn ensure_same_shape(&self, other: &Plane, context: &'static str) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(CalibrationError::GeometryMismatch {
                context,
                expected_width: self.width,
                expected_height: self.height,
                found_width: other.width,
                found_height: other.height,
            });
        }
        Ok(())
    }

    /// Mean of the finite samples inside `roi`, or `None` when the region
    /// holds no valid pixel. The ROI must already be bounds-checked.
    pub fn roi_mean(&self, roi: &Roi) -> Option<f64> {
        let (sum, count) = roi
            .indices(self.width)
            .map(|i| self.data[i])
            .filter(|v| v.is_finite())
            .fold((0.0f64, 0usize), |(s, n), v| (s + v as f64, n + 1));
        (count > 0).then(|| sum / count as f64)
    }

    pub fn map(&self, f: impl Fn(f32) -> f32) -> Plane {
        Plane {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    pub fn invalid_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_finite()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roi_mean_skips_invalid() {
        let plane = Plane::from_vec(2, 2, vec![1.0, INVALID_PIXEL, 3.0, 5.0]).unwrap();
        let mean = plane.roi_mean(&Roi::new(0, 0, 2, 2)).unwrap();
        assert!((mean - 3.0).abs() < 1e-9);
        assert_eq!(plane.invalid_count(), 1);
    }

    #[test]
    fn test_roi_mean_all_invalid() {
        let plane = Plane::filled(2, 2, INVALID_PIXEL);
        assert!(plane.roi_mean(&Roi::new(0, 0, 1, 1)).is_none());
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(matches!(
            Plane::from_vec(3, 3, vec![0.0; 8]),
            Err(CalibrationError::InvalidDimensions(3, 3))
        ));
    }
}
