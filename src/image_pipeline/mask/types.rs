use serde::Serialize;

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::index::IndexMap;

/// Binary per-pixel mask, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<bool>,
}

impl Mask {
    pub fn filled(width: usize, height: usize, value: bool) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Builds a mask from one byte per pixel.
    ///
    /// Accepts `{0, 1}` and `{0, 255}` encodings; any other value is a
    /// `NonBinaryMask` error.
    pub fn from_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CalibrationError::InvalidDimensions(width, height));
        }
        if bytes.len() != width * height {
            return Err(CalibrationError::MaskShapeMismatch {
                expected_width: width,
                expected_height: height,
                found_width: bytes.len(),
                found_height: 1,
            });
        }

        let data = bytes
            .iter()
            .map(|&b| match b {
                0 => Ok(false),
                1 | 255 => Ok(true),
                other => Err(CalibrationError::NonBinaryMask(other)),
            })
            .collect::<Result<Vec<bool>>>()?;

        Ok(Self { width, height, data })
    }

    /// One byte per pixel, 255 for set pixels.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.iter().map(|&set| if set { 255 } else { 0 }).collect()
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&set| set).count()
    }

    pub fn ensure_matches(&self, index: &IndexMap) -> Result<()> {
        if self.width != index.width() || self.height != index.height() || self.data.len() != index.plane.data.len()
        {
            return Err(CalibrationError::MaskShapeMismatch {
                expected_width: index.width(),
                expected_height: index.height(),
                found_width: self.width,
                found_height: self.height,
            });
        }
        Ok(())
    }
}

/// Mean and population standard deviation of the index over the refined mask.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidityStats {
    pub mean: f64,
    pub std_dev: f64,
    pub pixel_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::common::plane::Plane;

    #[test]
    fn test_from_bytes_accepts_both_encodings() {
        let a = Mask::from_bytes(2, 2, &[0, 1, 1, 0]).unwrap();
        let b = Mask::from_bytes(2, 2, &[0, 255, 255, 0]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.count(), 2);
    }

    #[test]
    fn test_from_bytes_rejects_grey_values() {
        let result = Mask::from_bytes(2, 1, &[0, 128]);
        assert!(matches!(result, Err(CalibrationError::NonBinaryMask(128))));
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        let result = Mask::from_bytes(2, 2, &[0, 1, 1]);
        assert!(matches!(result, Err(CalibrationError::MaskShapeMismatch { .. })));
    }

    #[test]
    fn test_shape_check_against_index() {
        let index = IndexMap {
            plane: Plane::filled(3, 2, 0.5),
        };
        assert!(Mask::filled(3, 2, true).ensure_matches(&index).is_ok());
        assert!(matches!(
            Mask::filled(2, 3, true).ensure_matches(&index),
            Err(CalibrationError::MaskShapeMismatch { .. })
        ));
    }
}
