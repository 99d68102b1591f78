//! Normalized-difference vegetation index.

use tracing::{info, instrument, warn};

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::plane::{INVALID_PIXEL, Plane};
use crate::image_pipeline::reflectance::types::{Channel, ReflectanceFrame};

/// `|nir + red|` at or below this yields an invalid pixel.
pub const DEFAULT_INDEX_EPSILON: f32 = 1e-6;

/// Per-pixel `(nir - red) / (nir + red)`; invalid pixels hold `INVALID_PIXEL`.
#[derive(Debug, Clone)]
pub struct IndexMap {
    pub plane: Plane,
}

impl IndexMap {
    pub fn width(&self) -> usize {
        self.plane.width
    }

    pub fn height(&self) -> usize {
        self.plane.height
    }

    pub fn is_valid(&self, i: usize) -> bool {
        self.plane.data[i].is_finite()
    }
}

pub struct IndexComputer {
    epsilon: f32,
}

impl Default for IndexComputer {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_EPSILON)
    }
}

impl IndexComputer {
    pub fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    pub fn ndvi(&self, red: f32, nir: f32) -> f32 {
        if !red.is_finite() || !nir.is_finite() {
            return INVALID_PIXEL;
        }
        let sum = nir + red;
        if sum.abs() <= self.epsilon {
            return INVALID_PIXEL;
        }
        (nir - red) / sum
    }

    #[instrument(skip_all)]
    pub fn compute(&self, red: &ReflectanceFrame, nir: &ReflectanceFrame) -> Result<IndexMap> {
        if red.channel != Channel::Red || nir.channel != Channel::Nir {
            return Err(CalibrationError::ConfigError(format!(
                "index needs red and nir reflectance, got {} and {}",
                red.channel, nir.channel
            )));
        }
        red.plane.ensure_same_shape(&nir.plane, "NIR reflectance")?;

        let out_of_band = red.out_of_band() + nir.out_of_band();
        if out_of_band > 0 {
            warn!("{} input reflectance values lie outside [0, 1]", out_of_band);
        }

        let data: Vec<f32> = red
            .plane
            .data
            .iter()
            .zip(&nir.plane.data)
            .map(|(&r, &n)| self.ndvi(r, n))
            .collect();

        let plane = Plane {
            width: red.plane.width,
            height: red.plane.height,
            data,
        };

        let invalid = plane.invalid_count();
        if invalid > 0 {
            warn!("{} index pixels are undefined", invalid);
        }
        info!("Computed {}x{} index map", plane.width, plane.height);

        Ok(IndexMap { plane })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(channel: Channel, data: Vec<f32>) -> ReflectanceFrame {
        let width = data.len();
        ReflectanceFrame {
            channel,
            plane: Plane::from_vec(width, 1, data).unwrap(),
        }
    }

    #[test]
    fn test_equal_channels_give_zero() {
        let computer = IndexComputer::default();
        for v in [0.01, 0.3, 0.9] {
            assert_eq!(computer.ndvi(v, v), 0.0);
        }
    }

    #[test]
    fn test_range_law() {
        let computer = IndexComputer::default();
        let samples = [0.001f32, 0.05, 0.2, 0.5, 0.77, 1.0];
        for &red in &samples {
            for &nir in &samples {
                let v = computer.ndvi(red, nir);
                assert!((-1.0..=1.0).contains(&v), "ndvi({red}, {nir}) = {v}");
            }
        }
    }

    #[test]
    fn test_extremes_approach_unit() {
        let computer = IndexComputer::default();
        assert!(computer.ndvi(1e-4, 1.0) > 0.999);
        assert!(computer.ndvi(1.0, 1e-4) < -0.999);
    }

    #[test]
    fn test_zero_denominator_is_invalid() {
        let computer = IndexComputer::default();
        assert!(computer.ndvi(0.0, 0.0).is_nan());
        assert!(computer.ndvi(0.25, -0.25).is_nan());
        assert!(computer.ndvi(f32::NAN, 0.5).is_nan());
    }

    #[test]
    fn test_compute_map() {
        let red = frame(Channel::Red, vec![0.1, 0.2, 0.0]);
        let nir = frame(Channel::Nir, vec![0.5, 0.2, 0.0]);
        let map = IndexComputer::default().compute(&red, &nir).unwrap();

        assert!((map.plane.data[0] - 0.4 / 0.6).abs() < 1e-6);
        assert_eq!(map.plane.data[1], 0.0);
        assert!(!map.is_valid(2));
    }

    #[test]
    fn test_compute_rejects_swapped_channels() {
        let red = frame(Channel::Red, vec![0.1]);
        let nir = frame(Channel::Nir, vec![0.5]);
        let result = IndexComputer::default().compute(&nir, &red);
        assert!(matches!(result, Err(CalibrationError::ConfigError(_))));
    }

    #[test]
    fn test_compute_rejects_geometry_mismatch() {
        let red = frame(Channel::Red, vec![0.1, 0.1]);
        let nir = frame(Channel::Nir, vec![0.5]);
        let result = IndexComputer::default().compute(&red, &nir);
        assert!(matches!(result, Err(CalibrationError::GeometryMismatch { .. })));
    }
}
