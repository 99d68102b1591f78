//! Mask refinement and index statistics.
//!
//! The oracle mask is cleaned, clipped to the index validity band and cleaned
//! again, always in that order. Statistics are then reduced over the
//! surviving pixels.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::index::IndexMap;
use crate::image_pipeline::mask::components::remove_small_regions;
use crate::image_pipeline::mask::types::{Mask, ValidityStats};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineParams {
    /// Connected regions with fewer pixels are removed
    pub min_region_size: usize,
    /// Lower bound of the index validity band
    pub lower: f32,
    /// Upper bound of the index validity band
    pub upper: f32,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self {
            min_region_size: 64,
            lower: 0.0,
            upper: 1.0,
        }
    }
}

impl RefineParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.lower.is_finite() && self.upper.is_finite() && self.lower < self.upper) {
            return Err(CalibrationError::ConfigError(format!(
                "validity band [{}, {}] is empty",
                self.lower, self.upper
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RefinedMask {
    pub mask: Mask,
    pub stats: ValidityStats,
}

pub struct MaskRefiner {
    params: RefineParams,
}

impl MaskRefiner {
    pub fn new(params: RefineParams) -> Self {
        Self { params }
    }

    /// Clears pixels whose index is undefined or outside `[lower, upper]`.
    pub fn clip_to_band(&self, mask: &Mask, index: &IndexMap) -> Mask {
        let RefineParams { lower, upper, .. } = self.params;
        let data = mask
            .data
            .iter()
            .zip(&index.plane.data)
            .map(|(&set, &v)| set && v.is_finite() && v >= lower && v <= upper)
            .collect();
        Mask {
            width: mask.width,
            height: mask.height,
            data,
        }
    }

    /// Runs the fixed refinement sequence without reducing statistics.
    pub fn refine_mask(&self, index: &IndexMap, raw: &Mask) -> Result<Mask> {
        self.params.validate()?;
        raw.ensure_matches(index)?;

        let cleaned = remove_small_regions(raw, self.params.min_region_size);
        debug!("Small-region removal: {} -> {} pixels", raw.count(), cleaned.count());

        let clipped = self.clip_to_band(&cleaned, index);
        debug!("Band clip [{}, {}]: {} pixels", self.params.lower, self.params.upper, clipped.count());

        let refined = remove_small_regions(&clipped, self.params.min_region_size);
        debug!("Second small-region removal: {} pixels", refined.count());

        Ok(refined)
    }

    /// Mean and population standard deviation over mask-true pixels whose
    /// index lies strictly above the lower bound.
    pub fn statistics(&self, index: &IndexMap, mask: &Mask) -> Result<ValidityStats> {
        mask.ensure_matches(index)?;

        let values: Vec<f64> = mask
            .data
            .iter()
            .zip(&index.plane.data)
            .filter(|&(&set, &v)| set && v.is_finite() && v > self.params.lower)
            .map(|(_, &v)| v as f64)
            .collect();

        if values.is_empty() {
            return Err(CalibrationError::NoValidPixels);
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Ok(ValidityStats {
            mean,
            std_dev: variance.sqrt(),
            pixel_count: values.len(),
        })
    }

    #[instrument(skip_all, fields(min_region_size = self.params.min_region_size))]
    pub fn refine(&self, index: &IndexMap, raw: &Mask) -> Result<RefinedMask> {
        let mask = self.refine_mask(index, raw)?;
        let stats = self.statistics(index, &mask)?;
        info!(
            "Index over {} pixels: mean {:.4}, std {:.4}",
            stats.pixel_count, stats.mean, stats.std_dev
        );
        Ok(RefinedMask { mask, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::common::plane::{INVALID_PIXEL, Plane};

    fn index(width: usize, height: usize, data: Vec<f32>) -> IndexMap {
        IndexMap {
            plane: Plane::from_vec(width, height, data).unwrap(),
        }
    }

    fn params(min_region_size: usize, lower: f32, upper: f32) -> RefineParams {
        RefineParams {
            min_region_size,
            lower,
            upper,
        }
    }

    #[test]
    fn test_full_mask_statistics() {
        let map = index(2, 2, vec![0.2, 0.4, 0.6, 0.8]);
        let refiner = MaskRefiner::new(params(1, 0.0, 1.0));
        let refined = refiner.refine(&map, &Mask::filled(2, 2, true)).unwrap();

        assert_eq!(refined.stats.pixel_count, 4);
        assert!((refined.stats.mean - 0.5).abs() < 1e-6);
        // Population std of {0.2, 0.4, 0.6, 0.8}
        assert!((refined.stats.std_dev - 0.05f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_band_clears_out_of_range_and_invalid() {
        let map = index(4, 1, vec![-0.5, 0.3, INVALID_PIXEL, 0.95]);
        let refiner = MaskRefiner::new(params(1, 0.0, 0.9));
        let clipped = refiner.clip_to_band(&Mask::filled(4, 1, true), &map);
        assert_eq!(clipped.data, vec![false, true, false, false]);
    }

    #[test]
    fn test_lower_bound_excluded_from_statistics() {
        let map = index(3, 1, vec![0.1, 0.5, 0.7]);
        let refiner = MaskRefiner::new(params(1, 0.1, 1.0));
        let refined = refiner.refine(&map, &Mask::filled(3, 1, true)).unwrap();

        // 0.1 stays in the mask but not in the statistics
        assert_eq!(refined.mask.count(), 3);
        assert_eq!(refined.stats.pixel_count, 2);
        assert!((refined.stats.mean - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_fragments_created_by_band_are_removed() {
        // A 5-pixel strip; the band cuts out the middle pixel
        let map = index(5, 1, vec![0.5, 0.5, -0.2, 0.5, 0.5]);
        let refiner = MaskRefiner::new(params(3, 0.0, 1.0));
        let result = refiner.refine(&map, &Mask::filled(5, 1, true));
        assert!(matches!(result, Err(CalibrationError::NoValidPixels)));

        let mask = refiner.refine_mask(&map, &Mask::filled(5, 1, true)).unwrap();
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn test_small_candidate_regions_removed_first() {
        let map = index(4, 2, vec![0.5; 8]);
        let raw = Mask::from_bytes(4, 2, &[1, 1, 0, 1, 1, 1, 0, 0]).unwrap();
        let refined = MaskRefiner::new(params(2, 0.0, 1.0)).refine(&map, &raw).unwrap();
        assert_eq!(refined.mask.data, vec![true, true, false, false, true, true, false, false]);
        assert_eq!(refined.stats.pixel_count, 4);
    }

    #[test]
    fn test_empty_mask_reports_no_valid_pixels() {
        let map = index(2, 2, vec![0.5; 4]);
        let result = MaskRefiner::new(params(1, 0.0, 1.0)).refine(&map, &Mask::filled(2, 2, false));
        assert!(matches!(result, Err(CalibrationError::NoValidPixels)));
    }

    #[test]
    fn test_mask_shape_mismatch() {
        let map = index(2, 2, vec![0.5; 4]);
        let result = MaskRefiner::new(RefineParams::default()).refine(&map, &Mask::filled(4, 1, true));
        assert!(matches!(result, Err(CalibrationError::MaskShapeMismatch { .. })));
    }

    #[test]
    fn test_inverted_band_rejected() {
        let map = index(1, 1, vec![0.5]);
        let result = MaskRefiner::new(params(1, 0.8, 0.2)).refine(&map, &Mask::filled(1, 1, true));
        assert!(matches!(result, Err(CalibrationError::ConfigError(_))));
    }

    #[test]
    fn test_shrinking_band_never_grows_mask() {
        let width = 8;
        let height = 8;
        let data: Vec<f32> = (0..width * height)
            .map(|i| ((i * 37) % 23) as f32 / 11.0 - 1.0)
            .collect();
        let map = index(width, height, data);
        let raw = Mask::filled(width, height, true);

        let bands = [(-1.0, 1.0), (-0.5, 0.9), (-0.2, 0.6), (0.0, 0.4), (0.1, 0.2)];
        let mut previous = usize::MAX;
        for (lower, upper) in bands {
            let refiner = MaskRefiner::new(params(2, lower, upper));
            let count = refiner.refine_mask(&map, &raw).unwrap().count();
            assert!(count <= previous, "band [{lower}, {upper}] kept {count} > {previous}");
            previous = count;
        }
    }
}
