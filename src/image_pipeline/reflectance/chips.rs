//! Reference chart chips.
//!
//! Each chip binds its region to its known reflectance in one record, so the
//! measured-value list and the reference-value list can never drift apart.

use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::roi::Roi;

/// Minimum number of chips for a determined linear fit.
pub const MIN_CHIPS: usize = 2;

/// Region of known, uniform reflectance on the reference chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chip {
    pub roi: Roi,
    /// Known reflectance in percent (0-100)
    pub reflectance_percent: f64,
}

impl Chip {
    pub fn new(roi: Roi, reflectance_percent: f64) -> Self {
        Self {
            roi,
            reflectance_percent,
        }
    }

    /// Reflectance as a fraction, the unit reflectance frames are expressed in.
    pub fn reflectance(&self) -> f64 {
        self.reflectance_percent / 100.0
    }
}

/// Ordered chips of one sensor's view of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChipSet {
    chips: Vec<Chip>,
}

impl ChipSet {
    pub fn new(chips: Vec<Chip>) -> Result<Self> {
        if chips.len() < MIN_CHIPS {
            return Err(CalibrationError::InsufficientChips(chips.len()));
        }
        Ok(Self { chips })
    }

    /// Pairs two separately ordered lists by position.
    ///
    /// Callers holding ROIs and reference values as separate lists must have
    /// them aligned already; only the lengths can be checked here.
    pub fn from_parallel(rois: &[Roi], reflectance_percent: &[f64]) -> Result<Self> {
        if rois.len() != reflectance_percent.len() {
            return Err(CalibrationError::ChipCountMismatch {
                rois: rois.len(),
                references: reflectance_percent.len(),
            });
        }
        Self::new(
            rois.iter()
                .zip(reflectance_percent)
                .map(|(&roi, &r)| Chip::new(roi, r))
                .collect(),
        )
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Checks chip count and that every region fits the frame.
    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        if self.chips.len() < MIN_CHIPS {
            return Err(CalibrationError::InsufficientChips(self.chips.len()));
        }
        for chip in &self.chips {
            chip.roi.check_within(width, height)?;
        }
        Ok(())
    }
}
