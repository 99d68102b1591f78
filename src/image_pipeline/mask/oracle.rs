use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::debayer::types::ColorImage;
use crate::image_pipeline::mask::types::Mask;

/// Source of the raw candidate mask.
///
/// Implementations may trace the mask interactively, run a classifier, or
/// load a stored result. The pipeline validates only the returned shape.
pub trait MaskOracle {
    fn produce_mask(&self, reference: &ColorImage) -> Result<Mask>;
}

impl<F> MaskOracle for F
where
    F: Fn(&ColorImage) -> Result<Mask>,
{
    fn produce_mask(&self, reference: &ColorImage) -> Result<Mask> {
        self(reference)
    }
}

/// Loads a mask stored as one byte per pixel, sized like the reference image.
pub struct FileMaskOracle {
    path: PathBuf,
}

impl FileMaskOracle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MaskOracle for FileMaskOracle {
    fn produce_mask(&self, reference: &ColorImage) -> Result<Mask> {
        let bytes = fs::read(&self.path).map_err(|e| {
            CalibrationError::InputReadError(format!("mask {}: {}", self.path.display(), e))
        })?;
        let mask = Mask::from_bytes(reference.width(), reference.height(), &bytes)?;
        info!("Loaded mask {} ({} pixels set)", self.path.display(), mask.count());
        Ok(mask)
    }
}
