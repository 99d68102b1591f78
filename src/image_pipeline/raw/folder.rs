//! Folder/keyword grouping of calibration frames.
//!
//! The acquisition tool writes `Img_<n>_RGB.bin` and `Img_<n>_NIR.bin` side by
//! side, one folder per frame role. Selecting a folder plus a sensor keyword
//! yields one averaging set. The keyword must uniquely identify the subset;
//! nothing here tries to disambiguate overlapping names.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::raw::reader::FrameReader;
use crate::image_pipeline::raw::store::FrameStore;
use crate::image_pipeline::raw::types::{FrameGeometry, FrameRole, RawFrame, Sensor};

/// Collects the files of one (sensor, role) subset from a folder.
pub struct CalibrationFolder<'a, R: FrameReader> {
    store: &'a FrameStore<R>,
    geometry: FrameGeometry,
}

impl<'a, R: FrameReader> CalibrationFolder<'a, R> {
    pub fn new(store: &'a FrameStore<R>, geometry: FrameGeometry) -> Self {
        Self { store, geometry }
    }

    /// Default file-name keyword for a sensor.
    pub fn keyword(sensor: Sensor) -> &'static str {
        match sensor {
            Sensor::Rgb => "RGB",
            Sensor::Nir => "NIR",
        }
    }

    /// Paths in `dir` whose file name contains `keyword`, sorted by name.
    pub fn matching_paths(dir: &Path, keyword: &str) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            CalibrationError::InputReadError(format!("{}: {}", dir.display(), e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains(keyword));
            if matches {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Reads every frame of `dir` that matches the sensor keyword.
    pub fn load(&self, dir: &Path, sensor: Sensor, role: FrameRole) -> Result<Vec<RawFrame>> {
        let paths = Self::matching_paths(dir, Self::keyword(sensor))?;
        if paths.is_empty() {
            warn!("No {} {} frames in {}", sensor, role, dir.display());
            return Err(CalibrationError::EmptyFrameSet { sensor, role });
        }

        info!("Loading {} {} {} frames from {}", paths.len(), sensor, role, dir.display());
        paths
            .iter()
            .map(|p| self.store.read(p, self.geometry, sensor, role))
            .collect()
    }
}
