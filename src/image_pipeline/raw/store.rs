use std::path::Path;

use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::raw::binary_reader::BinaryFrameReader;
use crate::image_pipeline::raw::reader::FrameReader;
use crate::image_pipeline::raw::types::{FrameGeometry, FrameRole, RawFrame, Sensor};

/// Reads fixed-geometry frames from storage and tags them with sensor and role.
pub struct FrameStore<R: FrameReader> {
    reader: R,
}

impl FrameStore<BinaryFrameReader> {
    pub fn new() -> Self {
        Self {
            reader: BinaryFrameReader,
        }
    }
}

impl Default for FrameStore<BinaryFrameReader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: FrameReader> FrameStore<R> {
    pub fn with_reader(reader: R) -> Self {
        Self { reader }
    }

    pub fn decode(
        &self,
        data: &[u8],
        geometry: FrameGeometry,
        sensor: Sensor,
        role: FrameRole,
    ) -> Result<RawFrame> {
        let samples = self.reader.read_samples(data, &geometry)?;
        RawFrame::new(geometry, sensor, role, samples)
    }

    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn read<P: AsRef<Path>>(
        &self,
        path: P,
        geometry: FrameGeometry,
        sensor: Sensor,
        role: FrameRole,
    ) -> Result<RawFrame> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            CalibrationError::InputReadError(format!("{}: {}", path.display(), e))
        })?;
        debug!("Read {} bytes", data.len());
        self.decode(&data, geometry, sensor, role)
    }
}
