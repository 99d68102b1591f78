//! Frame reader implementation using the rawloader library.
//!
//! Lets calibration and scene frames be supplied as camera RAW containers
//! (DNG, ARW, ...) instead of headerless dumps. Only single-plane mosaiced
//! data is accepted; the decoded size must match the declared geometry.

use std::io::Cursor;

use rawloader::RawImageData as RawloaderImageData;
use tracing::debug;

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::raw::reader::FrameReader;
use crate::image_pipeline::raw::types::FrameGeometry;

/// Frame reader that uses the rawloader library for decoding.
pub struct RawLoaderReader;

impl FrameReader for RawLoaderReader {
    fn read_samples(&self, data: &[u8], geometry: &FrameGeometry) -> Result<Vec<u16>> {
        geometry.validate()?;
        debug!("Decoding RAW container, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| CalibrationError::DecodeError(e.to_string()))?;

        if decoded.cpp != 1 {
            return Err(CalibrationError::UnsupportedFormat(format!(
                "{} components per pixel, expected a single mosaiced plane",
                decoded.cpp
            )));
        }

        if decoded.width != geometry.width || decoded.height != geometry.height {
            return Err(CalibrationError::GeometryMismatch {
                context: "RAW container",
                expected_width: geometry.width,
                expected_height: geometry.height,
                found_width: decoded.width,
                found_height: decoded.height,
            });
        }

        debug!("Decoded image: {}x{}", decoded.width, decoded.height);

        // Float data is normalized 0.0-1.0, so scale it to the declared full scale
        let full_scale = geometry.full_scale() as f32;
        let samples: Vec<u16> = match decoded.data {
            RawloaderImageData::Integer(values) => values,
            RawloaderImageData::Float(values) => values
                .iter()
                .map(|&v| (v.clamp(0.0, 1.0) * full_scale).round() as u16)
                .collect(),
        };

        Ok(samples)
    }
}
