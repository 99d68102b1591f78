//! Reader for headerless binary frames as written by the acquisition tool.
//!
//! The camera streams Mono8 (NIR) and BayerRG8 (RGB) buffers which are dumped
//! straight to `.bin` files without any header, so geometry and bit depth must
//! be supplied by the caller.

use tracing::debug;

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::raw::reader::FrameReader;
use crate::image_pipeline::raw::types::FrameGeometry;

/// Headerless row-major frame reader.
///
/// Depths up to 8 bits use one byte per sample; deeper frames use two
/// little-endian bytes per sample.
pub struct BinaryFrameReader;

impl BinaryFrameReader {
    pub fn bytes_per_sample(geometry: &FrameGeometry) -> usize {
        if geometry.bits_per_sample <= 8 { 1 } else { 2 }
    }
}

impl FrameReader for BinaryFrameReader {
    fn read_samples(&self, data: &[u8], geometry: &FrameGeometry) -> Result<Vec<u16>> {
        geometry.validate()?;

        let bytes_per_sample = Self::bytes_per_sample(geometry);
        let expected = geometry.pixel_count() * bytes_per_sample;
        debug!(
            "Decoding binary frame {}x{} @ {} bits, {} bytes",
            geometry.width,
            geometry.height,
            geometry.bits_per_sample,
            data.len()
        );

        if data.len() != expected {
            return Err(CalibrationError::DecodeError(format!(
                "expected {} bytes for {}x{} at {} bits, got {}",
                expected,
                geometry.width,
                geometry.height,
                geometry.bits_per_sample,
                data.len()
            )));
        }

        let samples = if bytes_per_sample == 1 {
            data.iter().map(|&b| b as u16).collect()
        } else {
            data.chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect()
        };

        Ok(samples)
    }
}
