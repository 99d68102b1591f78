use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::debug;

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::plane::{INVALID_PIXEL, Plane};
use crate::image_pipeline::debayer::types::ColorImage;

/// Color filter array layout of the RGB sensor (BayerRG: R at the origin).
pub const SENSOR_CFA: CFA = CFA::RGGB;

const QUANT_MAX: f32 = u16::MAX as f32;

/// Bilinear RGGB demosaic of a calibrated mosaic plane.
///
/// The `bayer` crate works on integer rasters, so the [0, 1] plane is
/// quantized to 16 bits for interpolation. Invalid pixels are fed in as 0,
/// so every output pixel whose 3x3 neighbourhood holds an invalid sample is
/// written back as invalid in all three planes.
pub struct CpuDebayer;

/// Marks every pixel whose 3x3 neighbourhood, clipped to the frame, contains a
/// non-finite sample.
fn invalid_neighbourhoods(mosaic: &Plane) -> Vec<bool> {
    let (width, height) = (mosaic.width, mosaic.height);
    let mut invalid = vec![false; width * height];
    for (i, _) in mosaic.data.iter().enumerate().filter(|(_, v)| !v.is_finite()) {
        let (x, y) = (i % width, i / width);
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                invalid[ny * width + nx] = true;
            }
        }
    }
    invalid
}

impl CpuDebayer {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, mosaic: &Plane) -> Result<ColorImage> {
        let width = mosaic.width;
        let height = mosaic.height;
        debug!("Starting CPU debayering for image {}x{}", width, height);

        let bayer_bytes: Vec<u8> = mosaic
            .data
            .iter()
            .flat_map(|&v| {
                let q = if v.is_finite() {
                    (v.clamp(0.0, 1.0) * QUANT_MAX).round() as u16
                } else {
                    0
                };
                q.to_le_bytes()
            })
            .collect();

        let bytes_per_pixel = 2;
        let mut output_buf = vec![0u8; width * height * 3 * bytes_per_pixel];
        let mut cursor = Cursor::new(&bayer_bytes[..]);

        debug!("Running demosaic with CFA=RGGB, algo=Linear");
        {
            let mut output_raster = RasterMut::new(width, height, RasterDepth::Depth16, &mut output_buf);
            bayer::run_demosaic(
                &mut cursor,
                BayerDepth::Depth16LE,
                SENSOR_CFA,
                Demosaic::Linear,
                &mut output_raster,
            )
            .map_err(|e| CalibrationError::DecodeError(format!("Demosaic failed: {:?}", e)))?;
        }

        let mut red = Vec::with_capacity(width * height);
        let mut green = Vec::with_capacity(width * height);
        let mut blue = Vec::with_capacity(width * height);

        let invalid = invalid_neighbourhoods(mosaic);

        // The raster stores samples in native byte order
        for (pixel, &is_invalid) in output_buf.chunks_exact(bytes_per_pixel * 3).zip(&invalid) {
            if is_invalid {
                red.push(INVALID_PIXEL);
                green.push(INVALID_PIXEL);
                blue.push(INVALID_PIXEL);
                continue;
            }
            red.push(u16::from_ne_bytes([pixel[0], pixel[1]]) as f32 / QUANT_MAX);
            green.push(u16::from_ne_bytes([pixel[2], pixel[3]]) as f32 / QUANT_MAX);
            blue.push(u16::from_ne_bytes([pixel[4], pixel[5]]) as f32 / QUANT_MAX);
        }

        Ok(ColorImage {
            red: Plane { width, height, data: red },
            green: Plane { width, height, data: green },
            blue: Plane { width, height, data: blue },
        })
    }
}

impl Default for CpuDebayer {
    fn default() -> Self {
        Self::new()
    }
}
