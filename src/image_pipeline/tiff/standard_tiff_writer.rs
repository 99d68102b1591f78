use std::io::{Cursor, Write};

use tiff::encoder::TiffEncoder;
use tiff::encoder::colortype::{Gray8, Gray32Float};
use tiff::tags::Predictor;
use tracing::debug;

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::plane::Plane;
use crate::image_pipeline::mask::types::Mask;
use crate::image_pipeline::tiff::types::ExportConfig;
use crate::image_pipeline::tiff::writer::ProductWriter;

pub struct StandardTiffWriter;

fn encoder<'a>(buffer: &'a mut Vec<u8>, config: &ExportConfig) -> Result<TiffEncoder<Cursor<&'a mut Vec<u8>>>> {
    Ok(TiffEncoder::new(Cursor::new(buffer))
        .map_err(|e| CalibrationError::EncodeError(e.to_string()))?
        .with_compression(config.compression.to_encoder()))
}

impl ProductWriter for StandardTiffWriter {
    fn write_plane(&self, plane: &Plane, output: &mut dyn Write, config: &ExportConfig) -> Result<()> {
        debug!("Encoding float TIFF: {}x{}", plane.width, plane.height);

        let mut buffer = Vec::new();
        encoder(&mut buffer, config)?
            .write_image::<Gray32Float>(plane.width as u32, plane.height as u32, &plane.data)
            .map_err(|e| CalibrationError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;
        Ok(())
    }

    fn write_mask(&self, mask: &Mask, output: &mut dyn Write, config: &ExportConfig) -> Result<()> {
        debug!("Encoding mask TIFF: {}x{}", mask.width, mask.height);

        let mut buffer = Vec::new();
        let mut encoder = encoder(&mut buffer, config)?;
        if config.mask_predictor {
            encoder = encoder.with_predictor(Predictor::Horizontal);
        }
        encoder
            .write_image::<Gray8>(mask.width as u32, mask.height as u32, &mask.to_bytes())
            .map_err(|e| CalibrationError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;
        Ok(())
    }
}
