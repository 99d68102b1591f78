use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::plane::Plane;
use crate::image_pipeline::mask::types::Mask;
use crate::image_pipeline::tiff::types::ExportConfig;

pub trait ProductWriter {
    /// Writes a floating point plane; invalid pixels stay NaN.
    fn write_plane(&self, plane: &Plane, output: &mut dyn Write, config: &ExportConfig) -> Result<()>;
    /// Writes a mask as 8-bit grey, 255 for set pixels.
    fn write_mask(&self, mask: &Mask, output: &mut dyn Write, config: &ExportConfig) -> Result<()>;
}
