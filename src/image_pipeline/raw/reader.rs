use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::types::FrameGeometry;

pub trait FrameReader {
    /// Decodes one single-channel frame of the declared geometry into row-major samples.
    fn read_samples(&self, data: &[u8], geometry: &FrameGeometry) -> Result<Vec<u16>>;
}
