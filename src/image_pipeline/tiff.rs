//! TIFF export module
//!
//! Persists index and reflectance planes as 32-bit float TIFF and masks as
//! 8-bit TIFF.

mod standard_tiff_writer;
pub mod types;
mod writer;

pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{ExportConfig, ExportConfigBuilder, TiffCompression};
pub use writer::ProductWriter;
