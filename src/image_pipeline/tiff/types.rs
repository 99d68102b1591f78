//! TIFF export configuration types

use serde::{Deserialize, Serialize};

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiffCompression {
    /// No compression
    #[default]
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - best compression (slower)
    DeflateBest,
    /// Deflate compression - balanced
    DeflateBalanced,
}

impl TiffCompression {
    pub(crate) fn to_encoder(self) -> tiff::encoder::Compression {
        use tiff::encoder::Compression;
        use tiff::encoder::compression::DeflateLevel;

        match self {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        }
    }
}

/// Configuration for writing output products
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub compression: TiffCompression,
    /// Horizontal differencing for the 8-bit mask (ignored for float planes)
    pub mask_predictor: bool,
}

impl ExportConfig {
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct ExportConfigBuilder {
    compression: Option<TiffCompression>,
    mask_predictor: Option<bool>,
}

impl ExportConfigBuilder {
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn mask_predictor(mut self, enable: bool) -> Self {
        self.mask_predictor = Some(enable);
        self
    }

    pub fn build(self) -> ExportConfig {
        let default = ExportConfig::default();
        ExportConfig {
            compression: self.compression.unwrap_or(default.compression),
            mask_predictor: self.mask_predictor.unwrap_or(default.mask_predictor),
        }
    }
}
