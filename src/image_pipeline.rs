//! Image processing pipeline module
//!
//! Radiometric calibration of paired RGB and NIR frames, reflectance
//! calibration against a reference chart, vegetation index computation and
//! mask-restricted statistics.

pub mod calibration;
pub mod common;
pub mod config;
pub mod conversions;
pub mod debayer;
pub mod index;
pub mod mask;
pub mod raw;
pub mod reflectance;
pub mod tiff;

pub use common::{CalibrationError, INVALID_PIXEL, Plane, Result, Roi};

pub use raw::{
    BinaryFrameReader, CalibrationFolder, FrameGeometry, FrameReader, FrameRole, FrameStore, RawFrame,
    RawLoaderReader, Sensor,
};

pub use calibration::{CalibratedFrame, MasterFrame, MasterFrameBuilder, MasterSet, RadiometricCalibrator};

pub use debayer::{ColorImage, ColorReconstructor, CpuDebayer, WhiteBalance};

pub use reflectance::{
    CalibrationCurve, Channel, ChannelNormalizer, Chip, ChipSet, NormalizedNir, ReflectanceCalibrator,
    ReflectanceFrame,
};

pub use index::{IndexComputer, IndexMap};

pub use mask::{FileMaskOracle, Mask, MaskOracle, MaskRefiner, RefineParams, RefinedMask, ValidityStats};

pub use self::tiff::{ExportConfig, ExportConfigBuilder, ProductWriter, StandardTiffWriter, TiffCompression};

pub use config::{ChartConfig, PipelineConfig, PipelineConfigBuilder};

pub use conversions::{NdviPipeline, PipelineInput, PipelineOutput, PipelineTimings, SensorFrames};
