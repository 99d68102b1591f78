use thiserror::Error;

use crate::image_pipeline::common::roi::Roi;
use crate::image_pipeline::raw::types::{FrameRole, Sensor};

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to decode frame: {0}")]
    DecodeError(String),

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Unsupported bit depth: {0} (expected 1..=16)")]
    UnsupportedBitDepth(u32),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No {role} frames supplied for the {sensor} sensor")]
    EmptyFrameSet { sensor: Sensor, role: FrameRole },

    #[error("Expected a {expected_sensor} {expected_role} frame, got {found_sensor} {found_role}")]
    FrameTagMismatch {
        expected_sensor: Sensor,
        expected_role: FrameRole,
        found_sensor: Sensor,
        found_role: FrameRole,
    },

    #[error("{context}: expected {expected_width}x{expected_height}, got {found_width}x{found_height}")]
    GeometryMismatch {
        context: &'static str,
        expected_width: usize,
        expected_height: usize,
        found_width: usize,
        found_height: usize,
    },

    #[error("ROI {roi} does not fit inside a {width}x{height} frame")]
    RoiOutOfBounds { roi: Roi, width: usize, height: usize },

    #[error("Chip list has {rois} regions but {references} reference values")]
    ChipCountMismatch { rois: usize, references: usize },

    #[error("At least two reference chips are required for a fit, got {0}")]
    InsufficientChips(usize),

    #[error("Degenerate calibration fit: {0}")]
    DegenerateFit(String),

    #[error("Degenerate reference mean for {what}: {value}")]
    DegenerateReference { what: &'static str, value: f64 },

    #[error("Mask is {found_width}x{found_height}, index map is {expected_width}x{expected_height}")]
    MaskShapeMismatch {
        expected_width: usize,
        expected_height: usize,
        found_width: usize,
        found_height: usize,
    },

    #[error("Mask contains non-binary value {0}")]
    NonBinaryMask(u8),

    #[error("No valid pixels survive mask refinement")]
    NoValidPixels,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CalibrationError>;
