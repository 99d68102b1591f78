//! Reflectance calibration module
//!
//! Converts calibrated sensor response into physical reflectance using a
//! reference chart, and places the NIR sensor on the RGB sensor's scale.

pub mod chips;
mod normalizer;
mod oecf;
pub mod types;

pub use chips::{Chip, ChipSet, MIN_CHIPS};
pub use normalizer::{ChannelNormalizer, NormalizedNir};
pub use oecf::{ReflectanceCalibrator, fit_line};
pub use types::{CalibrationCurve, Channel, ReflectanceFrame};
