//! Radiometric calibration module
//!
//! Builds bias/dark/flat master frames and applies them to scene frames.

mod master;
mod radiometric;
pub mod types;

pub use master::MasterFrameBuilder;
pub use radiometric::{DEFAULT_FLAT_EPSILON, RadiometricCalibrator};
pub use types::{CalibratedFrame, MasterFrame, MasterSet};
