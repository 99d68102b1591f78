//! Reflectance calibration types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::plane::Plane;

/// Spectral channel a plane belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Nir,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Red => write!(f, "red"),
            Channel::Green => write!(f, "green"),
            Channel::Blue => write!(f, "blue"),
            Channel::Nir => write!(f, "nir"),
        }
    }
}

/// Linear map from sensor response to reflectance: `slope * value + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCurve {
    pub channel: Channel,
    pub slope: f64,
    pub intercept: f64,
}

impl CalibrationCurve {
    pub fn apply(&self, value: f32) -> f32 {
        (self.slope * value as f64 + self.intercept) as f32
    }
}

/// Per-pixel reflectance of one channel.
///
/// Values outside [0, 1] are kept as computed; `out_of_band` counts them.
#[derive(Debug, Clone)]
pub struct ReflectanceFrame {
    pub channel: Channel,
    pub plane: Plane,
}

impl ReflectanceFrame {
    /// Number of valid pixels outside the nominal [0, 1] reflectance band.
    pub fn out_of_band(&self) -> usize {
        self.plane
            .data
            .iter()
            .filter(|v| v.is_finite() && !(0.0..=1.0).contains(*v))
            .count()
    }
}
