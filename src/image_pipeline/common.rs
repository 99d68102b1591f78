//! Common utilities module
//!
//! This module contains shared utilities used across the image pipeline.

pub mod error;
pub mod plane;
pub mod roi;

pub use error::{CalibrationError, Result};
pub use plane::{INVALID_PIXEL, Plane};
pub use roi::Roi;
