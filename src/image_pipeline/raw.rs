//! RAW frame reading module
//!
//! This module provides format-agnostic reading of fixed-geometry sensor frames.

mod binary_reader;
mod folder;
mod rawloader_reader;
mod reader;
mod store;
pub mod types;

pub use binary_reader::BinaryFrameReader;
pub use folder::CalibrationFolder;
pub use rawloader_reader::RawLoaderReader;
pub use reader::FrameReader;
pub use store::FrameStore;
pub use types::{FrameGeometry, FrameRole, RawFrame, Sensor};
