//! Mask module
//!
//! Accepts a candidate mask from an external oracle and restricts the index
//! map to plant pixels.

pub mod components;
mod oracle;
mod refine;
pub mod types;

pub use components::{label_regions, remove_small_regions};
pub use oracle::{FileMaskOracle, MaskOracle};
pub use refine::{MaskRefiner, RefineParams, RefinedMask};
pub use types::{Mask, ValidityStats};
