//! Pipeline orchestration module
//!
//! Runs the calibration stages in order over one RGB/NIR frame pair.

mod ndvi_pipeline;
mod timing;

#[cfg(test)]
mod tests;

pub use ndvi_pipeline::{
    BIAS_DIR, DARK_DIR, FLAT_DIR, NdviPipeline, PipelineInput, PipelineOutput, SensorFrames,
};
pub use timing::{PipelineTimings, StepTiming, Timer};
