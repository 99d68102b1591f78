//! Pipeline configuration
//!
//! Everything the calibration run needs besides the frames themselves:
//! geometry, chart layout per sensor, refinement parameters and numerical
//! thresholds. Loaded from JSON and validated before any stage runs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::image_pipeline::calibration::DEFAULT_FLAT_EPSILON;
use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::roi::Roi;
use crate::image_pipeline::index::DEFAULT_INDEX_EPSILON;
use crate::image_pipeline::mask::RefineParams;
use crate::image_pipeline::raw::types::FrameGeometry;
use crate::image_pipeline::reflectance::chips::ChipSet;
use crate::image_pipeline::tiff::types::ExportConfig;

/// Reference means at or below this are treated as black.
pub const DEFAULT_REFERENCE_EPSILON: f64 = 1e-6;

/// One sensor's view of the reference chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Neutral patch used for white balance (RGB) or cross-sensor scaling (NIR)
    pub white_reference: Roi,
    pub chips: ChipSet,
}

impl ChartConfig {
    pub fn new(white_reference: Roi, chips: ChipSet) -> Self {
        Self {
            white_reference,
            chips,
        }
    }

    fn validate(&self, geometry: &FrameGeometry) -> Result<()> {
        self.white_reference.check_within(geometry.width, geometry.height)?;
        self.chips.validate(geometry.width, geometry.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub geometry: FrameGeometry,
    pub rgb_chart: ChartConfig,
    pub nir_chart: ChartConfig,
    #[serde(default)]
    pub refine: RefineParams,
    #[serde(default = "default_flat_epsilon")]
    pub flat_epsilon: f32,
    #[serde(default = "default_index_epsilon")]
    pub index_epsilon: f32,
    #[serde(default = "default_reference_epsilon")]
    pub reference_epsilon: f64,
    #[serde(default)]
    pub export: ExportConfig,
}

fn default_flat_epsilon() -> f32 {
    DEFAULT_FLAT_EPSILON
}

fn default_index_epsilon() -> f32 {
    DEFAULT_INDEX_EPSILON
}

fn default_reference_epsilon() -> f64 {
    DEFAULT_REFERENCE_EPSILON
}

impl PipelineConfig {
    pub fn builder(rgb_chart: ChartConfig, nir_chart: ChartConfig) -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            rgb_chart,
            nir_chart,
            geometry: None,
            refine: None,
            flat_epsilon: None,
            index_epsilon: None,
            reference_epsilon: None,
            export: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig =
            serde_json::from_str(json).map_err(|e| CalibrationError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| CalibrationError::InputReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Checks geometry, both charts, the validity band and the epsilons.
    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        self.rgb_chart.validate(&self.geometry)?;
        self.nir_chart.validate(&self.geometry)?;
        self.refine.validate()?;

        let epsilons = [
            ("flat_epsilon", self.flat_epsilon as f64),
            ("index_epsilon", self.index_epsilon as f64),
            ("reference_epsilon", self.reference_epsilon),
        ];
        for (name, value) in epsilons {
            if !(value > 0.0 && value.is_finite()) {
                return Err(CalibrationError::ConfigError(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Builder for PipelineConfig
pub struct PipelineConfigBuilder {
    rgb_chart: ChartConfig,
    nir_chart: ChartConfig,
    geometry: Option<FrameGeometry>,
    refine: Option<RefineParams>,
    flat_epsilon: Option<f32>,
    index_epsilon: Option<f32>,
    reference_epsilon: Option<f64>,
    export: Option<ExportConfig>,
}

impl PipelineConfigBuilder {
    pub fn geometry(mut self, geometry: FrameGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn refine(mut self, refine: RefineParams) -> Self {
        self.refine = Some(refine);
        self
    }

    pub fn flat_epsilon(mut self, epsilon: f32) -> Self {
        self.flat_epsilon = Some(epsilon);
        self
    }

    pub fn index_epsilon(mut self, epsilon: f32) -> Self {
        self.index_epsilon = Some(epsilon);
        self
    }

    pub fn reference_epsilon(mut self, epsilon: f64) -> Self {
        self.reference_epsilon = Some(epsilon);
        self
    }

    pub fn export(mut self, export: ExportConfig) -> Self {
        self.export = Some(export);
        self
    }

    /// Assembles and validates the configuration.
    pub fn build(self) -> Result<PipelineConfig> {
        let config = PipelineConfig {
            geometry: self.geometry.unwrap_or_default(),
            rgb_chart: self.rgb_chart,
            nir_chart: self.nir_chart,
            refine: self.refine.unwrap_or_default(),
            flat_epsilon: self.flat_epsilon.unwrap_or(DEFAULT_FLAT_EPSILON),
            index_epsilon: self.index_epsilon.unwrap_or(DEFAULT_INDEX_EPSILON),
            reference_epsilon: self.reference_epsilon.unwrap_or(DEFAULT_REFERENCE_EPSILON),
            export: self.export.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
