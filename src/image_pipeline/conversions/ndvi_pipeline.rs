use std::path::Path;

use tracing::{info, instrument};

use crate::image_pipeline::{
    calibration::{CalibratedFrame, MasterFrameBuilder, MasterSet, RadiometricCalibrator},
    common::error::{CalibrationError, Result},
    config::PipelineConfig,
    conversions::timing::{PipelineTimings, Timer},
    debayer::{ColorImage, ColorReconstructor, WhiteBalance},
    index::{IndexComputer, IndexMap},
    mask::{Mask, MaskOracle, MaskRefiner, ValidityStats},
    raw::{CalibrationFolder, FrameGeometry, FrameReader, FrameRole, RawFrame, Sensor},
    reflectance::{CalibrationCurve, Channel, ChannelNormalizer, NormalizedNir, ReflectanceCalibrator, ReflectanceFrame},
};

/// Folder names of the calibration sets below a calibration root.
pub const BIAS_DIR: &str = "BIAS";
pub const DARK_DIR: &str = "DARK";
pub const FLAT_DIR: &str = "FLAT";

/// Calibration stacks of one sensor.
#[derive(Debug, Clone)]
pub struct SensorFrames {
    pub bias: Vec<RawFrame>,
    pub dark: Vec<RawFrame>,
    pub flat: Vec<RawFrame>,
}

impl SensorFrames {
    /// Loads `BIAS/`, `DARK/` and `FLAT/` below `root`, keeping the files
    /// named for `sensor`.
    pub fn load<R: FrameReader>(folder: &CalibrationFolder<'_, R>, root: &Path, sensor: Sensor) -> Result<Self> {
        Ok(Self {
            bias: folder.load(&root.join(BIAS_DIR), sensor, FrameRole::Bias)?,
            dark: folder.load(&root.join(DARK_DIR), sensor, FrameRole::Dark)?,
            flat: folder.load(&root.join(FLAT_DIR), sensor, FrameRole::Flat)?,
        })
    }

    fn stacks(&self) -> [(FrameRole, &[RawFrame]); 3] {
        [
            (FrameRole::Bias, self.bias.as_slice()),
            (FrameRole::Dark, self.dark.as_slice()),
            (FrameRole::Flat, self.flat.as_slice()),
        ]
    }
}

/// Every frame one pipeline run consumes, fully materialized.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub rgb: SensorFrames,
    pub nir: SensorFrames,
    pub rgb_scene: RawFrame,
    pub nir_scene: RawFrame,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub rgb_masters: MasterSet,
    pub nir_masters: MasterSet,
    pub rgb_calibrated: CalibratedFrame,
    pub nir_calibrated: CalibratedFrame,
    /// White-balanced color image, also the mask oracle's reference
    pub color: ColorImage,
    pub white_balance: WhiteBalance,
    /// Red, green, blue
    pub rgb_reflectance: [ReflectanceFrame; 3],
    pub rgb_curves: [CalibrationCurve; 3],
    pub nir_normalized: NormalizedNir,
    pub nir_reflectance: ReflectanceFrame,
    pub nir_curve: CalibrationCurve,
    pub index: IndexMap,
    pub raw_mask: Mask,
    pub mask: Mask,
    pub stats: ValidityStats,
}

pub struct NdviPipeline<O: MaskOracle> {
    config: PipelineConfig,
    oracle: O,
}

fn timed<T>(timings: &mut PipelineTimings, name: &'static str, stage: impl FnOnce() -> Result<T>) -> Result<T> {
    let _span = tracing::info_span!("stage", stage = name).entered();
    let timer = Timer::start(name);
    let value = stage()?;
    let (name, duration) = timer.stop();
    timings.add_step(name, duration);
    Ok(value)
}

fn check_frame(frame: &RawFrame, geometry: &FrameGeometry, sensor: Sensor, role: FrameRole) -> Result<()> {
    if frame.sensor() != sensor || frame.role() != role {
        return Err(CalibrationError::FrameTagMismatch {
            expected_sensor: sensor,
            expected_role: role,
            found_sensor: frame.sensor(),
            found_role: frame.role(),
        });
    }
    if frame.geometry() != *geometry {
        return Err(CalibrationError::GeometryMismatch {
            context: "configured frame geometry",
            expected_width: geometry.width,
            expected_height: geometry.height,
            found_width: frame.width(),
            found_height: frame.height(),
        });
    }
    Ok(())
}

impl<O: MaskOracle> NdviPipeline<O> {
    pub fn new(config: PipelineConfig, oracle: O) -> Self {
        Self { config, oracle }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Checks configuration and every input frame before any stage runs.
    pub fn validate_input(&self, input: &PipelineInput) -> Result<()> {
        self.config.validate()?;
        let geometry = &self.config.geometry;

        for (sensor, frames) in [(Sensor::Rgb, &input.rgb), (Sensor::Nir, &input.nir)] {
            for (role, stack) in frames.stacks() {
                if stack.is_empty() {
                    return Err(CalibrationError::EmptyFrameSet { sensor, role });
                }
                for frame in stack {
                    check_frame(frame, geometry, sensor, role)?;
                }
            }
        }
        check_frame(&input.rgb_scene, geometry, Sensor::Rgb, FrameRole::Scene)?;
        check_frame(&input.nir_scene, geometry, Sensor::Nir, FrameRole::Scene)?;
        Ok(())
    }

    pub fn run(&self, input: &PipelineInput) -> Result<PipelineOutput> {
        let (output, timings) = self.run_with_timings(input)?;
        info!(
            "Pipeline complete: {}x{} in {:.3}ms",
            output.index.width(),
            output.index.height(),
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok(output)
    }

    #[instrument(skip_all)]
    pub fn run_with_timings(&self, input: &PipelineInput) -> Result<(PipelineOutput, PipelineTimings)> {
        let mut timings = PipelineTimings::new();
        let config = &self.config;
        info!("Starting NDVI calibration pipeline");

        timed(&mut timings, "validate_input", || self.validate_input(input))?;

        let (rgb_masters, nir_masters) = timed(&mut timings, "build_masters", || {
            let rgb = MasterFrameBuilder::build_set(Sensor::Rgb, &input.rgb.bias, &input.rgb.dark, &input.rgb.flat)?;
            let nir = MasterFrameBuilder::build_set(Sensor::Nir, &input.nir.bias, &input.nir.dark, &input.nir.flat)?;
            Ok((rgb, nir))
        })?;

        let calibrator = RadiometricCalibrator::new(config.flat_epsilon);
        let (rgb_calibrated, nir_calibrated) = timed(&mut timings, "radiometric", || {
            Ok((
                calibrator.calibrate(&input.rgb_scene, &rgb_masters)?,
                calibrator.calibrate(&input.nir_scene, &nir_masters)?,
            ))
        })?;

        let (color, white_balance) = timed(&mut timings, "reconstruct_color", || {
            ColorReconstructor::new(config.reference_epsilon)
                .reconstruct(&rgb_calibrated, &config.rgb_chart.white_reference)
        })?;

        let (rgb_reflectance, rgb_curves) = timed(&mut timings, "rgb_reflectance", || {
            ReflectanceCalibrator::calibrate_color(&color, &config.rgb_chart.chips)
        })?;

        let nir_normalized = timed(&mut timings, "normalize_nir", || {
            ChannelNormalizer::new(config.reference_epsilon).normalize(
                &nir_calibrated,
                &config.nir_chart.white_reference,
                white_balance.red_reference(),
            )
        })?;

        let (nir_reflectance, nir_curve) = timed(&mut timings, "nir_reflectance", || {
            ReflectanceCalibrator::calibrate_plane(&nir_normalized.frame.plane, Channel::Nir, &config.nir_chart.chips)
        })?;

        let index = timed(&mut timings, "index", || {
            IndexComputer::new(config.index_epsilon).compute(&rgb_reflectance[0], &nir_reflectance)
        })?;

        let raw_mask = timed(&mut timings, "mask_oracle", || {
            let mask = self.oracle.produce_mask(&color)?;
            mask.ensure_matches(&index)?;
            Ok(mask)
        })?;

        let refined = timed(&mut timings, "refine_mask", || {
            MaskRefiner::new(config.refine).refine(&index, &raw_mask)
        })?;

        info!(
            "NDVI mean {:.4} std {:.4} over {} pixels",
            refined.stats.mean, refined.stats.std_dev, refined.stats.pixel_count
        );

        let output = PipelineOutput {
            rgb_masters,
            nir_masters,
            rgb_calibrated,
            nir_calibrated,
            color,
            white_balance,
            rgb_reflectance,
            rgb_curves,
            nir_normalized,
            nir_reflectance,
            nir_curve,
            index,
            raw_mask,
            mask: refined.mask,
            stats: refined.stats,
        };
        Ok((output, timings))
    }
}
