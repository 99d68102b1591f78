use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use ms_ndvi_rs::image_pipeline::{
    CalibrationCurve, CalibrationFolder, ExportConfig, FileMaskOracle, FrameReader, FrameRole, FrameStore,
    NdviPipeline, PipelineConfig, PipelineInput, PipelineOutput, Plane, ProductWriter, RawLoaderReader,
    SensorFrames, Sensor, StandardTiffWriter, ValidityStats,
};
use ms_ndvi_rs::logger;

#[derive(Parser)]
#[command(name = "ms-ndvi")]
#[command(version, about = "Radiometric calibration and NDVI for paired RGB/NIR frames", long_about = None)]
struct Cli {
    /// Pipeline configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Folder holding BIAS/, DARK/ and FLAT/ calibration sets
    #[arg(long, value_name = "DIR")]
    calibration: PathBuf,

    /// RGB scene frame
    #[arg(long, value_name = "FILE")]
    rgb: PathBuf,

    /// NIR scene frame
    #[arg(long, value_name = "FILE")]
    nir: PathBuf,

    /// Candidate plant mask, one byte per pixel
    #[arg(short, long, value_name = "FILE")]
    mask: PathBuf,

    /// Write TIFF products and a JSON summary here
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Frames are camera RAW containers instead of headerless dumps
    #[arg(long)]
    raw: bool,

    /// Log per-stage timings
    #[arg(long)]
    timings: bool,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    stats: &'a ValidityStats,
    white_balance_gains: [f32; 3],
    nir_scale: f64,
    rgb_curves: &'a [CalibrationCurve; 3],
    nir_curve: &'a CalibrationCurve,
}

fn load_input<R: FrameReader>(store: &FrameStore<R>, cli: &Cli, config: &PipelineConfig) -> Result<PipelineInput> {
    let folder = CalibrationFolder::new(store, config.geometry);
    let rgb = SensorFrames::load(&folder, &cli.calibration, Sensor::Rgb).context("loading RGB calibration frames")?;
    let nir = SensorFrames::load(&folder, &cli.calibration, Sensor::Nir).context("loading NIR calibration frames")?;

    let rgb_scene = store
        .read(&cli.rgb, config.geometry, Sensor::Rgb, FrameRole::Scene)
        .with_context(|| format!("reading RGB scene {}", cli.rgb.display()))?;
    let nir_scene = store
        .read(&cli.nir, config.geometry, Sensor::Nir, FrameRole::Scene)
        .with_context(|| format!("reading NIR scene {}", cli.nir.display()))?;

    Ok(PipelineInput {
        rgb,
        nir,
        rgb_scene,
        nir_scene,
    })
}

fn write_plane(dir: &Path, name: &str, plane: &Plane, export: &ExportConfig) -> Result<()> {
    let path = dir.join(name);
    let mut file = BufWriter::new(File::create(&path).with_context(|| format!("creating {}", path.display()))?);
    StandardTiffWriter.write_plane(plane, &mut file, export)?;
    file.flush()?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn export_products(dir: &Path, output: &PipelineOutput, export: &ExportConfig) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    write_plane(dir, "ndvi.tiff", &output.index.plane, export)?;
    write_plane(dir, "reflectance_red.tiff", &output.rgb_reflectance[0].plane, export)?;
    write_plane(dir, "reflectance_nir.tiff", &output.nir_reflectance.plane, export)?;

    let mask_path = dir.join("mask.tiff");
    let mut file = BufWriter::new(File::create(&mask_path).with_context(|| format!("creating {}", mask_path.display()))?);
    StandardTiffWriter.write_mask(&output.mask, &mut file, export)?;
    file.flush()?;
    info!("Wrote {}", mask_path.display());

    let summary = RunSummary {
        stats: &output.stats,
        white_balance_gains: output.white_balance.gains,
        nir_scale: output.nir_normalized.scale,
        rgb_curves: &output.rgb_curves,
        nir_curve: &output.nir_curve,
    };
    let summary_path = dir.join("summary.json");
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    info!("Wrote {}", summary_path.display());
    Ok(())
}

fn main() -> Result<()> {
    logger::init();
    let cli = Cli::parse();

    let config = PipelineConfig::from_json_file(&cli.config)
        .with_context(|| format!("loading configuration {}", cli.config.display()))?;
    info!(
        "Frame geometry {}x{} at {} bits",
        config.geometry.width, config.geometry.height, config.geometry.bits_per_sample
    );

    let input = if cli.raw {
        load_input(&FrameStore::with_reader(RawLoaderReader), &cli, &config)?
    } else {
        load_input(&FrameStore::new(), &cli, &config)?
    };

    let pipeline = NdviPipeline::new(config, FileMaskOracle::new(&cli.mask));
    let (output, timings) = pipeline.run_with_timings(&input)?;
    if cli.timings {
        timings.log_summary();
    }

    for curve in output.rgb_curves.iter().chain(std::iter::once(&output.nir_curve)) {
        info!("{} curve: {:.5} * value + {:.5}", curve.channel, curve.slope, curve.intercept);
    }
    info!(
        "NDVI mean {:.4}, std {:.4} ({} pixels)",
        output.stats.mean, output.stats.std_dev, output.stats.pixel_count
    );

    if let Some(dir) = &cli.out {
        export_products(dir, &output, &pipeline.config().export)?;
    }

    Ok(())
}
