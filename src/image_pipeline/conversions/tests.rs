use std::cell::Cell;

use crate::image_pipeline::common::error::{CalibrationError, Result};
use crate::image_pipeline::common::roi::Roi;
use crate::image_pipeline::config::{ChartConfig, PipelineConfig};
use crate::image_pipeline::conversions::{NdviPipeline, PipelineInput, SensorFrames};
use crate::image_pipeline::debayer::types::ColorImage;
use crate::image_pipeline::mask::{Mask, RefineParams};
use crate::image_pipeline::raw::types::{FrameGeometry, FrameRole, RawFrame, Sensor};
use crate::image_pipeline::reflectance::chips::{Chip, ChipSet};

const SIZE: usize = 8;
// Left half of each scene reads 51/255 = 0.2, right half 204/255 = 0.8 (RGB)
const RGB_LEFT: u16 = 51;
const RGB_RIGHT: u16 = 204;
// NIR reads 0.4 / 0.6 before normalization
const NIR_LEFT: u16 = 102;
const NIR_RIGHT: u16 = 153;

fn geometry() -> FrameGeometry {
    FrameGeometry::new(SIZE, SIZE, 8)
}

fn constant_frame(sensor: Sensor, role: FrameRole, value: u16) -> RawFrame {
    RawFrame::new(geometry(), sensor, role, vec![value; SIZE * SIZE]).unwrap()
}

fn split_scene(sensor: Sensor, left: u16, right: u16) -> RawFrame {
    let data = (0..SIZE * SIZE)
        .map(|i| if i % SIZE < SIZE / 2 { left } else { right })
        .collect();
    RawFrame::new(geometry(), sensor, FrameRole::Scene, data).unwrap()
}

fn ideal_frames(sensor: Sensor) -> SensorFrames {
    SensorFrames {
        bias: vec![constant_frame(sensor, FrameRole::Bias, 0); 2],
        dark: vec![constant_frame(sensor, FrameRole::Dark, 0); 2],
        flat: vec![constant_frame(sensor, FrameRole::Flat, 255); 2],
    }
}

fn input() -> PipelineInput {
    PipelineInput {
        rgb: ideal_frames(Sensor::Rgb),
        nir: ideal_frames(Sensor::Nir),
        rgb_scene: split_scene(Sensor::Rgb, RGB_LEFT, RGB_RIGHT),
        nir_scene: split_scene(Sensor::Nir, NIR_LEFT, NIR_RIGHT),
    }
}

fn chart(low_percent: f64, high_percent: f64) -> ChartConfig {
    ChartConfig::new(
        Roi::new(1, 1, 2, 2),
        ChipSet::new(vec![
            Chip::new(Roi::new(1, 1, 1, 1), low_percent),
            Chip::new(Roi::new(6, 6, 1, 1), high_percent),
        ])
        .unwrap(),
    )
}

fn config() -> PipelineConfig {
    PipelineConfig::builder(chart(20.0, 80.0), chart(30.0, 90.0))
        .geometry(geometry())
        .refine(RefineParams {
            min_region_size: 4,
            lower: -1.0,
            upper: 1.0,
        })
        .build()
        .unwrap()
}

/// Columns 1-2 and 5-6 of rows 1-6: pixels whose whole 3x3 neighborhood
/// lies inside one uniform half.
fn interior_mask(image: &ColorImage) -> Result<Mask> {
    let (width, height) = (image.width(), image.height());
    let data = (0..width * height)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            (1..height - 1).contains(&y) && matches!(x, 1 | 2 | 5 | 6)
        })
        .collect();
    Ok(Mask { width, height, data })
}

#[test]
fn test_end_to_end_known_scene() {
    let pipeline = NdviPipeline::new(config(), interior_mask);
    let output = pipeline.run(&input()).unwrap();

    // Equal channels inside the white reference leave the gains at unity
    for gain in output.white_balance.gains {
        assert!((gain - 1.0).abs() < 1e-6, "Expected unit gain, got {}", gain);
    }

    // Chips at 20% and 80% measure 0.2 and 0.8: identity curve
    for curve in &output.rgb_curves {
        assert!((curve.slope - 1.0).abs() < 1e-3, "Expected slope 1, got {}", curve.slope);
        assert!(curve.intercept.abs() < 1e-3, "Expected intercept 0, got {}", curve.intercept);
    }

    // NIR white reference 0.4 scaled onto the red reference 0.2
    assert!((output.nir_normalized.scale - 0.5).abs() < 1e-4);

    // Normalized NIR chips read 0.2 and 0.3 against 30% and 90%
    assert!((output.nir_curve.slope - 6.0).abs() < 1e-2);
    assert!((output.nir_curve.intercept + 0.9).abs() < 1e-3);

    let left = 0.1 / 0.5; // (0.3 - 0.2) / (0.3 + 0.2)
    let right = 0.1 / 1.7; // (0.9 - 0.8) / (0.9 + 0.8)
    let at = |x: usize, y: usize| output.index.plane.get(x, y) as f64;
    assert!((at(1, 3) - left).abs() < 1e-3, "Expected {}, got {}", left, at(1, 3));
    assert!((at(6, 3) - right).abs() < 1e-3, "Expected {}, got {}", right, at(6, 3));

    assert_eq!(output.mask.count(), 24);
    assert_eq!(output.stats.pixel_count, 24);
    let mean = (left + right) / 2.0;
    let std_dev = (left - right) / 2.0;
    assert!((output.stats.mean - mean).abs() < 1e-3, "Expected mean {}, got {}", mean, output.stats.mean);
    assert!((output.stats.std_dev - std_dev).abs() < 1e-3);
}

#[test]
fn test_run_with_timings_records_every_stage() {
    let pipeline = NdviPipeline::new(config(), interior_mask);
    let (_, timings) = pipeline.run_with_timings(&input()).unwrap();

    let names: Vec<&str> = timings.steps().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "validate_input",
            "build_masters",
            "radiometric",
            "reconstruct_color",
            "rgb_reflectance",
            "normalize_nir",
            "nir_reflectance",
            "index",
            "mask_oracle",
            "refine_mask",
        ]
    );
}

#[test]
fn test_empty_frame_set_fails_before_any_stage() {
    let calls = Cell::new(0);
    let oracle = |image: &ColorImage| -> Result<Mask> {
        calls.set(calls.get() + 1);
        interior_mask(image)
    };

    let mut frames = input();
    frames.nir.dark.clear();
    let pipeline = NdviPipeline::new(config(), oracle);
    let result = pipeline.run_with_timings(&frames);

    assert!(matches!(
        result,
        Err(CalibrationError::EmptyFrameSet {
            sensor: Sensor::Nir,
            role: FrameRole::Dark
        })
    ));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_frame_with_wrong_geometry_rejected() {
    let mut frames = input();
    frames.rgb_scene = RawFrame::new(
        FrameGeometry::new(4, 4, 8),
        Sensor::Rgb,
        FrameRole::Scene,
        vec![0; 16],
    )
    .unwrap();

    let result = NdviPipeline::new(config(), interior_mask).run(&frames);
    assert!(matches!(result, Err(CalibrationError::GeometryMismatch { .. })));
}

#[test]
fn test_mislabelled_frame_rejected() {
    let mut frames = input();
    frames.rgb.flat[1] = constant_frame(Sensor::Nir, FrameRole::Flat, 255);

    let result = NdviPipeline::new(config(), interior_mask).run(&frames);
    assert!(matches!(result, Err(CalibrationError::FrameTagMismatch { .. })));
}

#[test]
fn test_oracle_mask_of_wrong_shape_rejected() {
    let oracle = |_: &ColorImage| -> Result<Mask> { Ok(Mask::filled(SIZE / 2, SIZE, true)) };
    let result = NdviPipeline::new(config(), oracle).run(&input());
    assert!(matches!(result, Err(CalibrationError::MaskShapeMismatch { .. })));
}

#[test]
fn test_oracle_error_propagates() {
    let oracle = |_: &ColorImage| -> Result<Mask> { Err(CalibrationError::NonBinaryMask(7)) };
    let result = NdviPipeline::new(config(), oracle).run(&input());
    assert!(matches!(result, Err(CalibrationError::NonBinaryMask(7))));
}

#[test]
fn test_empty_mask_reports_no_valid_pixels() {
    let oracle = |image: &ColorImage| -> Result<Mask> { Ok(Mask::filled(image.width(), image.height(), false)) };
    let result = NdviPipeline::new(config(), oracle).run(&input());
    assert!(matches!(result, Err(CalibrationError::NoValidPixels)));
}

#[test]
fn test_dead_flat_pixel_excluded_with_its_neighbourhood() {
    // Both RGB flats read 0 at (1, 4), so the calibrated scene is invalid there
    let (dead_x, dead_y) = (1, 4);
    let mut flat = vec![255; SIZE * SIZE];
    flat[dead_y * SIZE + dead_x] = 0;
    let dead_flat = RawFrame::new(geometry(), Sensor::Rgb, FrameRole::Flat, flat).unwrap();
    let mut frames = input();
    frames.rgb.flat = vec![dead_flat; 2];

    let output = NdviPipeline::new(config(), interior_mask).run(&frames).unwrap();

    assert!(output.rgb_calibrated.plane.get(dead_x, dead_y).is_nan());
    for y in dead_y - 1..=dead_y + 1 {
        for x in dead_x - 1..=dead_x + 1 {
            for plane in output.color.planes() {
                assert!(plane.get(x, y).is_nan(), "({x}, {y}) should be invalid");
            }
            assert!(output.index.plane.get(x, y).is_nan());
            assert!(!output.mask.data[y * SIZE + x]);
        }
    }
    assert!(output.color.red.get(1, 2).is_finite());
    assert!(output.color.red.get(1, 6).is_finite());

    // The left block keeps rows 1-2; the two pixels left on row 6 fall
    // below the minimum region size
    let left = 0.1 / 0.5;
    let right = 0.1 / 1.7;
    assert_eq!(output.stats.pixel_count, 16);
    assert!(!output.mask.data[6 * SIZE + 1]);
    let mean = (4.0 * left + 12.0 * right) / 16.0;
    assert!((output.stats.mean - mean).abs() < 1e-3, "Expected mean {}, got {}", mean, output.stats.mean);
}

#[test]
fn test_end_to_end_full_mask() {
    let oracle = |image: &ColorImage| -> Result<Mask> { Ok(Mask::filled(image.width(), image.height(), true)) };
    let output = NdviPipeline::new(config(), oracle).run(&input()).unwrap();

    // Every index value lies strictly inside (-1, 1), so nothing leaves the band
    assert!(output.index.plane.data.iter().all(|v| v.is_finite() && *v > -1.0 && *v < 1.0));
    assert_eq!(output.mask.count(), SIZE * SIZE);
    assert_eq!(output.stats.pixel_count, SIZE * SIZE);

    let expected_mean =
        output.index.plane.data.iter().map(|&v| v as f64).sum::<f64>() / (SIZE * SIZE) as f64;
    assert!((output.stats.mean - expected_mean).abs() < 1e-6);

    // Border pixels see replicated samples from their own half
    let left = 0.1 / 0.5;
    let right = 0.1 / 1.7;
    let at = |x: usize, y: usize| output.index.plane.get(x, y) as f64;
    for (x, y) in [(0, 0), (0, SIZE - 1), (2, 0), (1, SIZE - 1)] {
        assert!((at(x, y) - left).abs() < 1e-3, "Expected {} at ({x}, {y}), got {}", left, at(x, y));
    }
    for (x, y) in [(SIZE - 1, 0), (SIZE - 1, SIZE - 1), (5, 0), (6, SIZE - 1)] {
        assert!((at(x, y) - right).abs() < 1e-3, "Expected {} at ({x}, {y}), got {}", right, at(x, y));
    }
}
