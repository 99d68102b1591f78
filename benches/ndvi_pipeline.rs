use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ms_ndvi_rs::image_pipeline::{
    ChartConfig, Chip, ChipSet, ColorImage, CpuDebayer, FrameGeometry, FrameRole, IndexComputer, Mask,
    NdviPipeline, PipelineConfig, PipelineInput, Plane, RawFrame, RefineParams, Result, Roi, Sensor,
    SensorFrames,
};

fn generate_frame(geometry: FrameGeometry, sensor: Sensor, role: FrameRole, base: u16) -> RawFrame {
    let data = (0..geometry.pixel_count())
        .map(|i| {
            let (x, y) = (i % geometry.width, i / geometry.width);
            base + ((x * 7 + y * 3) % 32) as u16
        })
        .collect();
    RawFrame::new(geometry, sensor, role, data).unwrap()
}

/// Horizontal ramp so the chart chips measure distinct values.
fn generate_scene(geometry: FrameGeometry, sensor: Sensor, base: u16) -> RawFrame {
    let data = (0..geometry.pixel_count())
        .map(|i| base + ((i % geometry.width) * 100 / geometry.width) as u16)
        .collect();
    RawFrame::new(geometry, sensor, FrameRole::Scene, data).unwrap()
}

fn generate_sensor(geometry: FrameGeometry, sensor: Sensor) -> SensorFrames {
    SensorFrames {
        bias: (0..4).map(|_| generate_frame(geometry, sensor, FrameRole::Bias, 2)).collect(),
        dark: (0..4).map(|_| generate_frame(geometry, sensor, FrameRole::Dark, 4)).collect(),
        flat: (0..4).map(|_| generate_frame(geometry, sensor, FrameRole::Flat, 200)).collect(),
    }
}

fn generate_input(geometry: FrameGeometry) -> PipelineInput {
    PipelineInput {
        rgb: generate_sensor(geometry, Sensor::Rgb),
        nir: generate_sensor(geometry, Sensor::Nir),
        rgb_scene: generate_scene(geometry, Sensor::Rgb, 40),
        nir_scene: generate_scene(geometry, Sensor::Nir, 90),
    }
}

fn chart() -> ChartConfig {
    ChartConfig::new(
        Roi::new(8, 8, 16, 16),
        ChipSet::new(vec![
            Chip::new(Roi::new(32, 8, 8, 8), 5.0),
            Chip::new(Roi::new(48, 8, 8, 8), 50.0),
            Chip::new(Roi::new(64, 8, 8, 8), 95.0),
        ])
        .unwrap(),
    )
}

fn full_mask(image: &ColorImage) -> Result<Mask> {
    Ok(Mask::filled(image.width(), image.height(), true))
}

fn benchmark_pipeline_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_by_size");
    group.sample_size(10);

    for (width, height, label) in [(256, 256, "256x256"), (512, 512, "512x512"), (1024, 768, "1024x768")] {
        let geometry = FrameGeometry::new(width, height, 8);
        let input = generate_input(geometry);
        let config = PipelineConfig::builder(chart(), chart())
            .geometry(geometry)
            .refine(RefineParams {
                min_region_size: 16,
                lower: -1.0,
                upper: 1.0,
            })
            .build()
            .unwrap();
        let pipeline = NdviPipeline::new(config, full_mask);

        group.bench_with_input(BenchmarkId::from_parameter(label), &input, |b, input| {
            b.iter(|| {
                let _ = pipeline.run(black_box(input));
            });
        });
    }

    group.finish();
}

fn benchmark_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");
    let (width, height) = (1024, 768);
    let mosaic = Plane::filled(width, height, 0.4);

    group.bench_function("debayer", |b| {
        let debayer = CpuDebayer::new();
        b.iter(|| debayer.process(black_box(&mosaic)))
    });

    group.bench_function("ndvi", |b| {
        let computer = IndexComputer::default();
        b.iter(|| {
            mosaic
                .data
                .iter()
                .map(|&v| computer.ndvi(black_box(v), 0.6))
                .sum::<f32>()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_pipeline_sizes, benchmark_stages);
criterion_main!(benches);
