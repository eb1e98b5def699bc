use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rawroi_rs::image_pipeline::color::matrix::IDENTITY;
use rawroi_rs::image_pipeline::debayer::{CfaPattern, CpuDebayer, SensorLevels};
use rawroi_rs::image_pipeline::stages::{CameraMetadata, PipelineContext, PipelineExecutor};
use rawroi_rs::image_pipeline::DebugConfig;

fn generate_mock_mosaic(width: usize, height: usize) -> Vec<u16> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| ((x * 7 + y * 13) % 1024) as u16))
        .collect()
}

fn camera_metadata() -> CameraMetadata {
    CameraMetadata {
        cfa: CfaPattern::Rggb,
        levels: SensorLevels::new([64; 4], 1023),
        cam_to_xyz: IDENTITY,
        xyz_to_cam: IDENTITY,
        color_matrix_source: "bench".to_string(),
        white_balance_gains: [1.9, 1.0, 1.5],
        skip_white_balance: false,
        gamma: 2.2,
    }
}

const SIZES: [(usize, usize, &str); 3] = [
    (64, 64, "64x64"),
    (256, 256, "256x256"),
    (1024, 1024, "1024x1024"),
];

fn benchmark_demosaic_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("demosaic_by_size");
    let debayer = CpuDebayer::new();
    let levels = SensorLevels::new([64; 4], 1023);

    for (width, height, label) in SIZES {
        let mosaic = generate_mock_mosaic(width, height);
        group.bench_with_input(BenchmarkId::from_parameter(label), &mosaic, |b, data| {
            b.iter(|| debayer.process(black_box(data), width, height, CfaPattern::Rggb, &levels));
        });
    }

    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let mosaic = generate_mock_mosaic(256, 256);

    let modes = [
        (DebugConfig::default(), "plain"),
        (
            DebugConfig {
                dump_intermediate_images: true,
                bypass_ccm: false,
            },
            "snapshots",
        ),
    ];

    for (debug, label) in modes {
        let executor = PipelineExecutor::standard(debug);
        group.bench_with_input(BenchmarkId::from_parameter(label), &mosaic, |b, data| {
            b.iter(|| {
                let context = PipelineContext::new(black_box(data.clone()), 256, 256, camera_metadata());
                executor.execute(context).into_result()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_demosaic_sizes, benchmark_pipeline);
criterion_main!(benches);
