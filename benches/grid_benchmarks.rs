//! Benchmarks for sampling plans and contact-sheet composition.
//!
//! Run with: cargo bench
//!
//! The video benchmark needs `tests/fixtures/sample_video.mp4` and is
//! skipped when it is missing.

use std::{path::Path, time::Duration};

use criterion::Criterion;
use framegrid::{FfmpegLogLevel, FrameSampler, SamplerOptions, SamplingPlan};
use image::{DynamicImage, Rgb, RgbImage};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn synthetic_frames(count: usize, width: u32, height: u32) -> Vec<DynamicImage> {
    (0..count)
        .map(|index| {
            let shade = (index * 255 / count.max(1)) as u8;
            DynamicImage::ImageRgb8(RgbImage::from_pixel(
                width,
                height,
                Rgb([shade, 0, 255 - shade]),
            ))
        })
        .collect()
}

fn benchmark_layout_resolution(criterion: &mut Criterion) {
    criterion.bench_function("resolve_layout 18 frames / 5 columns", |bencher| {
        bencher.iter(|| framegrid::resolve_layout(18, 5).unwrap());
    });

    criterion.bench_function("resolve_layout prime count fallback", |bencher| {
        bencher.iter(|| framegrid::resolve_layout(997, 40).unwrap());
    });

    criterion.bench_function("sampling plan 1h at 30 fps", |bencher| {
        bencher.iter(|| SamplingPlan::new(108_000, 16, 5).unwrap());
    });
}

fn benchmark_composition(criterion: &mut Criterion) {
    let small = synthetic_frames(16, 448, 252);
    criterion.bench_function("compose 16 frames 448x252 in 4 columns", |bencher| {
        bencher.iter(|| framegrid::resolve(&small, 4).unwrap());
    });

    let full_hd = synthetic_frames(16, 1344, 756);
    criterion.bench_function("compose 16 frames 1344x756 in 4 columns", |bencher| {
        bencher.iter(|| framegrid::resolve(&full_hd, 4).unwrap());
    });
}

fn benchmark_video_sampling(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }
    framegrid::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    let sampler = FrameSampler::new(SamplerOptions::new());
    criterion.bench_function("sample 16 frames from fixture", |bencher| {
        bencher.iter(|| sampler.sample(SAMPLE_VIDEO, 16).unwrap());
    });
}

criterion::criterion_group!(
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = benchmark_layout_resolution, benchmark_composition, benchmark_video_sampling
);
criterion::criterion_main!(benches);
