//! Benchmarks for mip pyramid construction.
//!
//! Run with: cargo bench --package mip-pyramid
//! Or: cargo bench --package mip-pyramid --bench pyramid_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use mip_pyramid::{downsample_2x, resample_to_square, MipLevels};
use test_utils::{height_map, noise_height_map};

// =============================================================================
// RESAMPLING BENCHMARKS
// =============================================================================

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample_to_square");

    for size in [256usize, 1024] {
        let same = noise_height_map(size, 1);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("copy", size), &same, |b, img| {
            b.iter(|| resample_to_square(black_box(img), size))
        });

        // Slightly larger than a power of two forces the bilinear path.
        let odd = height_map(size + size / 4, size, |x, y| ((x ^ y) & 0xff) as f32 / 255.0);
        group.bench_with_input(BenchmarkId::new("bilinear", size), &odd, |b, img| {
            b.iter(|| resample_to_square(black_box(img), size))
        });
    }

    group.finish();
}

// =============================================================================
// DOWNSAMPLING BENCHMARKS
// =============================================================================

fn bench_downsample(c: &mut Criterion) {
    let mut group = c.benchmark_group("downsample");

    for size in [256usize, 1024] {
        let base = resample_to_square(&noise_height_map(size, 2), size).expect("base level");
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("single_2x", size), &base, |b, grid| {
            b.iter(|| downsample_2x(black_box(grid)))
        });

        let levels = size.trailing_zeros() as usize;
        group.bench_with_input(BenchmarkId::new("full_chain", size), &base, |b, grid| {
            b.iter(|| MipLevels::from_base(black_box(grid.clone()), levels))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resample, bench_downsample);
criterion_main!(benches);
