//! Benchmarks for roughness accumulation.
//!
//! Run with: cargo bench --package roughness-engine
//! Or: cargo bench --package roughness-engine --bench deviation_benchmarks

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mip_pyramid::{resample_to_square, MipLevels};
use roughness_engine::{
    accumulate_level_deviation, BaseRoughness, EngineConfig, MapKind, MapSource, Renderer,
    RoughnessJob, RoughnessSolver, SlopeEstimator, SlopeParams,
};
use test_utils::{height_map, MemoryCodec};
use texture_common::{CancellationToken, ImageCodec, LevelExecutor, NoProgress, PixelGrid};

fn random_levels(size: usize, seed: u64) -> MipLevels {
    let mut rng = StdRng::seed_from_u64(seed);
    let values: Vec<f32> = (0..size * size).map(|_| rng.gen_range(0.0..1.0)).collect();
    let image = height_map(size, size, |x, y| values[y * size + x]);
    let base = resample_to_square(&image, size).expect("base level");
    MipLevels::from_base(base, size.trailing_zeros() as usize).expect("levels")
}

// =============================================================================
// PER-LEVEL DEVIATION BENCHMARKS
// =============================================================================

fn bench_level_deviation(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_deviation");
    let size = 256;
    let levels = random_levels(size, 1);

    for kind in [MapKind::Bump, MapKind::Normal] {
        let estimator = SlopeEstimator::new(SlopeParams {
            kind,
            strength: 1.0,
            unit_size: 1.0,
            renderer: Renderer::Arnold,
        });
        for level in [1usize, 4] {
            let mut out = PixelGrid::new(size >> level, size >> level).expect("output level");
            // Every level reads the full level-0 footprint.
            group.throughput(Throughput::Elements((size * size) as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{}", kind), level),
                &level,
                |b, &level| {
                    b.iter(|| {
                        accumulate_level_deviation(&estimator, black_box(&levels), level, &mut out)
                    })
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// FULL SOLVE BENCHMARKS
// =============================================================================

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);

    for size in [128usize, 512] {
        let mut rng = StdRng::seed_from_u64(size as u64);
        let values: Vec<f32> = (0..size * size).map(|_| rng.gen_range(0.0..1.0)).collect();
        let codec = Arc::new(
            MemoryCodec::new().with_image("bump.png", height_map(size, size, |x, y| values[y * size + x])),
        );
        let codec: Arc<dyn ImageCodec> = codec;
        let maps = [MapSource::new("bump.png", 0.1, MapKind::Bump)];
        let executor = LevelExecutor::new(None).expect("executor");
        let config = EngineConfig::default();

        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("one_bump_map", size), &size, |b, _| {
            b.iter(|| {
                let job = RoughnessJob::open(
                    &maps,
                    &BaseRoughness::Constant(0.3),
                    1.0,
                    Renderer::Arnold,
                    codec.clone(),
                )
                .expect("job");
                let mut solver =
                    RoughnessSolver::new(&executor, &config, &NoProgress, CancellationToken::new());
                solver.solve(job)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_level_deviation, bench_solve);
criterion_main!(benches);
