//! The roughness solver.
//!
//! ```text
//! Seeded ─► Accumulating { map: 0 } ─► … ─► Accumulating { map: n-1 }
//!                                                  │
//!                              Done ◄─ FlatnessFix ◄─ Normalizing
//! ```
//!
//! Output levels hold squared roughness until `Normalizing`. Each input
//! pyramid is realized right before its contribution and released right
//! after, so only one is resident at a time.

use std::fmt;
use std::time::Instant;

use mip_pyramid::MipLevels;
use texture_common::{CancellationToken, LevelExecutor, ProgressSink, Result, Rgb};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::deviation::accumulate_level_deviation;
use crate::job::{BaseSpec, RoughnessJob};
use crate::slope::SlopeEstimator;

/// Weight kept by level 0 in the flatness fix.
const FLATNESS_KEEP: f32 = 0.975;

/// Exponent lifting small level-1 values before they are blended in.
const FLATNESS_LIFT: f32 = 1.0 / 3.0;

/// Where the solver is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    Seeded,
    Accumulating { map: usize },
    Normalizing,
    FlatnessFix,
    Done,
}

impl fmt::Display for SolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverState::Seeded => write!(f, "seeded"),
            SolverState::Accumulating { map } => write!(f, "accumulating map {}", map),
            SolverState::Normalizing => write!(f, "normalizing"),
            SolverState::FlatnessFix => write!(f, "flatness fix"),
            SolverState::Done => write!(f, "done"),
        }
    }
}

/// Turns a [`RoughnessJob`] into finished roughness levels.
pub struct RoughnessSolver<'a> {
    executor: &'a LevelExecutor,
    config: &'a EngineConfig,
    progress: &'a dyn ProgressSink,
    cancel: CancellationToken,
    history: Vec<SolverState>,
}

impl<'a> RoughnessSolver<'a> {
    pub fn new(
        executor: &'a LevelExecutor,
        config: &'a EngineConfig,
        progress: &'a dyn ProgressSink,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            executor,
            config,
            progress,
            cancel,
            history: Vec::new(),
        }
    }

    /// Current state, `None` before [`solve`](Self::solve).
    pub fn state(&self) -> Option<SolverState> {
        self.history.last().copied()
    }

    /// Every state entered so far, in order.
    pub fn history(&self) -> &[SolverState] {
        &self.history
    }

    fn enter(&mut self, state: SolverState) {
        debug!(state = %state, "Solver state");
        self.history.push(state);
    }

    /// Run every stage and return the normalized levels.
    pub fn solve(&mut self, job: RoughnessJob) -> Result<MipLevels> {
        let start = Instant::now();
        let resolution = job.resolution();
        let level_count = job.level_count();
        let params: Vec<_> = (0..job.maps().len()).map(|i| job.slope_params(i)).collect();
        let (mut maps, mut base) = job.into_parts();
        let constant_base = base.is_constant();

        self.cancel.check()?;
        self.progress.on_progress(0.0, "Loading base roughness");
        let mut output = MipLevels::zeroed(resolution, level_count)?;
        self.seed(&mut output, &mut base)?;
        drop(base);
        self.enter(SolverState::Seeded);

        let band_start = self.config.progress_band_start;
        let band_width = self.config.band_width();
        let map_count = maps.len();
        let per_level = band_width / (level_count * map_count) as f64;

        self.progress.on_progress(band_start, "Calculating roughnesses");
        for (index, map) in maps.iter_mut().enumerate() {
            self.cancel.check()?;
            self.enter(SolverState::Accumulating { map: index });

            let fraction = band_start + index as f64 / map_count as f64 * band_width;
            self.progress.on_progress(fraction, &format!("Reading map {}", index));
            let realized = map.pyramid.scoped()?;
            self.progress
                .on_progress(fraction, &format!("Calculating roughness for map {}", index));

            let estimator = SlopeEstimator::new(params[index]);
            let input: &MipLevels = realized.levels();
            let map_start = Instant::now();
            let cancel = &self.cancel;
            let progress = self.progress;

            self.executor.for_each_level(output.levels_mut(), |level, grid| {
                cancel.check()?;
                accumulate_level_deviation(&estimator, input, level, grid)?;
                progress.add_progress(per_level);
                Ok(())
            })?;

            info!(
                map = index,
                path = %realized.source().display(),
                kind = %map.kind,
                strength = map.strength,
                elapsed_ms = map_start.elapsed().as_millis() as u64,
                "Accumulated map roughness"
            );
        }
        drop(maps);

        self.progress
            .on_progress(self.config.progress_band_end, "Cleaning up roughness textures");
        self.enter(SolverState::Normalizing);
        self.executor.for_each_level(output.levels_mut(), |_, grid| {
            grid.map_in_place(|v| v.sqrt().max(0.0).min(1.0));
            Ok(())
        })?;

        if constant_base && level_count >= 2 {
            self.enter(SolverState::FlatnessFix);
            apply_flatness_fix(&mut output);
        }

        self.enter(SolverState::Done);
        info!(
            resolution,
            levels = level_count,
            maps = map_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Roughness solved"
        );
        Ok(output)
    }

    /// Fill every level with the squared base roughness.
    fn seed(&self, output: &mut MipLevels, base: &mut BaseSpec) -> Result<()> {
        match base {
            BaseSpec::Constant(v) => {
                let squared = *v * *v;
                self.executor.for_each_level(output.levels_mut(), |_, grid| {
                    grid.fill(squared);
                    Ok(())
                })
            }
            BaseSpec::Pyramid(pyramid) => {
                let realized = pyramid.scoped()?;
                let input: &MipLevels = realized.levels();
                self.executor.for_each_level(output.levels_mut(), |level, grid| {
                    for (out, v) in grid.as_floats_mut().iter_mut().zip(input[level].as_floats()) {
                        *out = v * v;
                    }
                    Ok(())
                })
            }
        }
    }
}

/// Blend a little of level 1 into level 0 so a constant top level stays
/// non-uniform. Texture compilers collapse uniform images to a single
/// color, which would drop the pre-built lower levels.
///
/// Needs at least two levels; fewer is a no-op.
pub fn apply_flatness_fix(levels: &mut MipLevels) {
    let grids = levels.levels_mut();
    if grids.len() < 2 {
        return;
    }
    let (top, rest) = grids.split_at_mut(1);
    let l0 = &mut top[0];
    let l1 = &rest[0];

    for j in 0..l0.height() as isize {
        for i in 0..l0.width() as isize {
            let lifted = l1.red(i / 2, j / 2).powf(FLATNESS_LIFT);
            let v = l0.red(i, j) * FLATNESS_KEEP + lifted * (1.0 - FLATNESS_KEEP);
            l0.set(i, j, Rgb::splat(v));
        }
    }
}
