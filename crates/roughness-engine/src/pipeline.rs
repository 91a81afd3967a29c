//! End-to-end roughness generation: solve, write levels, compile.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use texture_common::{CancellationToken, ImageCodec, LevelExecutor, ProgressSink, Result, TextureError};
use texture_io::{LevelWriter, OutputMode, TextureCompiler};
use tracing::{info, info_span, warn};

use crate::config::{EngineConfig, WRITE_CHECKPOINT};
use crate::job::{BaseRoughness, MapSource, RoughnessJob};
use crate::solver::RoughnessSolver;
use crate::types::Renderer;

/// Progress fraction reported when the texture compiler starts.
const COMPILE_CHECKPOINT: f64 = 0.90;

/// One roughness texture to produce from a shared set of maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoughnessOutput {
    /// Label used in logs and summaries, e.g. `diffuse` or `specular`.
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub base: BaseRoughness,
}

/// What a finished output produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputReport {
    pub name: String,
    pub output: PathBuf,
    pub mode: OutputMode,
    pub resolution: usize,
    pub level_count: usize,
    pub maps: usize,
    /// Files left on disk: the compiled texture or every level file.
    pub files: Vec<PathBuf>,
    pub elapsed_ms: u64,
}

/// Solver plus output stages, sharing one worker pool across jobs.
pub struct RoughnessPipeline {
    codec: Arc<dyn ImageCodec>,
    executor: LevelExecutor,
    config: EngineConfig,
    writer: LevelWriter,
    /// Set in texture mode only.
    compiler: Option<TextureCompiler>,
}

impl RoughnessPipeline {
    /// A pipeline writing individual levels. Use
    /// [`with_mode`](Self::with_mode) to produce compiled textures.
    pub fn new(codec: Arc<dyn ImageCodec>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let executor = LevelExecutor::new(config.threads)?;
        Ok(Self {
            writer: LevelWriter::new(codec.clone()),
            codec,
            executor,
            config,
            compiler: None,
        })
    }

    /// Set the output mode. [`OutputMode::Texture`] needs a compiler.
    pub fn with_mode(mut self, mode: OutputMode, compiler: Option<TextureCompiler>) -> Result<Self> {
        self.compiler = match (mode, compiler) {
            (OutputMode::IndividualLevels, _) => None,
            (OutputMode::Texture, Some(compiler)) => Some(compiler),
            (OutputMode::Texture, None) => {
                return Err(TextureError::configuration(
                    "texture output needs maketx or txmake; none was given or found",
                ))
            }
        };
        Ok(self)
    }

    /// Level file extension, `png` by default.
    pub fn with_level_format(mut self, extension: &str) -> Result<Self> {
        self.writer = self.writer.with_extension(extension)?;
        Ok(self)
    }

    pub fn mode(&self) -> OutputMode {
        if self.compiler.is_some() {
            OutputMode::Texture
        } else {
            OutputMode::IndividualLevels
        }
    }

    pub fn compiler(&self) -> Option<&TextureCompiler> {
        self.compiler.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn codec(&self) -> &Arc<dyn ImageCodec> {
        &self.codec
    }

    /// Solve `job` and write it to `output`.
    pub fn run(
        &self,
        name: &str,
        job: RoughnessJob,
        output: &Path,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<OutputReport> {
        let start = Instant::now();
        let resolution = job.resolution();
        let level_count = job.level_count();
        let map_count = job.maps().len();
        let renderer = job.renderer();

        let mut solver = RoughnessSolver::new(&self.executor, &self.config, progress, cancel.clone());
        let levels = solver.solve(job)?;

        cancel.check()?;
        progress.on_progress(WRITE_CHECKPOINT, "Writing texture");
        let level_files = self.writer.write(&levels, output, &self.executor)?;
        drop(levels);

        let files = match &self.compiler {
            None => level_files,
            Some(compiler) => {
                progress.on_progress(COMPILE_CHECKPOINT, "Generating TX/TEX file");
                compiler.compile(&level_files, output, renderer)?;
                vec![output.to_path_buf()]
            }
        };

        progress.on_progress(1.0, "Done writing output");
        let report = OutputReport {
            name: name.to_string(),
            output: output.to_path_buf(),
            mode: self.mode(),
            resolution,
            level_count,
            maps: map_count,
            files,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            files = report.files.len(),
            elapsed_ms = report.elapsed_ms,
            "Output finished"
        );
        Ok(report)
    }

    /// Produce every output from the same maps.
    ///
    /// Every job is opened and validated before the first one is solved,
    /// so a bad output fails the run before anything is written. Opening
    /// only probes the sources; each job realizes its pyramids when it
    /// runs, so a single input pyramid is resident at any time.
    pub fn run_all(
        &self,
        maps: &[MapSource],
        unit_size: f32,
        renderer: Renderer,
        outputs: &[RoughnessOutput],
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<OutputReport>> {
        if outputs.is_empty() {
            return Err(TextureError::configuration("at least one output is required"));
        }

        cancel.check()?;
        let jobs = outputs
            .iter()
            .map(|out| {
                RoughnessJob::open(maps, &out.base, unit_size, renderer, self.codec.clone())
                    .map_err(|e| {
                        warn!(name = %out.name, error = %e, "Output rejected");
                        e
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut reports = Vec::with_capacity(outputs.len());
        for (out, job) in outputs.iter().zip(jobs) {
            let span = info_span!("output", name = %out.name, path = %out.path.display());
            let _enter = span.enter();

            cancel.check()?;
            reports.push(self.run(&out.name, job, &out.path, progress, cancel)?);
        }
        Ok(reports)
    }
}

impl std::fmt::Debug for RoughnessPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoughnessPipeline")
            .field("threads", &self.executor.threads())
            .field("config", &self.config)
            .field("writer", &self.writer)
            .field("compiler", &self.compiler)
            .finish_non_exhaustive()
    }
}
