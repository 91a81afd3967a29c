//! Roughness texture generator.
//!
//! Reads bump, displacement and normal maps and writes roughness mip
//! levels, either as individual images or compiled into a `.tx`/`.tex`
//! texture with maketx or txmake:
//!
//! ```text
//! bump2roughness --map bump.png:0.5 --map normal.png:1:normal \
//!     --output specular=rough.tx=0.3 --renderer arnold
//! bump2roughness --config job.yaml --mode individual-levels
//! ```

mod config;
mod summary;

use std::future::Future;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use roughness_engine::{EngineConfig, MapSource, Renderer, RoughnessOutput, RoughnessPipeline};
use texture_common::{CancellationToken, ChannelProgress, ProgressEvent};
use texture_io::{ImageCrateCodec, OutputMode, TextureCompiler};
use tracing::{debug, error, info, info_span, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

use config::{load_job_file, parse_map_arg, parse_output_arg, resolve, JobOverrides, JobSettings};
use summary::RunSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "bump2roughness")]
#[command(about = "Generate roughness mip levels from bump, displacement and normal maps")]
struct Args {
    /// YAML job file; command-line flags override its values
    #[arg(short, long, env = "ROUGHNESS_JOB")]
    config: Option<PathBuf>,

    /// Input map as PATH[:STRENGTH[:KIND]], KIND is bump, displacement or normal
    #[arg(short, long = "map", value_parser = parse_map_arg)]
    maps: Vec<MapSource>,

    /// World-space size of the texture's unit square
    #[arg(long)]
    unit_size: Option<f32>,

    /// Target renderer: arnold or renderman
    #[arg(long)]
    renderer: Option<Renderer>,

    /// Output as NAME=PATH[=BASE], BASE is a roughness value or image path
    #[arg(short, long = "output", value_parser = parse_output_arg)]
    outputs: Vec<RoughnessOutput>,

    /// texture (compile with maketx/txmake) or individual-levels
    #[arg(long)]
    mode: Option<OutputMode>,

    /// Path to maketx or txmake; searched on PATH when unset
    #[arg(long, env = "MAKETX_PATH")]
    compiler: Option<PathBuf>,

    /// Image format for level files
    #[arg(long)]
    level_format: Option<String>,

    /// Worker threads for level processing (default: all cores)
    #[arg(long, env = "ROUGHNESS_THREADS")]
    threads: Option<usize>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Print a JSON summary of the run to stdout
    #[arg(long)]
    summary_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    let run_id = Uuid::new_v4();
    let span = info_span!("run", %run_id);

    let file = match &args.config {
        Some(path) => Some(load_job_file(path)?),
        None => None,
    };
    let settings = resolve(
        file,
        JobOverrides {
            maps: args.maps.clone(),
            outputs: args.outputs.clone(),
            unit_size: args.unit_size,
            renderer: args.renderer,
            mode: args.mode,
            compiler: args.compiler.clone(),
            level_format: args.level_format.clone(),
        },
    )?;

    let mut engine_config = EngineConfig::from_env();
    if args.threads.is_some() {
        engine_config.threads = args.threads;
    }

    let pipeline = build_pipeline(&settings, engine_config)?;
    span.in_scope(|| {
        info!(
            maps = settings.maps.len(),
            outputs = settings.outputs.len(),
            renderer = %settings.renderer,
            unit_size = settings.unit_size,
            mode = %pipeline.mode(),
            "Starting roughness generation"
        );
    });

    // Cancel on Ctrl+C; workers stop at the next level boundary
    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_interrupt(tokio::signal::ctrl_c(), cancel.clone()));

    let (tx, rx) = mpsc::channel();
    let progress_span = span.clone();
    let reporter = tokio::task::spawn_blocking(move || {
        progress_span.in_scope(|| log_progress(rx));
    });

    let start = Instant::now();
    let job_span = span.clone();
    let job_settings = settings.clone();
    let result = tokio::task::spawn_blocking(move || {
        let progress = ChannelProgress::new(tx);
        job_span.in_scope(|| {
            pipeline.run_all(
                &job_settings.maps,
                job_settings.unit_size,
                job_settings.renderer,
                &job_settings.outputs,
                &progress,
                &cancel,
            )
        })
    })
    .await
    .context("Roughness worker panicked")?;
    reporter.await.ok();

    let reports = match result {
        Ok(reports) => reports,
        Err(e) if e.is_cancelled() => {
            span.in_scope(|| warn!("Roughness generation cancelled"));
            return Err(e.into());
        }
        Err(e) => {
            span.in_scope(|| error!(error = %e, "Roughness generation failed"));
            return Err(e.into());
        }
    };

    let elapsed_ms = start.elapsed().as_millis() as u64;
    span.in_scope(|| info!(outputs = reports.len(), elapsed_ms, "Roughness generation complete"));

    if args.summary_json {
        let summary = RunSummary {
            run_id,
            renderer: settings.renderer,
            unit_size: settings.unit_size,
            maps: settings.maps.len(),
            outputs: reports,
            elapsed_ms,
        };
        println!("{}", summary.to_json()?);
    }

    Ok(())
}

/// Cancel `token` once `signal` fires. A signal handler that could not be
/// installed leaves the run alone.
async fn cancel_on_interrupt<F>(signal: F, token: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            warn!("Interrupt received, cancelling");
            token.cancel();
        }
        Err(e) => warn!(error = %e, "Ctrl+C handler unavailable, run cannot be interrupted"),
    }
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match args.log_format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
    }
    Ok(())
}

fn build_pipeline(settings: &JobSettings, engine_config: EngineConfig) -> Result<RoughnessPipeline> {
    let compiler = match settings.mode {
        OutputMode::IndividualLevels => None,
        OutputMode::Texture => match &settings.compiler {
            Some(path) => Some(TextureCompiler::new(path.clone())),
            None => TextureCompiler::discover(),
        },
    };
    if let Some(compiler) = &compiler {
        info!(program = %compiler.program().display(), flavor = ?compiler.flavor(), "Using texture compiler");
    }

    let pipeline = RoughnessPipeline::new(Arc::new(ImageCrateCodec::new()), engine_config)?
        .with_mode(settings.mode, compiler)?
        .with_level_format(&settings.level_format)?;
    Ok(pipeline)
}

/// Log checkpoints as they arrive and per-level work every 10%.
fn log_progress(rx: mpsc::Receiver<ProgressEvent>) {
    let mut fraction = 0.0f64;
    let mut last_logged = 0.0f64;

    for event in rx {
        match event {
            ProgressEvent::Checkpoint { fraction: f, status } => {
                fraction = f;
                last_logged = f;
                info!(progress = format!("{:.0}%", f * 100.0), "{}", status);
            }
            ProgressEvent::Advance { delta } => {
                fraction += delta;
                if fraction - last_logged >= 0.1 {
                    last_logged = fraction;
                    debug!(progress = format!("{:.0}%", fraction * 100.0), "Processing levels");
                }
            }
        }
    }
}
