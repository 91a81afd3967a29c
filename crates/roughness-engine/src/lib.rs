//! Roughness mip pyramids from bump, displacement and normal maps.
//!
//! Filtering a height or normal map down its mip chain throws away slope
//! detail. Renderers see a smoother surface at a distance than up close.
//! This crate measures what each level loses and stores it as roughness,
//! level by level, so a texture compiler can ship the levels as-is:
//!
//! 1. Seed every output level with the squared base roughness.
//! 2. For each input map, add `2 * mean((s0 - sL)^2)` per coarse texel.
//! 3. Take the square root and clamp to `[0, 1]`.
//! 4. For a constant base, blend a little of level 1 into level 0 so the
//!    top level is not uniform.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use roughness_engine::{BaseRoughness, EngineConfig, MapKind, MapSource, Renderer, RoughnessOutput, RoughnessPipeline};
//! use texture_common::{CancellationToken, NoProgress};
//! use texture_io::ImageCrateCodec;
//!
//! let pipeline = RoughnessPipeline::new(Arc::new(ImageCrateCodec::new()), EngineConfig::default())?;
//! let maps = [MapSource::new("bump.png", 1.0, MapKind::Bump)];
//! let outputs = [RoughnessOutput {
//!     name: "specular".into(),
//!     path: "rough".into(),
//!     base: BaseRoughness::Constant(0.3),
//! }];
//! pipeline.run_all(&maps, 1.0, Renderer::Arnold, &outputs, &NoProgress, &CancellationToken::new())?;
//! ```

pub mod config;
pub mod deviation;
pub mod job;
pub mod pipeline;
pub mod slope;
pub mod solver;
pub mod types;

pub use config::EngineConfig;
pub use deviation::{accumulate_level_deviation, texel_deviation};
pub use job::{BaseRoughness, BaseSpec, MapDescriptor, MapSource, RoughnessJob};
pub use pipeline::{OutputReport, RoughnessOutput, RoughnessPipeline};
pub use slope::{slope, Slope, SlopeEstimator, SlopeParams, MIN_NORMAL_Z};
pub use solver::{apply_flatness_fix, RoughnessSolver, SolverState};
pub use types::{slope_rule, MapKind, Renderer, SlopeRule, SlopeSource};
