//! Common types and utilities shared across the roughness workspace.
//!
//! - [`PixelGrid`]: toroidally addressed RGB store for one resolution
//! - [`ImageCodec`]: decode/encode seam implemented by `texture-io`
//! - [`LevelExecutor`]: bounded per-level parallel fan-out
//! - [`ProgressSink`]: progress reporting passed through the pipeline
//! - [`Renderer`]: Arnold or RenderMan conventions
//! - [`TextureError`]: error taxonomy for every crate in the workspace

pub mod cancel;
pub mod codec;
pub mod error;
pub mod executor;
pub mod grid;
pub mod progress;
pub mod renderer;

pub use cancel::CancellationToken;
pub use codec::{ChannelLayout, DecodedImage, ImageCodec};
pub use error::{Result, TextureError};
pub use executor::LevelExecutor;
pub use grid::{PixelGrid, Rgb};
pub use progress::{ChannelProgress, NoProgress, ProgressEvent, ProgressSink, ProgressTracker};
pub use renderer::Renderer;
