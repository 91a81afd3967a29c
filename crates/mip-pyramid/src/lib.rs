//! Multi-resolution texture pyramids.
//!
//! Every pyramid is a power-of-two square:
//! - The target resolution is the largest power of two not above the
//!   source's larger dimension.
//! - `level_count = log2(resolution)`, so the 1x1 level is never stored.
//! - Level `i` is `resolution >> i` texels on each side and is the 2x2
//!   box average of level `i - 1`.
//!
//! ```text
//! MipPyramid::open(path)      probe only, no pixels
//!      │
//!      ▼
//! scoped() / realize()        decode ─► resample to square ─► downsample chain
//!      │
//!      ▼
//! RealizedPyramid (guard)     levels freed when the guard drops
//! ```
//!
//! All sampling is toroidal, matching the tileable textures the pyramids are
//! built from.

pub mod downsample;
pub mod levels;
pub mod pyramid;
pub mod resample;

pub use downsample::downsample_2x;
pub use levels::{level_count_for, target_resolution, MipLevels};
pub use pyramid::{MipPyramid, RealizedPyramid};
pub use resample::{resample_to_square, GRAYSCALE_GAMMA};
