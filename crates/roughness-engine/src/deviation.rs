//! Slope deviation lost by mip filtering.
//!
//! A texel at level `L` covers a `2^L x 2^L` block of level 0. The detail
//! that filtering removes is the spread of the level-0 slopes in that block
//! around the slope at level `L`:
//!
//! ```text
//! deviation = 2 * mean((s0 - sL)^2)
//! ```
//!
//! The result is a squared roughness, so contributions from several maps
//! add linearly. The square root is taken once all maps are in.

use mip_pyramid::MipLevels;
use texture_common::{PixelGrid, Result, TextureError};

use crate::slope::SlopeEstimator;

/// Squared roughness of one coarse texel.
#[inline]
pub fn texel_deviation(
    estimator: &SlopeEstimator,
    base: &PixelGrid,
    coarse: &PixelGrid,
    level: usize,
    i: usize,
    j: usize,
) -> f32 {
    let mean = estimator.slope(coarse, i as isize, j as isize);
    let scale = 1usize << level;

    let mut sum = 0.0f32;
    for jj in j * scale..(j + 1) * scale {
        for ii in i * scale..(i + 1) * scale {
            let delta = estimator.slope(base, ii as isize, jj as isize) - mean;
            sum += delta.norm_squared();
        }
    }
    sum / (scale * scale) as f32 * 2.0
}

/// Add the deviation of `level` of `input` into `output`, the matching
/// output level. Level 0 has lost nothing and is left untouched.
pub fn accumulate_level_deviation(
    estimator: &SlopeEstimator,
    input: &MipLevels,
    level: usize,
    output: &mut PixelGrid,
) -> Result<()> {
    if level == 0 {
        return Ok(());
    }
    let coarse = input.get(level).ok_or_else(|| {
        TextureError::configuration(format!(
            "level {} requested from a {}-level pyramid",
            level,
            input.len()
        ))
    })?;
    if coarse.width() != output.width() || coarse.height() != output.height() {
        return Err(TextureError::configuration(format!(
            "output level {} is {}x{}, input is {}x{}",
            level,
            output.width(),
            output.height(),
            coarse.width(),
            coarse.height()
        )));
    }

    let base = &input[0];
    for j in 0..coarse.height() {
        for i in 0..coarse.width() {
            let deviation = texel_deviation(estimator, base, coarse, level, i, j);
            output.add_scalar(i as isize, j as isize, deviation);
        }
    }
    Ok(())
}
