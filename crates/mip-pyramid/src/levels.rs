//! Owned sets of mip levels.

use std::ops::Index;

use texture_common::{PixelGrid, Result, TextureError};

use crate::downsample::downsample_2x;

/// Largest power of two that is not above `max(width, height)`.
///
/// Returns `None` for an empty image.
pub fn target_resolution(width: usize, height: usize) -> Option<usize> {
    let res = width.max(height);
    if res == 0 {
        return None;
    }
    Some(1usize << (usize::BITS - 1 - res.leading_zeros()))
}

/// Number of stored levels for a power-of-two `resolution`: `floor(log2(resolution))`.
pub fn level_count_for(resolution: usize) -> usize {
    if resolution == 0 {
        return 0;
    }
    (usize::BITS - 1 - resolution.leading_zeros()) as usize
}

/// Square power-of-two levels, `levels[i]` being `resolution >> i` wide.
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevels {
    levels: Vec<PixelGrid>,
}

impl MipLevels {
    /// Allocate `level_count` zero-filled levels below `resolution`.
    pub fn zeroed(resolution: usize, level_count: usize) -> Result<Self> {
        validate_shape(resolution, level_count)?;
        let levels = (0..level_count)
            .map(|i| PixelGrid::new(resolution >> i, resolution >> i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { levels })
    }

    /// Build the full chain from a square level-0 grid by repeated 2x2
    /// box downsampling.
    pub fn from_base(base: PixelGrid, level_count: usize) -> Result<Self> {
        if base.width() != base.height() {
            return Err(TextureError::configuration(format!(
                "level 0 must be square, got {}x{}",
                base.width(),
                base.height()
            )));
        }
        validate_shape(base.width(), level_count)?;

        let mut levels = Vec::with_capacity(level_count);
        levels.push(base);
        for i in 1..level_count {
            tracing::trace!(level = i, "Generating mip level");
            let next = downsample_2x(&levels[i - 1])?;
            levels.push(next);
        }
        Ok(Self { levels })
    }

    /// Side length of level 0.
    pub fn resolution(&self) -> usize {
        self.levels[0].width()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, level: usize) -> Option<&PixelGrid> {
        self.levels.get(level)
    }

    pub fn levels(&self) -> &[PixelGrid] {
        &self.levels
    }

    /// Mutable access to the levels as disjoint slices for per-level workers.
    pub fn levels_mut(&mut self) -> &mut [PixelGrid] {
        &mut self.levels
    }

    pub fn iter(&self) -> impl Iterator<Item = &PixelGrid> {
        self.levels.iter()
    }
}

impl Index<usize> for MipLevels {
    type Output = PixelGrid;

    fn index(&self, level: usize) -> &PixelGrid {
        &self.levels[level]
    }
}

fn validate_shape(resolution: usize, level_count: usize) -> Result<()> {
    if !resolution.is_power_of_two() {
        return Err(TextureError::configuration(format!(
            "mip resolution {} is not a power of two",
            resolution
        )));
    }
    if level_count == 0 || level_count > level_count_for(resolution) {
        return Err(TextureError::configuration(format!(
            "{} levels do not fit a {}x{} pyramid",
            level_count, resolution, resolution
        )));
    }
    Ok(())
}
