//! Per-texel slope estimation.
//!
//! Slopes are kept as two signed components rather than a magnitude so
//! that differences between slopes keep their direction.

use std::ops::Sub;

use mip_pyramid::MipLevels;
use texture_common::PixelGrid;

use crate::types::{slope_rule, MapKind, Renderer, SlopeRule, SlopeSource};

/// Smallest `|nz|` used when dividing by a normal's z component.
pub const MIN_NORMAL_Z: f32 = 1e-4;

/// Two axis-aligned slope components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Slope {
    pub x: f32,
    pub y: f32,
}

impl Slope {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// `x² + y²`.
    #[inline]
    pub fn norm_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    fn clamp_unit(self) -> Self {
        Self {
            x: self.x.clamp(-1.0, 1.0),
            y: self.y.clamp(-1.0, 1.0),
        }
    }
}

impl Sub for Slope {
    type Output = Slope;

    #[inline]
    fn sub(self, rhs: Slope) -> Slope {
        Slope {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Everything besides the texel that determines a slope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeParams {
    pub kind: MapKind,
    /// User multiplier on the derived slope.
    pub strength: f32,
    /// World-space size of UV 0..1.
    pub unit_size: f32,
    pub renderer: Renderer,
}

/// Slope at `(x, y)` of `level`. Coordinates wrap.
pub fn slope(levels: &MipLevels, level: usize, x: isize, y: isize, params: &SlopeParams) -> Slope {
    SlopeEstimator::new(*params).slope(&levels[level], x, y)
}

/// Slope evaluation with the rule for one (kind, renderer) pair resolved
/// up front.
#[derive(Debug, Clone, Copy)]
pub struct SlopeEstimator {
    params: SlopeParams,
    rule: SlopeRule,
}

impl SlopeEstimator {
    pub fn new(params: SlopeParams) -> Self {
        Self {
            rule: slope_rule(params.kind, params.renderer),
            params,
        }
    }

    pub fn params(&self) -> &SlopeParams {
        &self.params
    }

    /// Slope at `(x, y)` of a single level grid.
    #[inline]
    pub fn slope(&self, grid: &PixelGrid, x: isize, y: isize) -> Slope {
        let raw = match self.rule.source {
            SlopeSource::TangentNormal => self.normal_slope(grid, x, y),
            SlopeSource::HeightDifference => self.height_slope(grid, x, y),
        };

        let mut s = raw;
        if self.rule.attenuation != 1.0 {
            s.x /= self.rule.attenuation;
            s.y /= self.rule.attenuation;
        }
        if self.rule.clamp {
            s = s.clamp_unit();
        }
        s
    }

    #[inline]
    fn normal_slope(&self, grid: &PixelGrid, x: isize, y: isize) -> Slope {
        let texel = grid.get(x, y);
        let nx = texel.r * 2.0 - 1.0;
        let ny = texel.g * 2.0 - 1.0;
        let nz = guard_normal_z(texel.b * 2.0 - 1.0);
        Slope::new(
            nx / nz * self.params.strength,
            ny / nz * self.params.strength,
        )
    }

    #[inline]
    fn height_slope(&self, grid: &PixelGrid, x: isize, y: isize) -> Slope {
        // Square texels are assumed, so one size covers both axes.
        let duv = self.params.unit_size / grid.width() as f32;
        let h = grid.red(x, y);
        let dx = (grid.red(x + 1, y) - h) * self.params.strength;
        let dy = (grid.red(x, y + 1) - h) * self.params.strength;
        Slope::new(dx / duv, dy / duv)
    }
}

/// Keep `nz` at least [`MIN_NORMAL_Z`] away from zero, preserving its sign.
/// Zero counts as positive.
#[inline]
fn guard_normal_z(nz: f32) -> f32 {
    if nz.abs() >= MIN_NORMAL_Z {
        nz
    } else if nz < 0.0 {
        -MIN_NORMAL_Z
    } else {
        MIN_NORMAL_Z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use texture_common::Rgb;

    fn params(kind: MapKind, renderer: Renderer, strength: f32) -> SlopeParams {
        SlopeParams {
            kind,
            strength,
            unit_size: 1.0,
            renderer,
        }
    }

    fn encode_normal(nx: f32, ny: f32, nz: f32) -> Rgb {
        Rgb::new((nx + 1.0) / 2.0, (ny + 1.0) / 2.0, (nz + 1.0) / 2.0)
    }

    /// 4x4 height grid with a step of `step` between columns 1 and 2.
    fn step_grid(step: f32) -> PixelGrid {
        let mut grid = PixelGrid::new(4, 4).unwrap();
        for y in 0..4 {
            for x in 2..4 {
                grid.set(x, y, Rgb::splat(step));
            }
        }
        grid
    }

    #[test]
    fn test_normal_slope_renderman_unbounded() {
        let grid = PixelGrid::filled(2, 2, encode_normal(0.5, -0.25, 0.25)).unwrap();
        let est = SlopeEstimator::new(params(MapKind::Normal, Renderer::RenderMan, 2.0));
        let s = est.slope(&grid, 0, 0);
        assert!((s.x - 4.0).abs() < 1e-5);
        assert!((s.y + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_normal_slope_arnold_clamped() {
        let grid = PixelGrid::filled(2, 2, encode_normal(0.5, -0.25, 0.25)).unwrap();
        let est = SlopeEstimator::new(params(MapKind::Normal, Renderer::Arnold, 2.0));
        assert_eq!(est.slope(&grid, 1, 1), Slope::new(1.0, -1.0));
    }

    #[test]
    fn test_flat_normal_has_zero_slope() {
        let grid = PixelGrid::filled(2, 2, encode_normal(0.0, 0.0, 1.0)).unwrap();
        let est = SlopeEstimator::new(params(MapKind::Normal, Renderer::RenderMan, 1.0));
        assert_eq!(est.slope(&grid, 0, 0), Slope::default());
    }

    #[test]
    fn test_horizontal_normal_stays_finite() {
        // nz decodes to exactly 0.
        let grid = PixelGrid::filled(2, 2, Rgb::new(1.0, 0.5, 0.5)).unwrap();
        let est = SlopeEstimator::new(params(MapKind::Normal, Renderer::RenderMan, 1.0));
        let s = est.slope(&grid, 0, 0);
        assert!(s.x.is_finite());
        assert!((s.x - 1.0 / MIN_NORMAL_Z).abs() < 1.0);
        assert_eq!(s.y, 0.0);
    }

    #[test]
    fn test_guard_preserves_sign() {
        assert_eq!(guard_normal_z(0.0), MIN_NORMAL_Z);
        assert_eq!(guard_normal_z(-1e-6), -MIN_NORMAL_Z);
        assert_eq!(guard_normal_z(1e-6), MIN_NORMAL_Z);
        assert_eq!(guard_normal_z(-0.5), -0.5);
    }

    #[test]
    fn test_displacement_slope_uses_texel_size() {
        // duv = 1 / 4, a 0.1 step gives 0.4 before strength.
        let grid = step_grid(0.1);
        let est = SlopeEstimator::new(params(MapKind::Displacement, Renderer::Arnold, 3.0));
        let s = est.slope(&grid, 1, 0);
        assert!((s.x - 1.2).abs() < 1e-5);
        assert_eq!(s.y, 0.0);
        // Wraps from column 3 back to column 0.
        let s = est.slope(&grid, 3, 0);
        assert!((s.x + 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_bump_slope_per_renderer() {
        let grid = step_grid(0.5);
        let arnold = SlopeEstimator::new(params(MapKind::Bump, Renderer::Arnold, 1.0));
        let rman = SlopeEstimator::new(params(MapKind::Bump, Renderer::RenderMan, 1.0));
        // Raw slope is 0.5 / 0.25 = 2.
        assert_eq!(arnold.slope(&grid, 1, 0).x, 1.0);
        assert!((rman.slope(&grid, 1, 0).x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_unit_size_scales_slope() {
        let grid = step_grid(0.1);
        let mut p = params(MapKind::Displacement, Renderer::RenderMan, 1.0);
        p.unit_size = 2.0;
        let s = SlopeEstimator::new(p).slope(&grid, 1, 0);
        assert!((s.x - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_free_function_reads_requested_level() {
        let base = step_grid(0.1);
        let levels = MipLevels::from_base(base, 2).unwrap();
        let p = params(MapKind::Displacement, Renderer::RenderMan, 1.0);
        // Level 1 is 2x2 with columns 0.0 and 0.1; duv = 0.5.
        let s = slope(&levels, 1, 0, 0, &p);
        assert!((s.x - 0.2).abs() < 1e-6);
    }
}
