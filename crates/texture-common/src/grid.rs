//! Toroidally addressed RGB pixel storage.
//!
//! A [`PixelGrid`] holds one resolution of a texture as a flat row-major
//! buffer of `3 * width * height` floats. Every coordinate, including
//! negative and out-of-range ones, wraps around the image edges, so texture
//! sampling is periodic and neighbour differences need no border handling.

use crate::error::{Result, TextureError};

/// One RGB texel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const ZERO: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// All three channels set to `v`.
    pub fn splat(v: f32) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Apply `f` to each channel.
    #[inline]
    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
        }
    }

    /// Linear interpolation towards `other` by `t`.
    #[inline]
    pub fn lerp(self, other: Rgb, t: f32) -> Self {
        Self {
            r: self.r * (1.0 - t) + other.r * t,
            g: self.g * (1.0 - t) + other.g * t,
            b: self.b * (1.0 - t) + other.b * t,
        }
    }

    /// Mean of a 2x2 block.
    #[inline]
    pub fn mean4(a: Rgb, b: Rgb, c: Rgb, d: Rgb) -> Self {
        Self {
            r: (a.r + b.r + c.r + d.r) / 4.0,
            g: (a.g + b.g + c.g + d.g) / 4.0,
            b: (a.b + b.b + c.b + d.b) / 4.0,
        }
    }
}

/// Flat toroidal RGB grid for a single resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl PixelGrid {
    /// Create a zero-filled grid. Both dimensions must be at least 1.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::filled(width, height, Rgb::ZERO)
    }

    /// Create a grid with every texel set to `value`.
    pub fn filled(width: usize, height: usize, value: Rgb) -> Result<Self> {
        let len = checked_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..width * height {
            data.extend_from_slice(&[value.r, value.g, value.b]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap an existing flat RGB buffer.
    pub fn from_floats(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(TextureError::configuration(format!(
                "pixel buffer has {} floats, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of texels (`width * height`).
    pub fn texel_count(&self) -> usize {
        self.width * self.height
    }

    /// The flat `3 * width * height` channel buffer.
    pub fn as_floats(&self) -> &[f32] {
        &self.data
    }

    pub fn as_floats_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    fn index(&self, x: isize, y: isize) -> usize {
        let x = x.rem_euclid(self.width as isize) as usize;
        let y = y.rem_euclid(self.height as isize) as usize;
        (y * self.width + x) * 3
    }

    /// Read the texel at `(x, y)`, wrapping both coordinates.
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> Rgb {
        let i = self.index(x, y);
        Rgb {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
        }
    }

    /// Red channel only; the height channel of bump and displacement maps.
    #[inline]
    pub fn red(&self, x: isize, y: isize) -> f32 {
        self.data[self.index(x, y)]
    }

    /// Write the texel at `(x, y)`, wrapping both coordinates.
    #[inline]
    pub fn set(&mut self, x: isize, y: isize, value: Rgb) {
        let i = self.index(x, y);
        self.data[i] = value.r;
        self.data[i + 1] = value.g;
        self.data[i + 2] = value.b;
    }

    /// Add `value` to all three channels of the texel at `(x, y)`.
    #[inline]
    pub fn add_scalar(&mut self, x: isize, y: isize, value: f32) {
        let i = self.index(x, y);
        self.data[i] += value;
        self.data[i + 1] += value;
        self.data[i + 2] += value;
    }

    /// Set every channel of every texel to `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Apply `f` to every channel value in place.
    pub fn map_in_place(&mut self, f: impl Fn(f32) -> f32) {
        for v in &mut self.data {
            *v = f(*v);
        }
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(TextureError::configuration(format!(
            "pixel grid must be at least 1x1, got {}x{}",
            width, height
        )));
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| {
            TextureError::configuration(format!("pixel grid {}x{} is too large", width, height))
        })
}
