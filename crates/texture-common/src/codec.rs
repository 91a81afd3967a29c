//! Raster image codec seam.
//!
//! The roughness engine never touches file formats directly. It asks an
//! [`ImageCodec`] for image dimensions, decoded pixels, and level encoding.
//! `texture-io` provides the file-backed implementation.

use std::path::Path;

use crate::error::{Result, TextureError};
use crate::grid::{PixelGrid, Rgb};

/// Channel layout of a decoded source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Single-channel grayscale.
    Gray,
    /// Grayscale with alpha.
    GrayAlpha,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    /// True for plain grayscale sources, which carry a display gamma that
    /// has to be undone before the values are used as heights.
    pub fn is_single_channel(&self) -> bool {
        matches!(self, ChannelLayout::Gray)
    }
}

/// A decoded image at its native resolution.
///
/// Channel values are normalized to `[0, 1]`; grayscale sources are
/// expanded so that `r == g == b`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub layout: ChannelLayout,
    pub pixels: Vec<Rgb>,
}

impl DecodedImage {
    /// Build a decoded image. Zero dimensions and a pixel count other than
    /// `width * height` are rejected.
    pub fn new(width: usize, height: usize, layout: ChannelLayout, pixels: Vec<Rgb>) -> Result<Self> {
        let image = Self {
            width,
            height,
            layout,
            pixels,
        };
        image.validate()?;
        Ok(image)
    }

    /// Check the shape of an image built field by field.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TextureError::configuration(format!(
                "decoded image must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width.checked_mul(self.height) != Some(self.pixels.len()) {
            return Err(TextureError::configuration(format!(
                "decoded image has {} pixels, expected {} for {}x{}",
                self.pixels.len(),
                self.width.saturating_mul(self.height),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Read a source pixel, wrapping coordinates around the image edges.
    ///
    /// Only meaningful on a [`validate`](Self::validate)d image.
    #[inline]
    pub fn pixel(&self, x: isize, y: isize) -> Rgb {
        let x = x.rem_euclid(self.width as isize) as usize;
        let y = y.rem_euclid(self.height as isize) as usize;
        self.pixels[y * self.width + x]
    }

    pub fn is_single_channel(&self) -> bool {
        self.layout.is_single_channel()
    }
}

/// Decodes source rasters and encodes output levels.
pub trait ImageCodec: Send + Sync {
    /// Return `(width, height)` without decoding the pixel data.
    fn probe(&self, path: &Path) -> Result<(usize, usize)>;

    /// Decode the full image at its native resolution.
    fn decode(&self, path: &Path) -> Result<DecodedImage>;

    /// Write `grid` to `path`, picking the format from the file extension.
    fn encode(&self, grid: &PixelGrid, path: &Path) -> Result<()>;
}
