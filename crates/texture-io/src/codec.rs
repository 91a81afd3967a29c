//! [`ImageCodec`] backed by the `image` crate.

use std::path::Path;

use image::{ColorType, DynamicImage, ImageFormat, RgbImage};
use texture_common::{ChannelLayout, DecodedImage, ImageCodec, PixelGrid, Result, Rgb, TextureError};
use tracing::debug;

/// Reads any format the `image` crate can open and writes 8-bit RGB levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateCodec;

impl ImageCrateCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for ImageCrateCodec {
    fn probe(&self, path: &Path) -> Result<(usize, usize)> {
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| TextureError::decode(path, e.to_string()))?;
        Ok((width as usize, height as usize))
    }

    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        let img = image::open(path).map_err(|e| TextureError::decode(path, e.to_string()))?;
        let decoded = to_decoded(&img).map_err(|e| TextureError::decode(path, e.to_string()))?;
        debug!(
            path = %path.display(),
            width = decoded.width,
            height = decoded.height,
            layout = ?decoded.layout,
            "Decoded image"
        );
        Ok(decoded)
    }

    fn encode(&self, grid: &PixelGrid, path: &Path) -> Result<()> {
        let format = ImageFormat::from_path(path)
            .map_err(|e| TextureError::encode(path, e.to_string()))?;

        let bytes: Vec<u8> = grid.as_floats().iter().map(|v| quantize(*v)).collect();
        let img = RgbImage::from_raw(grid.width() as u32, grid.height() as u32, bytes)
            .ok_or_else(|| TextureError::encode(path, "pixel buffer does not match dimensions"))?;

        img.save_with_format(path, format)
            .map_err(|e| TextureError::encode(path, e.to_string()))
    }
}

fn layout_of(color: ColorType) -> ChannelLayout {
    match color {
        ColorType::L8 | ColorType::L16 => ChannelLayout::Gray,
        ColorType::La8 | ColorType::La16 => ChannelLayout::GrayAlpha,
        ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => ChannelLayout::Rgba,
        _ => ChannelLayout::Rgb,
    }
}

fn to_decoded(img: &DynamicImage) -> Result<DecodedImage> {
    let layout = layout_of(img.color());
    let rgb = img.to_rgb32f();
    let (width, height) = rgb.dimensions();
    let pixels = rgb
        .pixels()
        .map(|p| Rgb::new(p.0[0], p.0[1], p.0[2]))
        .collect();

    DecodedImage::new(width as usize, height as usize, layout, pixels)
}

/// Clamp to `[0, 1]` and round to 8 bits.
#[inline]
fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
