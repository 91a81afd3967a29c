//! Synthetic source images.
//!
//! Every generator returns a [`DecodedImage`] with channel values in `[0, 1]`,
//! the same shape a real codec would produce. Height maps store the height in
//! all three channels; normal maps store `(n + 1) / 2` per component.

use texture_common::{ChannelLayout, DecodedImage, Rgb};

/// Build an RGB image from a per-pixel function of `(x, y)`.
pub fn image_from_fn(
    width: usize,
    height: usize,
    layout: ChannelLayout,
    f: impl Fn(usize, usize) -> Rgb,
) -> DecodedImage {
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            pixels.push(f(x, y));
        }
    }
    DecodedImage {
        width,
        height,
        layout,
        pixels,
    }
}

/// Square RGB height map with every texel at `value`.
pub fn flat_height_map(size: usize, value: f32) -> DecodedImage {
    height_map(size, size, |_, _| value)
}

/// RGB height map with `f(x, y)` in every channel.
pub fn height_map(width: usize, height: usize, f: impl Fn(usize, usize) -> f32) -> DecodedImage {
    image_from_fn(width, height, ChannelLayout::Rgb, |x, y| Rgb::splat(f(x, y)))
}

/// Single-channel height map; values are stored gamma encoded, as an 8-bit
/// grayscale file would hold them.
pub fn gray_height_map(
    width: usize,
    height: usize,
    f: impl Fn(usize, usize) -> f32,
) -> DecodedImage {
    image_from_fn(width, height, ChannelLayout::Gray, |x, y| Rgb::splat(f(x, y)))
}

/// Tangent-space normal map from a per-pixel normal `(nx, ny, nz)`.
///
/// Components are encoded as `(n + 1) / 2` and not normalized, so tests can
/// choose exact slope ratios.
pub fn normal_map(
    width: usize,
    height: usize,
    f: impl Fn(usize, usize) -> (f32, f32, f32),
) -> DecodedImage {
    image_from_fn(width, height, ChannelLayout::Rgb, |x, y| {
        let (nx, ny, nz) = f(x, y);
        Rgb::new((nx + 1.0) * 0.5, (ny + 1.0) * 0.5, (nz + 1.0) * 0.5)
    })
}

/// Normal map facing straight up everywhere.
pub fn flat_normal_map(size: usize) -> DecodedImage {
    normal_map(size, size, |_, _| (0.0, 0.0, 1.0))
}

/// Normal map whose x-slope alternates `+a` / `-a` by column parity.
///
/// The mean over any 2x2 block is zero and every texel deviates by `a`, so
/// the accumulated deviation at each level above 0 is `2 * a * a` per texel.
pub fn alternating_normal_map(size: usize, a: f32) -> DecodedImage {
    normal_map(size, size, |x, _| {
        let nx = if x % 2 == 0 { a } else { -a };
        (nx, 0.0, 1.0)
    })
}

/// Smooth periodic height map made of one sine bump per axis.
pub fn sine_height_map(size: usize, amplitude: f32) -> DecodedImage {
    let tau = std::f32::consts::TAU;
    height_map(size, size, |x, y| {
        let u = x as f32 / size as f32;
        let v = y as f32 / size as f32;
        0.5 + amplitude * 0.25 * ((tau * u).sin() + (tau * v).cos())
    })
}

/// Deterministic pseudo-random height map in `[0, 1)`.
pub fn noise_height_map(size: usize, seed: u32) -> DecodedImage {
    height_map(size, size, |x, y| {
        (simple_hash(x as u32, y as u32, seed) % 10_000) as f32 / 10_000.0
    })
}

/// Simple hash function for deterministic pseudo-random values.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_height_map() {
        let img = flat_height_map(4, 0.25);
        assert_eq!(img.pixels.len(), 16);
        assert!(img.pixels.iter().all(|p| *p == Rgb::splat(0.25)));
        assert!(!img.is_single_channel());
    }

    #[test]
    fn test_normal_map_encoding() {
        let img = normal_map(2, 1, |x, _| if x == 0 { (1.0, -1.0, 0.0) } else { (0.0, 0.0, 1.0) });
        assert_eq!(img.pixels[0], Rgb::new(1.0, 0.0, 0.5));
        assert_eq!(img.pixels[1], Rgb::new(0.5, 0.5, 1.0));
    }

    #[test]
    fn test_alternating_normal_map_columns() {
        let img = alternating_normal_map(4, 0.5);
        assert_eq!(img.pixel(0, 0).r, 0.75);
        assert_eq!(img.pixel(1, 0).r, 0.25);
        assert_eq!(img.pixel(2, 3).r, 0.75);
    }

    #[test]
    fn test_noise_is_deterministic() {
        let a = noise_height_map(8, 7);
        let b = noise_height_map(8, 7);
        let c = noise_height_map(8, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.pixels.iter().all(|p| (0.0..1.0).contains(&p.r)));
    }

    #[test]
    fn test_gray_height_map_layout() {
        let img = gray_height_map(2, 2, |_, _| 0.5);
        assert!(img.is_single_channel());
    }
}
