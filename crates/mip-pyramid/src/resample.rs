//! Resampling a decoded source into the square level-0 grid.

use texture_common::{DecodedImage, PixelGrid, Result, Rgb};

/// Display gamma assumed on single-channel sources.
///
/// Grayscale height maps store a linear quantity but are written with a
/// display gamma; raising each sample to this power undoes it.
pub const GRAYSCALE_GAMMA: f32 = 2.2;

/// Build the level-0 grid of side `resolution` from a decoded image.
///
/// Matching sizes are copied texel by texel. Otherwise each output texel
/// `(i, j)` maps to `u = i / resolution`, `v = j / resolution` and is
/// bilinearly interpolated from the wrapped source neighbourhood.
/// Grayscale sources have their gamma undone per source sample.
pub fn resample_to_square(src: &DecodedImage, resolution: usize) -> Result<PixelGrid> {
    src.validate()?;
    let mut out = PixelGrid::new(resolution, resolution)?;
    let undo_gamma = src.is_single_channel();

    if src.width == resolution && src.height == resolution {
        for j in 0..resolution as isize {
            for i in 0..resolution as isize {
                out.set(i, j, sample(src, i, j, undo_gamma));
            }
        }
        return Ok(out);
    }

    for j in 0..resolution {
        for i in 0..resolution {
            let u = i as f64 / resolution as f64;
            let v = j as f64 / resolution as f64;
            out.set(i as isize, j as isize, bilinear_wrapped(src, u, v, undo_gamma));
        }
    }

    Ok(out)
}

#[inline]
fn sample(src: &DecodedImage, x: isize, y: isize, undo_gamma: bool) -> Rgb {
    let px = src.pixel(x, y);
    if undo_gamma {
        px.map(|c| c.powf(GRAYSCALE_GAMMA))
    } else {
        px
    }
}

/// Bilinear sample at normalized `(u, v)` with wrapped neighbours.
fn bilinear_wrapped(src: &DecodedImage, u: f64, v: f64, undo_gamma: bool) -> Rgb {
    let x = u * src.width as f64;
    let y = v * src.height as f64;

    let x0 = x.floor();
    let x1 = x.ceil();
    let y0 = y.floor();
    let y1 = y.ceil();

    let tx = (x - x0) as f32;
    let ty = (y - y0) as f32;

    let c00 = sample(src, x0 as isize, y0 as isize, undo_gamma);
    let c10 = sample(src, x1 as isize, y0 as isize, undo_gamma);
    let c01 = sample(src, x0 as isize, y1 as isize, undo_gamma);
    let c11 = sample(src, x1 as isize, y1 as isize, undo_gamma);

    c00.lerp(c10, tx).lerp(c01.lerp(c11, tx), ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use texture_common::ChannelLayout;

    fn image(width: usize, height: usize, layout: ChannelLayout, values: &[f32]) -> DecodedImage {
        DecodedImage {
            width,
            height,
            layout,
            pixels: values.iter().map(|&v| Rgb::splat(v)).collect(),
        }
    }

    #[test]
    fn test_malformed_source_rejected() {
        let src = image(0, 2, ChannelLayout::Rgb, &[0.5, 0.5]);
        assert!(matches!(
            resample_to_square(&src, 2),
            Err(texture_common::TextureError::Configuration(_))
        ));
        let src = image(2, 2, ChannelLayout::Rgb, &[0.5, 0.5, 0.5]);
        assert!(resample_to_square(&src, 2).is_err());
    }

    #[test]
    fn test_matching_size_is_a_copy() {
        let src = image(2, 2, ChannelLayout::Rgb, &[0.1, 0.2, 0.3, 0.4]);
        let out = resample_to_square(&src, 2).unwrap();
        assert_eq!(out.get(1, 0), Rgb::splat(0.2));
        assert_eq!(out.get(0, 1), Rgb::splat(0.3));
    }

    #[test]
    fn test_grayscale_gamma_is_undone() {
        let src = image(2, 2, ChannelLayout::Gray, &[0.5, 1.0, 0.0, 0.25]);
        let out = resample_to_square(&src, 2).unwrap();
        assert!((out.get(0, 0).r - 0.5f32.powf(2.2)).abs() < 1e-6);
        assert_eq!(out.get(1, 0).g, 1.0);
        assert_eq!(out.get(0, 1).b, 0.0);
    }

    #[test]
    fn test_rgb_sources_keep_values() {
        let src = image(2, 2, ChannelLayout::Rgba, &[0.5, 0.5, 0.5, 0.5]);
        let out = resample_to_square(&src, 2).unwrap();
        assert_eq!(out.get(0, 0), Rgb::splat(0.5));
    }

    #[test]
    fn test_non_square_source_is_interpolated() {
        // 4x2 source resampled to 4x4: rows 0 and 2 hit source rows exactly,
        // rows 1 and 3 fall halfway between (row 3 wraps back to row 0).
        let src = image(
            4,
            2,
            ChannelLayout::Rgb,
            &[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        );
        let out = resample_to_square(&src, 4).unwrap();
        assert!((out.get(0, 0).r - 0.0).abs() < 1e-6);
        assert!((out.get(0, 1).r - 0.5).abs() < 1e-6);
        assert!((out.get(0, 2).r - 1.0).abs() < 1e-6);
        assert!((out.get(0, 3).r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_downscale_to_smaller_square() {
        // 3x3 source into 2x2: texel (1,1) samples source position (1.5, 1.5)
        let src = image(
            3,
            3,
            ChannelLayout::Rgb,
            &[0.0, 0.0, 0.0, 0.0, 0.4, 0.8, 0.0, 0.8, 0.8],
        );
        let out = resample_to_square(&src, 2).unwrap();
        assert_eq!(out.get(0, 0).r, 0.0);
        // mean of 0.4, 0.8, 0.8, 0.8
        assert!((out.get(1, 1).r - 0.7).abs() < 1e-6);
    }
}
