//! 2x2 box downsampling for generating pyramid levels.
//!
//! Each output texel is the mean of the four texels it covers in the
//! previous level. Reads go through the grid's toroidal addressing, so odd
//! sizes wrap instead of dropping the last row or column.

use texture_common::{PixelGrid, Result, Rgb, TextureError};

/// Downsample a grid by a factor of 2 on each axis.
///
/// Output size is `(width / 2, height / 2)`; both must be at least 1.
pub fn downsample_2x(src: &PixelGrid) -> Result<PixelGrid> {
    let new_width = src.width() / 2;
    let new_height = src.height() / 2;

    if new_width == 0 || new_height == 0 {
        return Err(TextureError::configuration(format!(
            "cannot downsample a {}x{} level",
            src.width(),
            src.height()
        )));
    }

    let mut out = PixelGrid::new(new_width, new_height)?;

    for y in 0..new_height as isize {
        for x in 0..new_width as isize {
            let c00 = src.get(x * 2, y * 2);
            let c10 = src.get(x * 2 + 1, y * 2);
            let c01 = src.get(x * 2, y * 2 + 1);
            let c11 = src.get(x * 2 + 1, y * 2 + 1);
            out.set(x, y, Rgb::mean4(c00, c10, c01, c11));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> PixelGrid {
        let data: Vec<f32> = (0..width * height)
            .flat_map(|i| {
                let v = (i + 1) as f32;
                [v, v * 2.0, v * 3.0]
            })
            .collect();
        PixelGrid::from_floats(width, height, data).unwrap()
    }

    #[test]
    fn test_downsample_2x_mean() {
        // 4x4 grid with red values 1-16
        let src = ramp(4, 4);
        let out = downsample_2x(&src).unwrap();

        assert_eq!(out.width(), 2);
        assert_eq!(out.height(), 2);

        // Top-left 2x2 block: 1,2,5,6 -> mean = 3.5
        assert!((out.get(0, 0).r - 3.5).abs() < 1e-6);
        // Top-right 2x2 block: 3,4,7,8 -> mean = 5.5
        assert!((out.get(1, 0).r - 5.5).abs() < 1e-6);
        // Other channels averaged independently
        assert!((out.get(0, 0).g - 7.0).abs() < 1e-6);
        // Bottom-right block: 11,12,15,16 -> 13.5, blue = 3x
        assert!((out.get(1, 1).b - 40.5).abs() < 1e-6);
    }

    #[test]
    fn test_downsample_wraps_odd_width() {
        // 3x2: the second output column would read x = 2 and x = 3 (wrapped to 0)
        let src = ramp(3, 2);
        let out = downsample_2x(&src).unwrap();
        assert_eq!(out.width(), 1);
        assert_eq!(out.height(), 1);
        // 1,2,4,5 -> 3
        assert!((out.get(0, 0).r - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_downsample_single_texel_fails() {
        let src = PixelGrid::new(1, 1).unwrap();
        assert!(downsample_2x(&src).is_err());
    }
}
