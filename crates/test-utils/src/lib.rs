//! Shared test utilities for the roughness workspace.
//!
//! This crate provides common testing infrastructure including:
//! - An in-memory [`ImageCodec`](texture_common::ImageCodec) that counts decodes
//! - Synthetic bump, displacement and normal map generators
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, flat_height_map, MemoryCodec};
//! ```

pub mod codec;
pub mod generators;

// Re-export commonly used items at the crate root
pub use codec::MemoryCodec;
pub use generators::*;

/// Create a scratch directory that is removed when dropped.
pub fn scratch_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("roughness-test-")
        .tempdir()
        .unwrap_or_else(|e| panic!("failed to create scratch dir: {}", e))
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for relative float equality; `$tolerance` is a fraction of the
/// larger magnitude, with an absolute floor of the same size near zero.
#[macro_export]
macro_rules! assert_rel_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let tolerance: f64 = $tolerance as f64;
        let scale = left.abs().max(right.abs()).max(1.0);
        let diff = (left - right).abs();
        if diff > tolerance * scale {
            panic!(
                "assertion failed: `(left ≈ right)` (relative)\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > {:?} * {:?}",
                left, right, diff, tolerance, scale
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_rel_eq_scales_with_magnitude() {
        assert_rel_eq!(1000.0, 1000.005, 1e-5);
        assert_rel_eq!(0.0, 0.000001, 1e-5);
    }

    #[test]
    #[should_panic(expected = "relative")]
    fn test_assert_rel_eq_fails() {
        assert_rel_eq!(1000.0, 1001.0, 1e-5);
    }

    #[test]
    fn test_scratch_dir_exists() {
        let dir = scratch_dir();
        assert!(dir.path().is_dir());
    }
}
