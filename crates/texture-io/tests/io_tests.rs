//! On-disk tests for the image codec, level writer and compiler invocation.
//!
//! Covers:
//! - Encoding and decoding 8-bit files through the `image` crate
//! - Level file naming and cleanup on failure
//! - Temporary level removal after compiler success and failure

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{GrayImage, Luma};
use mip_pyramid::MipLevels;
use test_utils::{assert_approx_eq, scratch_dir};
use texture_common::{ImageCodec, LevelExecutor, PixelGrid, Renderer, Rgb, TextureError};
use texture_io::{ImageCrateCodec, LevelWriter, TextureCompiler};

// ============================================================================
// Helper functions
// ============================================================================

fn gradient_levels(resolution: usize, count: usize) -> MipLevels {
    let mut base = PixelGrid::new(resolution, resolution).unwrap();
    for y in 0..resolution as isize {
        for x in 0..resolution as isize {
            let v = (x + y) as f32 / (2 * resolution) as f32;
            base.set(x, y, Rgb::new(v, 0.5, 1.0 - v));
        }
    }
    MipLevels::from_base(base, count).unwrap()
}

fn codec() -> Arc<dyn ImageCodec> {
    Arc::new(ImageCrateCodec::new())
}

fn all_exist(paths: &[PathBuf]) -> bool {
    paths.iter().all(|p| p.is_file())
}

fn none_exist(paths: &[PathBuf]) -> bool {
    paths.iter().all(|p| !p.exists())
}

// ============================================================================
// Codec
// ============================================================================

#[test]
fn test_encode_then_decode_png() {
    let dir = scratch_dir();
    let path = dir.path().join("level.png");
    let codec = ImageCrateCodec::new();

    let mut grid = PixelGrid::new(4, 2).unwrap();
    grid.set(0, 0, Rgb::new(1.0, 0.0, 0.5));
    grid.set(3, 1, Rgb::new(2.0, -1.0, 0.25));
    codec.encode(&grid, &path).unwrap();

    assert_eq!(codec.probe(&path).unwrap(), (4, 2));
    let decoded = codec.decode(&path).unwrap();
    assert!(!decoded.is_single_channel());
    assert_approx_eq!(decoded.pixel(0, 0).r, 1.0, 1e-6);
    assert_approx_eq!(decoded.pixel(0, 0).b, 128.0 / 255.0, 1e-6);
    // Out-of-range values are clamped on write.
    assert_approx_eq!(decoded.pixel(3, 1).r, 1.0, 1e-6);
    assert_approx_eq!(decoded.pixel(3, 1).g, 0.0, 1e-6);
}

#[test]
fn test_gray_png_is_single_channel() {
    let dir = scratch_dir();
    let path = dir.path().join("bump.png");
    GrayImage::from_fn(4, 4, |x, _| Luma([(x * 60) as u8])).save(&path).unwrap();

    let decoded = ImageCrateCodec::new().decode(&path).unwrap();
    assert!(decoded.is_single_channel());
    let p = decoded.pixel(2, 0);
    assert_eq!(p.r, p.g);
    assert_approx_eq!(p.r, 120.0 / 255.0, 1e-6);
}

#[test]
fn test_missing_file_is_decode_error() {
    let dir = scratch_dir();
    let codec = ImageCrateCodec::new();
    let err = codec.probe(&dir.path().join("missing.png")).unwrap_err();
    assert!(matches!(err, TextureError::Decode { .. }));
}

#[test]
fn test_unknown_extension_is_encode_error() {
    let dir = scratch_dir();
    let grid = PixelGrid::new(2, 2).unwrap();
    let err = ImageCrateCodec::new()
        .encode(&grid, &dir.path().join("level.nope"))
        .unwrap_err();
    assert!(matches!(err, TextureError::Encode { .. }));
}

// ============================================================================
// Level writer
// ============================================================================

#[test]
fn test_writer_names_levels() {
    let dir = scratch_dir();
    let output = dir.path().join("rough.tx");
    let executor = LevelExecutor::new(Some(2)).unwrap();
    let levels = gradient_levels(8, 3);

    let paths = LevelWriter::new(codec()).write(&levels, &output, &executor).unwrap();

    assert_eq!(
        paths,
        vec![
            dir.path().join("rough.tx_0.png"),
            dir.path().join("rough.tx_1.png"),
            dir.path().join("rough.tx_2.png"),
        ]
    );
    assert!(all_exist(&paths));
    for (i, path) in paths.iter().enumerate() {
        assert_eq!(image::image_dimensions(path).unwrap(), ((8 >> i) as u32, (8 >> i) as u32));
    }
}

#[test]
fn test_writer_removes_partial_output_on_failure() {
    let dir = scratch_dir();
    let output = dir.path().join("rough");
    let executor = LevelExecutor::new(Some(2)).unwrap();
    let writer = LevelWriter::new(codec()).with_extension("nope").unwrap();

    let err = writer.write(&gradient_levels(4, 2), &output, &executor).unwrap_err();
    assert!(matches!(err, TextureError::Encode { .. }));
    assert!(none_exist(&writer.level_paths(&output, 2)));
}

// ============================================================================
// Compiler
// ============================================================================

#[test]
fn test_discover_in_directory() {
    let dir = scratch_dir();
    assert!(TextureCompiler::discover_in(&[dir.path().to_path_buf()]).is_none());

    std::fs::write(dir.path().join("txmake"), b"").unwrap();
    let found = TextureCompiler::discover_in(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(found.program(), dir.path().join("txmake"));
    assert_eq!(found.flavor(), texture_io::CompilerFlavor::Txmake);

    // maketx is preferred when both are present.
    std::fs::write(dir.path().join("maketx"), b"").unwrap();
    let found = TextureCompiler::discover_in(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(found.flavor(), texture_io::CompilerFlavor::Maketx);
}

fn written_levels(dir: &Path) -> Vec<PathBuf> {
    let executor = LevelExecutor::new(Some(1)).unwrap();
    LevelWriter::new(codec())
        .write(&gradient_levels(4, 2), &dir.join("rough.tx"), &executor)
        .unwrap()
}

#[test]
#[cfg(unix)]
fn test_compiler_cleans_up_levels() {
    let dir = scratch_dir();
    let output = dir.path().join("rough.tx");

    // `true` ignores its arguments and exits 0.
    let levels = written_levels(dir.path());
    assert!(all_exist(&levels));
    TextureCompiler::new("true").compile(&levels, &output, Renderer::Arnold).unwrap();
    assert!(none_exist(&levels));

    // `false` exits 1; the level files still go away.
    let levels = written_levels(dir.path());
    let err = TextureCompiler::new("false")
        .compile(&levels, &output, Renderer::Arnold)
        .unwrap_err();
    match err {
        TextureError::ExternalTool { code, .. } => assert_eq!(code, Some(1)),
        other => panic!("expected ExternalTool, got {:?}", other),
    }
    assert!(none_exist(&levels));

    // A program that cannot start has no exit code.
    let levels = written_levels(dir.path());
    let err = TextureCompiler::new(dir.path().join("missing").join("maketx"))
        .compile(&levels, &output, Renderer::RenderMan)
        .unwrap_err();
    assert!(matches!(err, TextureError::ExternalTool { code: None, .. }));
    assert!(none_exist(&levels));
}
