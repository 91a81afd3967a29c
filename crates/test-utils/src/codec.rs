//! In-memory image codec.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use texture_common::{DecodedImage, ImageCodec, PixelGrid, Result, TextureError};

/// Codec backed by hash maps instead of files.
///
/// Sources are registered with [`insert`](Self::insert); encoded levels are
/// kept and can be inspected with [`encoded`](Self::encoded). Every decode is
/// counted so tests can check that realization happens once.
#[derive(Debug, Default)]
pub struct MemoryCodec {
    images: Mutex<HashMap<PathBuf, DecodedImage>>,
    encoded: Mutex<HashMap<PathBuf, PixelGrid>>,
    decodes: AtomicUsize,
}

impl MemoryCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_image(self, path: impl Into<PathBuf>, image: DecodedImage) -> Self {
        self.insert(path, image);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, image: DecodedImage) {
        self.images
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), image);
    }

    /// Total number of `decode` calls that succeeded.
    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }

    /// A grid previously passed to `encode`.
    pub fn encoded(&self, path: impl AsRef<Path>) -> Option<PixelGrid> {
        self.encoded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path.as_ref())
            .cloned()
    }

    /// Every path written so far, sorted.
    pub fn encoded_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .encoded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }
}

impl ImageCodec for MemoryCodec {
    fn probe(&self, path: &Path) -> Result<(usize, usize)> {
        self.images
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .map(|img| (img.width, img.height))
            .ok_or_else(|| TextureError::decode(path, "no such image"))
    }

    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        let image = self
            .images
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
            .ok_or_else(|| TextureError::decode(path, "no such image"))?;
        self.decodes.fetch_add(1, Ordering::SeqCst);
        Ok(image)
    }

    fn encode(&self, grid: &PixelGrid, path: &Path) -> Result<()> {
        self.encoded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_path_buf(), grid.clone());
        Ok(())
    }
}
