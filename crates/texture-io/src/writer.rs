//! Writing mip levels to individual image files.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use mip_pyramid::MipLevels;
use texture_common::{ImageCodec, LevelExecutor, Result, TextureError};
use tracing::{debug, info};

/// Extension used for level files when none is configured.
pub const DEFAULT_LEVEL_FORMAT: &str = "png";

/// File for `level` of a `level_count` pyramid written next to `output`.
///
/// The suffix is appended to the full output path, so `rough.tx` becomes
/// `rough.tx_0.png`, `rough.tx_1.png`, and so on. A single-level pyramid is
/// written to `rough.tx.png`.
pub fn level_path(output: &Path, level: usize, level_count: usize, extension: &str) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    if level_count == 1 {
        name.push(format!(".{}", extension));
    } else {
        name.push(format!("_{}.{}", level, extension));
    }
    PathBuf::from(name)
}

/// Encodes each level of a pyramid through an [`ImageCodec`], in parallel.
pub struct LevelWriter {
    codec: Arc<dyn ImageCodec>,
    extension: String,
}

impl LevelWriter {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            codec,
            extension: DEFAULT_LEVEL_FORMAT.to_string(),
        }
    }

    /// Use `extension` (without the dot) for level files.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Result<Self> {
        let extension = extension.into();
        let extension = extension.trim_start_matches('.').to_string();
        if extension.is_empty() {
            return Err(TextureError::configuration("level format must not be empty"));
        }
        self.extension = extension;
        Ok(self)
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Paths [`write`](Self::write) would produce, in level order.
    pub fn level_paths(&self, output: &Path, level_count: usize) -> Vec<PathBuf> {
        (0..level_count)
            .map(|level| level_path(output, level, level_count, &self.extension))
            .collect()
    }

    /// Write every level and return the file paths in level order.
    ///
    /// On failure, files already written by this call are removed before the
    /// error is returned.
    pub fn write(
        &self,
        levels: &MipLevels,
        output: &Path,
        executor: &LevelExecutor,
    ) -> Result<Vec<PathBuf>> {
        let start = Instant::now();
        let paths = self.level_paths(output, levels.len());

        let written = executor.map_levels(levels.len(), |level| {
            let path = &paths[level];
            debug!(level, path = %path.display(), "Writing mip level");
            match self.codec.encode(&levels[level], path) {
                Ok(()) => Ok(Ok(())),
                // Keep going so every successful file is known for cleanup.
                Err(e) => Ok(Err(e)),
            }
        })?;

        let mut first_error = None;
        for result in written {
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }
        if let Some(e) = first_error {
            remove_files(&paths);
            return Err(e);
        }

        info!(
            output = %output.display(),
            levels = levels.len(),
            format = %self.extension,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Wrote mip level files"
        );
        Ok(paths)
    }
}

impl std::fmt::Debug for LevelWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelWriter")
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

/// Best-effort removal; missing files are ignored.
pub(crate) fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Removed level file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove level file"),
        }
    }
}
