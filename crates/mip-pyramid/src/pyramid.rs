//! File-backed mip pyramid with decode-on-demand.

use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use texture_common::{ImageCodec, Result, TextureError};
use tracing::{debug, info};

use crate::levels::{level_count_for, target_resolution, MipLevels};
use crate::resample::resample_to_square;

enum PyramidState {
    Unrealized,
    Realized(MipLevels),
}

/// Mip pyramid for one source image.
///
/// Opening only probes the source for its dimensions. Level buffers exist
/// only while the pyramid is realized; [`scoped`](Self::scoped) ties that
/// window to a guard so at most one input pyramid is resident at a time.
pub struct MipPyramid {
    source: PathBuf,
    codec: Arc<dyn ImageCodec>,
    source_width: usize,
    source_height: usize,
    resolution: usize,
    level_count: usize,
    state: PyramidState,
}

impl MipPyramid {
    /// Probe `source` and compute the target resolution and level count.
    ///
    /// Sources too small to produce a single mip level (1x1) are rejected.
    pub fn open(source: impl Into<PathBuf>, codec: Arc<dyn ImageCodec>) -> Result<Self> {
        let source = source.into();
        let (source_width, source_height) = codec.probe(&source)?;

        let resolution = target_resolution(source_width, source_height).ok_or_else(|| {
            TextureError::decode(&source, "image has no pixels")
        })?;
        let level_count = level_count_for(resolution);
        if level_count == 0 {
            return Err(TextureError::configuration(format!(
                "{} is {}x{}, at least 2x2 is needed to build mip levels",
                source.display(),
                source_width,
                source_height
            )));
        }

        debug!(
            path = %source.display(),
            source_width,
            source_height,
            resolution,
            level_count,
            "Opened mip pyramid source"
        );

        Ok(Self {
            source,
            codec,
            source_width,
            source_height,
            resolution,
            level_count,
            state: PyramidState::Unrealized,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Native `(width, height)` of the source image.
    pub fn source_dimensions(&self) -> (usize, usize) {
        (self.source_width, self.source_height)
    }

    /// Side length of level 0.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn level_count(&self) -> usize {
        self.level_count
    }

    pub fn is_realized(&self) -> bool {
        matches!(self.state, PyramidState::Realized(_))
    }

    /// Level buffers, if realized.
    pub fn levels(&self) -> Option<&MipLevels> {
        match &self.state {
            PyramidState::Realized(levels) => Some(levels),
            PyramidState::Unrealized => None,
        }
    }

    /// Decode and build every level. A no-op when already realized.
    pub fn realize(&mut self) -> Result<()> {
        if self.is_realized() {
            return Ok(());
        }
        let levels = self.decode_levels()?;
        self.state = PyramidState::Realized(levels);
        Ok(())
    }

    /// Discard all level buffers. A later realize decodes again.
    pub fn release(&mut self) {
        if self.is_realized() {
            debug!(path = %self.source.display(), "Released mip pyramid");
        }
        self.state = PyramidState::Unrealized;
    }

    /// Realize for the lifetime of the returned guard.
    ///
    /// The guard owns the level buffers and frees them when dropped, leaving
    /// the pyramid unrealized. Levels realized earlier are handed over
    /// without decoding again.
    pub fn scoped(&mut self) -> Result<RealizedPyramid<'_>> {
        let levels = match std::mem::replace(&mut self.state, PyramidState::Unrealized) {
            PyramidState::Realized(levels) => levels,
            PyramidState::Unrealized => self.decode_levels()?,
        };
        Ok(RealizedPyramid {
            levels,
            pyramid: self,
        })
    }

    fn decode_levels(&self) -> Result<MipLevels> {
        let start = Instant::now();
        let image = self.codec.decode(&self.source)?;

        if image.width != self.source_width || image.height != self.source_height {
            return Err(TextureError::decode(
                &self.source,
                format!(
                    "image changed since it was opened: {}x{} now, {}x{} before",
                    image.width, image.height, self.source_width, self.source_height
                ),
            ));
        }

        let base = resample_to_square(&image, self.resolution)?;
        let levels = MipLevels::from_base(base, self.level_count)?;

        info!(
            path = %self.source.display(),
            resolution = self.resolution,
            levels = self.level_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Realized mip pyramid"
        );
        Ok(levels)
    }
}

impl fmt::Debug for MipPyramid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MipPyramid")
            .field("source", &self.source)
            .field("resolution", &self.resolution)
            .field("level_count", &self.level_count)
            .field("realized", &self.is_realized())
            .finish_non_exhaustive()
    }
}

/// Realized levels of a [`MipPyramid`], freed on drop.
pub struct RealizedPyramid<'a> {
    levels: MipLevels,
    pyramid: &'a mut MipPyramid,
}

impl RealizedPyramid<'_> {
    pub fn levels(&self) -> &MipLevels {
        &self.levels
    }

    pub fn source(&self) -> &Path {
        self.pyramid.source()
    }
}

impl Deref for RealizedPyramid<'_> {
    type Target = MipLevels;

    fn deref(&self) -> &MipLevels {
        &self.levels
    }
}

impl Drop for RealizedPyramid<'_> {
    fn drop(&mut self) {
        debug!(path = %self.pyramid.source.display(), "Released mip pyramid");
    }
}
