//! Engine configuration.

use serde::{Deserialize, Serialize};
use texture_common::{Result, TextureError};

/// Progress fraction reported when writing starts.
pub const WRITE_CHECKPOINT: f64 = 0.70;

/// Tunables that are not part of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Level worker threads; one per CPU when unset.
    pub threads: Option<usize>,

    /// Progress fraction at which map accumulation starts.
    pub progress_band_start: f64,

    /// Progress fraction at which map accumulation ends.
    pub progress_band_end: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: None,
            progress_band_start: 0.05,
            progress_band_end: 0.65,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ROUGHNESS_THREADS") {
            if let Ok(n) = val.parse() {
                config.threads = Some(n);
            }
        }

        if let Ok(val) = std::env::var("ROUGHNESS_PROGRESS_START") {
            if let Ok(v) = val.parse() {
                config.progress_band_start = v;
            }
        }

        if let Ok(val) = std::env::var("ROUGHNESS_PROGRESS_END") {
            if let Ok(v) = val.parse() {
                config.progress_band_end = v;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(TextureError::configuration("threads must be > 0"));
        }

        let (start, end) = (self.progress_band_start, self.progress_band_end);
        if !(0.0..=WRITE_CHECKPOINT).contains(&start) || !(0.0..=WRITE_CHECKPOINT).contains(&end) {
            return Err(TextureError::configuration(format!(
                "progress band must lie within 0..={}",
                WRITE_CHECKPOINT
            )));
        }
        if start >= end {
            return Err(TextureError::configuration(format!(
                "progress band start {} must be below end {}",
                start, end
            )));
        }

        Ok(())
    }

    /// Share of overall progress spent accumulating maps.
    pub fn band_width(&self) -> f64 {
        self.progress_band_end - self.progress_band_start
    }
}
