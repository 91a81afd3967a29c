//! Error types for roughness generation.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while building a roughness pyramid.
///
/// Every variant is fatal to the current job. Nothing is retried.
#[derive(Error, Debug)]
pub enum TextureError {
    /// Inputs disagree with each other or with the output target.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The codec could not read a source image.
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// The codec could not write an output level.
    #[error("failed to encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },

    /// The texture compiler could not be started or exited non-zero.
    #[error("{program} failed (exit code {code:?}): {stderr}")]
    ExternalTool {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Filesystem error outside of the codec.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The run was cancelled through its [`CancellationToken`](crate::CancellationToken).
    #[error("operation cancelled")]
    Cancelled,
}

impl TextureError {
    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a Decode error for `path`.
    pub fn decode(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        Self::Decode {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Create an Encode error for `path`.
    pub fn encode(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        Self::Encode {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Create an ExternalTool error.
    pub fn external_tool(
        program: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::ExternalTool {
            program: program.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Whether this error was caused by cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for roughness operations.
pub type Result<T> = std::result::Result<T, TextureError>;
