//! File input and output for roughness textures.
//!
//! - [`ImageCrateCodec`]: reads source maps and writes 8-bit levels with the
//!   `image` crate
//! - [`LevelWriter`]: writes every level of a pyramid to its own file
//! - [`TextureCompiler`]: bakes written levels into a `.tx`/`.tex` with
//!   maketx or txmake

pub mod codec;
pub mod compiler;
pub mod writer;

pub use codec::ImageCrateCodec;
pub use compiler::{CompilerFlavor, TextureCompiler};
pub use writer::{level_path, LevelWriter, DEFAULT_LEVEL_FORMAT};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a finished pyramid turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// A compiled texture; level files are temporary.
    #[default]
    Texture,
    /// Only the level files, kept on disk.
    IndividualLevels,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "texture" | "tx" | "tex" => Ok(OutputMode::Texture),
            "individual_levels" | "levels" => Ok(OutputMode::IndividualLevels),
            other => Err(format!(
                "unknown output mode '{}', expected texture or individual-levels",
                other
            )),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Texture => write!(f, "texture"),
            OutputMode::IndividualLevels => write!(f, "individual-levels"),
        }
    }
}
