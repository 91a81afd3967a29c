//! Target renderer conventions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Renderer the roughness texture is made for.
///
/// Arnold clamps slopes to `[-1, 1]`; RenderMan leaves them unbounded and
/// attenuates bump slopes instead. The compiled texture flavor follows the
/// same choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    #[default]
    Arnold,
    RenderMan,
}

impl Renderer {
    /// Whether slopes are clamped to `[-1, 1]`.
    pub fn clamps_slopes(&self) -> bool {
        matches!(self, Renderer::Arnold)
    }
}

impl FromStr for Renderer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arnold" => Ok(Renderer::Arnold),
            "renderman" | "prman" => Ok(Renderer::RenderMan),
            other => Err(format!(
                "unknown renderer '{}', expected arnold or renderman",
                other
            )),
        }
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Renderer::Arnold => write!(f, "arnold"),
            Renderer::RenderMan => write!(f, "renderman"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Arnold".parse::<Renderer>().unwrap(), Renderer::Arnold);
        assert_eq!("RENDERMAN".parse::<Renderer>().unwrap(), Renderer::RenderMan);
        assert_eq!("prman".parse::<Renderer>().unwrap(), Renderer::RenderMan);
        assert!("cycles".parse::<Renderer>().is_err());
    }

    #[test]
    fn test_only_arnold_clamps() {
        assert!(Renderer::Arnold.clamps_slopes());
        assert!(!Renderer::RenderMan.clamps_slopes());
    }
}
