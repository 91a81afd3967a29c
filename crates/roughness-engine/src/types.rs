//! Map kinds and the per-renderer slope rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use texture_common::Renderer;

/// Divisor RenderMan applies to bump slopes relative to Arnold.
pub const RENDERMAN_BUMP_ATTENUATION: f32 = 20.0;

/// What an input map encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapKind {
    /// Height in the red channel, shading only.
    #[default]
    Bump,
    /// Height in the red channel, moves geometry.
    Displacement,
    /// Tangent-space normal encoded as `(n + 1) / 2`.
    Normal,
}

impl FromStr for MapKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bump" | "height" => Ok(MapKind::Bump),
            "displacement" | "disp" => Ok(MapKind::Displacement),
            "normal" => Ok(MapKind::Normal),
            other => Err(format!(
                "unknown map kind '{}', expected bump, displacement or normal",
                other
            )),
        }
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKind::Bump => write!(f, "bump"),
            MapKind::Displacement => write!(f, "displacement"),
            MapKind::Normal => write!(f, "normal"),
        }
    }
}

/// Where a slope comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeSource {
    /// Forward differences of the red channel over one texel.
    HeightDifference,
    /// `(nx / nz, ny / nz)` of the decoded normal.
    TangentNormal,
}

/// How one (map kind, renderer) pair turns texels into slopes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeRule {
    pub source: SlopeSource,
    /// Clamp each component to `[-1, 1]`.
    pub clamp: bool,
    /// Divide each component by this after scaling.
    pub attenuation: f32,
}

/// The full rule table.
pub const fn slope_rule(kind: MapKind, renderer: Renderer) -> SlopeRule {
    match (kind, renderer) {
        (MapKind::Normal, Renderer::Arnold) => SlopeRule {
            source: SlopeSource::TangentNormal,
            clamp: true,
            attenuation: 1.0,
        },
        (MapKind::Normal, Renderer::RenderMan) => SlopeRule {
            source: SlopeSource::TangentNormal,
            clamp: false,
            attenuation: 1.0,
        },
        (MapKind::Bump, Renderer::Arnold) => SlopeRule {
            source: SlopeSource::HeightDifference,
            clamp: true,
            attenuation: 1.0,
        },
        (MapKind::Bump, Renderer::RenderMan) => SlopeRule {
            source: SlopeSource::HeightDifference,
            clamp: false,
            attenuation: RENDERMAN_BUMP_ATTENUATION,
        },
        (MapKind::Displacement, _) => SlopeRule {
            source: SlopeSource::HeightDifference,
            clamp: false,
            attenuation: 1.0,
        },
    }
}
