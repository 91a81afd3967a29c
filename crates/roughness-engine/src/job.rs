//! Roughness jobs: the maps, the base roughness and the output shape.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use mip_pyramid::MipPyramid;
use serde::{Deserialize, Deserializer, Serialize};
use texture_common::{ImageCodec, Result, TextureError};
use tracing::debug;

use crate::slope::SlopeParams;
use crate::types::{MapKind, Renderer};

/// Base roughness as written by a user: a number or an image path.
///
/// Strings go through [`FromStr`], so a quoted `"0.5"` in a job file is a
/// constant like a bare `0.5`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BaseRoughness {
    Constant(f32),
    Image(PathBuf),
}

impl Default for BaseRoughness {
    fn default() -> Self {
        BaseRoughness::Constant(0.0)
    }
}

impl FromStr for BaseRoughness {
    type Err = String;

    /// Anything that parses as a number is a constant, everything else a path.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("base roughness must be a number or an image path".to_string());
        }
        match s.parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(BaseRoughness::Constant(v)),
            Ok(_) => Err(format!("base roughness '{}' is not finite", s)),
            Err(_) => Ok(BaseRoughness::Image(PathBuf::from(s))),
        }
    }
}

impl<'de> Deserialize<'de> for BaseRoughness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) if v.is_finite() => Ok(BaseRoughness::Constant(v)),
            Raw::Number(v) => Err(serde::de::Error::custom(format!(
                "base roughness {} is not finite",
                v
            ))),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl fmt::Display for BaseRoughness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseRoughness::Constant(v) => write!(f, "{}", v),
            BaseRoughness::Image(path) => write!(f, "{}", path.display()),
        }
    }
}

/// An input map before it is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSource {
    pub path: PathBuf,
    #[serde(default = "default_strength")]
    pub strength: f32,
    #[serde(default)]
    pub kind: MapKind,
}

fn default_strength() -> f32 {
    1.0
}

impl MapSource {
    pub fn new(path: impl Into<PathBuf>, strength: f32, kind: MapKind) -> Self {
        Self {
            path: path.into(),
            strength,
            kind,
        }
    }
}

/// An opened input map.
#[derive(Debug)]
pub struct MapDescriptor {
    pub pyramid: MipPyramid,
    pub strength: f32,
    pub kind: MapKind,
}

impl MapDescriptor {
    pub fn open(source: &MapSource, codec: Arc<dyn ImageCodec>) -> Result<Self> {
        if !source.strength.is_finite() {
            return Err(TextureError::configuration(format!(
                "strength of {} is not finite",
                source.path.display()
            )));
        }
        Ok(Self {
            pyramid: MipPyramid::open(&source.path, codec)?,
            strength: source.strength,
            kind: source.kind,
        })
    }
}

/// Base roughness with any image opened.
#[derive(Debug)]
pub enum BaseSpec {
    Constant(f32),
    Pyramid(MipPyramid),
}

impl BaseSpec {
    pub fn open(base: &BaseRoughness, codec: Arc<dyn ImageCodec>) -> Result<Self> {
        match base {
            BaseRoughness::Constant(v) if v.is_finite() => Ok(BaseSpec::Constant(*v)),
            BaseRoughness::Constant(v) => Err(TextureError::configuration(format!(
                "base roughness {} is not finite",
                v
            ))),
            BaseRoughness::Image(path) => Ok(BaseSpec::Pyramid(MipPyramid::open(path, codec)?)),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, BaseSpec::Constant(_))
    }
}

/// Validated inputs for one roughness pyramid.
///
/// All pyramids share one resolution and level count; construction fails
/// otherwise, before anything is decoded.
#[derive(Debug)]
pub struct RoughnessJob {
    maps: Vec<MapDescriptor>,
    base: BaseSpec,
    unit_size: f32,
    renderer: Renderer,
    resolution: usize,
    level_count: usize,
}

impl RoughnessJob {
    pub fn new(
        maps: Vec<MapDescriptor>,
        base: BaseSpec,
        unit_size: f32,
        renderer: Renderer,
    ) -> Result<Self> {
        if maps.is_empty() {
            return Err(TextureError::configuration("at least one input map is required"));
        }
        if !(unit_size.is_finite() && unit_size > 0.0) {
            return Err(TextureError::configuration(format!(
                "unit size must be positive, got {}",
                unit_size
            )));
        }

        // The base image sets the shape when there is one, otherwise the first map.
        let reference = match &base {
            BaseSpec::Pyramid(p) => p,
            BaseSpec::Constant(_) => &maps[0].pyramid,
        };
        let resolution = reference.resolution();
        let level_count = reference.level_count();

        for (index, map) in maps.iter().enumerate() {
            let p = &map.pyramid;
            if p.resolution() != resolution || p.level_count() != level_count {
                return Err(TextureError::configuration(format!(
                    "map {} ({}) is {}x{} with {} levels, expected {}x{} with {} levels",
                    index,
                    p.source().display(),
                    p.resolution(),
                    p.resolution(),
                    p.level_count(),
                    resolution,
                    resolution,
                    level_count
                )));
            }
        }

        debug!(
            maps = maps.len(),
            resolution,
            level_count,
            renderer = %renderer,
            constant_base = base.is_constant(),
            "Roughness job validated"
        );

        Ok(Self {
            maps,
            base,
            unit_size,
            renderer,
            resolution,
            level_count,
        })
    }

    /// Open every map and the base, then validate.
    pub fn open(
        sources: &[MapSource],
        base: &BaseRoughness,
        unit_size: f32,
        renderer: Renderer,
        codec: Arc<dyn ImageCodec>,
    ) -> Result<Self> {
        let maps = sources
            .iter()
            .map(|s| MapDescriptor::open(s, codec.clone()))
            .collect::<Result<Vec<_>>>()?;
        let base = BaseSpec::open(base, codec)?;
        Self::new(maps, base, unit_size, renderer)
    }

    pub fn maps(&self) -> &[MapDescriptor] {
        &self.maps
    }

    pub fn base(&self) -> &BaseSpec {
        &self.base
    }

    pub fn unit_size(&self) -> f32 {
        self.unit_size
    }

    pub fn renderer(&self) -> Renderer {
        self.renderer
    }

    /// Side length of output level 0.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn level_count(&self) -> usize {
        self.level_count
    }

    /// Slope parameters of map `index`.
    pub fn slope_params(&self, index: usize) -> SlopeParams {
        let map = &self.maps[index];
        SlopeParams {
            kind: map.kind,
            strength: map.strength,
            unit_size: self.unit_size,
            renderer: self.renderer,
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<MapDescriptor>, BaseSpec) {
        (self.maps, self.base)
    }
}
