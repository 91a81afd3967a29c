//! Job configuration: YAML job files merged with command-line flags.
//!
//! A job file looks like:
//!
//! ```yaml
//! unit_size: 2.0
//! renderer: arnold
//! mode: texture
//! maps:
//!   - { path: textures/bump.png, strength: 0.5, kind: bump }
//!   - { path: textures/normal.png, kind: normal }
//! outputs:
//!   - { name: specular, path: out/spec_rough.tx, base: 0.3 }
//!   - { name: diffuse, path: out/diff_rough.tx, base: textures/diff_rough.png }
//! ```
//!
//! Relative paths are resolved against the job file's directory.
//! `${VAR}` and `${VAR:-default}` are replaced from the environment.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use roughness_engine::{BaseRoughness, MapKind, MapSource, Renderer, RoughnessOutput};
use serde::{Deserialize, Serialize};
use texture_io::{OutputMode, DEFAULT_LEVEL_FORMAT};

/// Contents of a job file. Every field may be overridden on the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    pub unit_size: Option<f32>,
    pub renderer: Option<Renderer>,
    pub mode: Option<OutputMode>,
    pub compiler: Option<PathBuf>,
    pub level_format: Option<String>,
    #[serde(default)]
    pub maps: Vec<MapSource>,
    #[serde(default)]
    pub outputs: Vec<RoughnessOutput>,
}

impl JobFile {
    /// Make relative paths relative to `dir`.
    fn rebase(mut self, dir: &Path) -> Self {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };
        for map in &mut self.maps {
            join(&mut map.path);
        }
        for out in &mut self.outputs {
            join(&mut out.path);
            if let BaseRoughness::Image(p) = &mut out.base {
                join(p);
            }
        }
        if let Some(compiler) = &mut self.compiler {
            // Bare names are looked up on PATH.
            if compiler.components().count() > 1 {
                join(compiler);
            }
        }
        self
    }
}

/// Load and parse a job file.
pub fn load_job_file<P: AsRef<Path>>(path: P) -> Result<JobFile> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {:?}", path))?;
    let expanded = expand_env_vars(&content)?;
    let job: JobFile = serde_yaml::from_str(&expanded)
        .with_context(|| format!("Failed to parse job file {:?}", path))?;

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(job.rebase(dir))
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct JobOverrides {
    pub maps: Vec<MapSource>,
    pub outputs: Vec<RoughnessOutput>,
    pub unit_size: Option<f32>,
    pub renderer: Option<Renderer>,
    pub mode: Option<OutputMode>,
    pub compiler: Option<PathBuf>,
    pub level_format: Option<String>,
}

/// A complete, validated job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSettings {
    pub maps: Vec<MapSource>,
    pub outputs: Vec<RoughnessOutput>,
    pub unit_size: f32,
    pub renderer: Renderer,
    pub mode: OutputMode,
    pub compiler: Option<PathBuf>,
    pub level_format: String,
}

/// Merge `file` and `overrides`, command line first, and validate.
///
/// Maps and outputs given on the command line replace the file's lists
/// instead of extending them.
pub fn resolve(file: Option<JobFile>, overrides: JobOverrides) -> Result<JobSettings> {
    let file = file.unwrap_or_default();

    let settings = JobSettings {
        maps: if overrides.maps.is_empty() { file.maps } else { overrides.maps },
        outputs: if overrides.outputs.is_empty() { file.outputs } else { overrides.outputs },
        unit_size: overrides.unit_size.or(file.unit_size).unwrap_or(1.0),
        renderer: overrides.renderer.or(file.renderer).unwrap_or_default(),
        mode: overrides.mode.or(file.mode).unwrap_or_default(),
        compiler: overrides.compiler.or(file.compiler),
        level_format: overrides
            .level_format
            .or(file.level_format)
            .unwrap_or_else(|| DEFAULT_LEVEL_FORMAT.to_string()),
    };
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &JobSettings) -> Result<()> {
    anyhow::ensure!(!settings.maps.is_empty(), "At least one input map is required (--map or maps:)");
    anyhow::ensure!(!settings.outputs.is_empty(), "At least one output is required (--output or outputs:)");
    anyhow::ensure!(
        settings.unit_size.is_finite() && settings.unit_size > 0.0,
        "Unit size must be positive, got {}",
        settings.unit_size
    );

    let mut names = HashSet::new();
    let mut paths = HashSet::new();
    for out in &settings.outputs {
        anyhow::ensure!(!out.name.is_empty(), "Output names cannot be empty");
        anyhow::ensure!(names.insert(&out.name), "Duplicate output name: {}", out.name);
        anyhow::ensure!(paths.insert(&out.path), "Duplicate output path: {:?}", out.path);
    }
    Ok(())
}

/// Parse `PATH[:STRENGTH[:KIND]]`.
///
/// Suffixes are only split off when they parse, so paths containing
/// colons (drive letters) are kept whole.
pub fn parse_map_arg(s: &str) -> std::result::Result<MapSource, String> {
    let mut path = s;
    let mut strength = 1.0f32;
    let mut kind = MapKind::Bump;

    if let Some((head, tail)) = path.rsplit_once(':') {
        if let Ok(k) = tail.parse::<MapKind>() {
            kind = k;
            path = head;
        }
    }
    if let Some((head, tail)) = path.rsplit_once(':') {
        if let Ok(v) = tail.parse::<f32>() {
            strength = v;
            path = head;
        }
    }

    if path.is_empty() {
        return Err(format!("map '{}' has no path", s));
    }
    if !strength.is_finite() {
        return Err(format!("map '{}' has a non-finite strength", s));
    }
    Ok(MapSource::new(path, strength, kind))
}

/// Parse `NAME=PATH[=BASE]`, where `BASE` is a number or an image path
/// and defaults to 0.
pub fn parse_output_arg(s: &str) -> std::result::Result<RoughnessOutput, String> {
    let mut parts = s.splitn(3, '=');
    let name = parts.next().unwrap_or_default().trim();
    let path = parts.next().unwrap_or_default().trim();
    if name.is_empty() || path.is_empty() {
        return Err(format!("output '{}' must look like NAME=PATH[=BASE]", s));
    }
    let base = match parts.next() {
        Some(b) => b.parse::<BaseRoughness>()?,
        None => BaseRoughness::default(),
    };
    Ok(RoughnessOutput {
        name: name.to_string(),
        path: PathBuf::from(path),
        base,
    })
}

/// Replace `${VAR}` and `${VAR:-default}` with environment values.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", expr),
                }
            }
            result.push_str(&resolve_var_expr(&expr)?);
        } else {
            result.push(ch);
        }
    }
    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((name, default)) = expr.split_once(":-") {
        match std::env::var(name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}
