//! Invoking maketx (OpenImageIO / Arnold) or txmake (RenderMan).
//!
//! Both tools take the pre-built level files as user mip maps so the
//! roughness levels are used as-is instead of being filtered again. The
//! level files are temporary and are removed whether or not the tool
//! succeeds.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use texture_common::{Renderer, Result, TextureError};
use tracing::{debug, error, info, warn};

use crate::writer::remove_files;

/// Executable names tried by [`TextureCompiler::discover`], in order.
const CANDIDATES: [&str; 4] = ["maketx", "txmake", "maketx.exe", "txmake.exe"];

/// Command-line dialect of a texture compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerFlavor {
    /// OpenImageIO / Arnold `maketx`.
    Maketx,
    /// RenderMan `txmake`.
    Txmake,
}

impl CompilerFlavor {
    /// Any executable whose file name contains `txmake` is RenderMan's.
    pub fn detect(program: &Path) -> Self {
        let is_txmake = program
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase().contains("txmake"))
            .unwrap_or(false);
        if is_txmake {
            CompilerFlavor::Txmake
        } else {
            CompilerFlavor::Maketx
        }
    }
}

/// A texture compiler executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureCompiler {
    program: PathBuf,
    flavor: CompilerFlavor,
}

impl TextureCompiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let flavor = CompilerFlavor::detect(&program);
        Self { program, flavor }
    }

    /// Look for maketx or txmake on `PATH`, then in the working directory.
    pub fn discover() -> Option<Self> {
        let mut dirs: Vec<PathBuf> = env::var_os("PATH")
            .map(|p| env::split_paths(&p).collect())
            .unwrap_or_default();
        if let Ok(cwd) = env::current_dir() {
            dirs.push(cwd);
        }
        Self::discover_in(&dirs)
    }

    /// Look for a compiler in `dirs`. Every directory is searched for a
    /// name before the next name is tried.
    pub fn discover_in(dirs: &[PathBuf]) -> Option<Self> {
        for name in CANDIDATES {
            for dir in dirs {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    debug!(path = %candidate.display(), "Found texture compiler");
                    return Some(Self::new(candidate));
                }
            }
        }
        None
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn flavor(&self) -> CompilerFlavor {
        self.flavor
    }

    /// Arguments for compiling `levels` (level 0 first) into `output`.
    pub fn arguments(&self, levels: &[PathBuf], output: &Path, renderer: Renderer) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        match self.flavor {
            CompilerFlavor::Txmake => {
                args.extend(["-verbose", "-mode", "periodic", "-byte", "-usermipmap"].map(OsString::from));
                args.extend(levels.iter().map(|p| p.as_os_str().to_os_string()));
                args.push(output.as_os_str().to_os_string());
            }
            CompilerFlavor::Maketx => {
                args.extend(["-v", "-wrap", "periodic"].map(OsString::from));
                args.push(OsString::from(match renderer {
                    Renderer::Arnold => "--oiio",
                    Renderer::RenderMan => "--prman",
                }));
                for level in levels.iter().skip(1) {
                    args.push(OsString::from("--mipimage"));
                    args.push(level.as_os_str().to_os_string());
                }
                if let Some(base) = levels.first() {
                    args.push(base.as_os_str().to_os_string());
                }
                args.push(OsString::from("-o"));
                args.push(output.as_os_str().to_os_string());
            }
        }
        args
    }

    /// Compile `levels` into `output`, then delete the level files.
    ///
    /// Blocks until the tool exits. Its stdout and stderr are logged. A
    /// non-zero exit or a failure to start is an
    /// [`ExternalTool`](TextureError::ExternalTool) error; the level files
    /// are removed in every case.
    pub fn compile(&self, levels: &[PathBuf], output: &Path, renderer: Renderer) -> Result<()> {
        let result = self.run(levels, output, renderer);
        remove_files(levels);
        result
    }

    fn run(&self, levels: &[PathBuf], output: &Path, renderer: Renderer) -> Result<()> {
        if levels.is_empty() {
            return Err(TextureError::configuration("no mip levels to compile"));
        }

        let program = self.program.display().to_string();
        let args = self.arguments(levels, output, renderer);
        info!(
            program = %program,
            flavor = ?self.flavor,
            args = ?args,
            output = %output.display(),
            "Running texture compiler"
        );

        let start = Instant::now();
        let out = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| TextureError::external_tool(&program, None, format!("failed to start: {}", e)))?;

        let stdout = String::from_utf8_lossy(&out.stdout);
        let stderr = String::from_utf8_lossy(&out.stderr);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            debug!(program = %program, "{}", line);
        }
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            warn!(program = %program, "{}", line);
        }

        if !out.status.success() {
            error!(
                program = %program,
                code = ?out.status.code(),
                "Texture compiler failed"
            );
            return Err(TextureError::external_tool(
                program,
                out.status.code(),
                stderr.trim().to_string(),
            ));
        }

        info!(
            output = %output.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Texture compiled"
        );
        Ok(())
    }
}
