//! Render orchestration: drives the external renderer CLI inside a scratch
//! directory and relocates the produced artifact into the persistent outputs
//! store.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::extract;

pub const DEFAULT_PROGRAM: &str = "manim";
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Basename handed to the renderer via `-o`; the artifact search keys off it.
const ARTIFACT_BASENAME: &str = "animation";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not find a Scene class in the code")]
    NoSceneClass,
    #[error("failed to run renderer: {0}")]
    Spawn(String),
    /// Carries the renderer's stderr verbatim.
    #[error("{0}")]
    Renderer(String),
    #[error("no output file generated")]
    NoOutput,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp4,
    Gif,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Gif => "gif",
        }
    }
}

/// Maps a requested quality to the renderer's flag. Unrecognized values fall
/// back to medium rather than failing the request.
pub fn quality_flag(quality: &str) -> &'static str {
    match quality {
        "low" => "-ql",
        "medium" => "-qm",
        "high" => "-qh",
        "production" => "-qp",
        "4k" => "-qk",
        _ => "-qm",
    }
}

#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub output_path: PathBuf,
    pub duration: f64,
}

/// Owns the renderer program name and the persistent outputs directory, both
/// injected at construction.
#[derive(Clone)]
pub struct Renderer {
    program: String,
    output_dir: PathBuf,
}

impl Renderer {
    pub fn new(program: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Linear pipeline: scratch dir, source file, scene resolution, one
    /// renderer invocation, artifact search, duration sidecar, relocation.
    /// No retries; the scratch directory is removed on every exit path.
    pub fn render(
        &self,
        code: &str,
        quality: &str,
        format: OutputFormat,
    ) -> Result<RenderOutcome, RenderError> {
        let scratch = tempfile::tempdir()?;
        let source = scratch.path().join("animation.py");
        fs::write(&source, code)?;

        let scene = extract::scene_class_name(code).ok_or(RenderError::NoSceneClass)?;

        let output = Command::new(&self.program)
            .arg(quality_flag(quality))
            .args(["-o", ARTIFACT_BASENAME])
            .arg(&source)
            .arg(scene)
            .current_dir(scratch.path())
            .output()
            .map_err(|e| {
                RenderError::Spawn(format!(
                    "failed to run {} (is it installed and on PATH?): {e}",
                    self.program
                ))
            })?;

        if !output.status.success() {
            return Err(RenderError::Renderer(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        let Some(artifact) = find_artifact(scratch.path(), format.extension()) else {
            log_scratch_tree(scratch.path());
            return Err(RenderError::NoOutput);
        };

        let duration = read_duration(&scratch.path().join("animation.json"));

        fs::create_dir_all(&self.output_dir)?;
        let file_name = artifact
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| ARTIFACT_BASENAME.into());
        let final_path = self.output_dir.join(file_name);
        relocate(&artifact, &final_path)?;

        Ok(RenderOutcome {
            output_path: final_path,
            duration,
        })
    }
}

/// First file under `root` (depth-first) named `animation*.<extension>`.
fn find_artifact(root: &Path, extension: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(root).ok()?;
    let mut dirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        } else if is_artifact(&path, extension) {
            return Some(path);
        }
    }
    for dir in dirs {
        if let Some(found) = find_artifact(&dir, extension) {
            return Some(found);
        }
    }
    None
}

fn is_artifact(path: &Path, extension: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(ARTIFACT_BASENAME)
        && path.extension().and_then(|e| e.to_str()) == Some(extension)
}

/// Duration from the renderer's optional sidecar; anything missing or
/// malformed is simply 0.
fn read_duration(path: &Path) -> f64 {
    let Ok(raw) = fs::read_to_string(path) else {
        return 0.0;
    };
    serde_json::from_str::<serde_json::Value>(&raw)
        .ok()
        .and_then(|v| v.get("duration").and_then(|d| d.as_f64()))
        .unwrap_or(0.0)
}

/// `rename` does not cross filesystems, and the scratch dir and outputs dir
/// often live on different ones.
fn relocate(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

/// Surfaces what the renderer actually produced when the expected artifact
/// is missing.
fn log_scratch_tree(root: &Path) {
    fn walk(path: &Path) {
        tracing::warn!("render scratch entry: {}", path.display());
        if let Ok(entries) = fs::read_dir(path) {
            for entry in entries.flatten() {
                walk(&entry.path());
            }
        }
    }
    walk(root);
}
