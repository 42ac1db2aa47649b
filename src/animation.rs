//! # Animation Assembler
//!
//! Merges rendered frames into one looping GIF with ImageMagick `convert`.
//!
//! ## Entry points:
//! - `assemble()`: an explicit, ordered list of frames
//! - `assemble_dir()`: every `*.jpg` of a batch directory, sorted by name
//!
//! ## Command:
//! ```text
//! convert -delay <delay> -loop 0 <frame>... <output.gif>
//! ```

use crate::error::PopError;
use crate::process::ToolInvocation;
use crate::tool_resolver::ToolPathResolver;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Builds animations from frame files
pub struct AnimationAssembler {
    resolver: ToolPathResolver,
    delay: u32,
}

impl AnimationAssembler {
    pub fn new(delay: u32) -> Self {
        Self::with_resolver(delay, ToolPathResolver::new())
    }

    pub fn with_resolver(delay: u32, resolver: ToolPathResolver) -> Self {
        Self { resolver, delay }
    }

    /// Merge `frames`, in order, into `output`
    pub async fn assemble(&self, frames: &[PathBuf], output: &Path) -> Result<PathBuf> {
        if frames.is_empty() {
            return Err(PopError::Validation(format!(
                "no frames to assemble into {}",
                output.display()
            ))
            .into());
        }

        let convert = self.resolver.require("convert")?;
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!("🎞️ Assembling {} frames into {}", frames.len(), output.display());
        self.invocation(convert, frames, output).run().await?;
        info!("✅ Animation written to {}", output.display());

        Ok(output.to_path_buf())
    }

    /// Merge every frame of `frames_dir` into `output`
    pub async fn assemble_dir(&self, frames_dir: &Path, output: &Path) -> Result<PathBuf> {
        let frames = collect_frames(frames_dir);
        self.assemble(&frames, output).await
    }

    fn invocation(&self, convert: PathBuf, frames: &[PathBuf], output: &Path) -> ToolInvocation {
        ToolInvocation::new("convert", convert)
            .args(crate::args!["-delay", self.delay, "-loop", 0])
            .args(frames.iter().map(|f| f.to_string_lossy().into_owned()))
            .arg(output.to_string_lossy().into_owned())
    }
}

/// `*.jpg` files directly inside `dir`, sorted by file name
pub fn collect_frames(dir: &Path) -> Vec<PathBuf> {
    let mut frames: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("jpg"))
                .unwrap_or(false)
        })
        .collect();
    frames.sort();
    frames
}
