//! # External Tool Resolver
//!
//! Finds the command-line tools this crate drives:
//! - `yt-dlp` / `youtube-dl`: video download and mux
//! - `ffmpeg`: video to GIF encoding
//! - `convert` (ImageMagick): frames to GIF assembly
//! - `curl` / `unzip`: remote dataset fetch
//!
//! Lookup order is `$TOOLS_DIR` first, then every directory of `PATH`.

use crate::error::PopError;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Every tool the crate may invoke, grouped for reports
pub const KNOWN_TOOLS: &[(&str, &[&str])] = &[
    ("Video", &["yt-dlp", "youtube-dl", "ffmpeg"]),
    ("Animation", &["convert"]),
    ("Dataset", &["curl", "unzip"]),
];

/// Tool path resolver for `$TOOLS_DIR` and the system `PATH`
pub struct ToolPathResolver {
    /// Directory checked before `PATH`
    tools_dir: Option<PathBuf>,
    /// Directories of `PATH`, in order
    search_path: Vec<PathBuf>,
}

impl ToolPathResolver {
    /// Create a resolver from the current environment
    pub fn new() -> Self {
        let tools_dir = env::var_os("TOOLS_DIR")
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir());
        if let Some(ref dir) = tools_dir {
            debug!("Using TOOLS_DIR override: {}", dir.display());
        }

        let search_path = env::var_os("PATH")
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();

        Self {
            tools_dir,
            search_path,
        }
    }

    /// Create a resolver over explicit directories only
    pub fn with_dirs(tools_dir: Option<PathBuf>, search_path: Vec<PathBuf>) -> Self {
        Self {
            tools_dir,
            search_path,
        }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let file_name = executable_name(tool_name);

        let found = self
            .tools_dir
            .iter()
            .chain(self.search_path.iter())
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file());

        match found {
            Some(ref path) => debug!("Resolved tool {} -> {}", tool_name, path.display()),
            None => debug!("Tool not found: {}", tool_name),
        }
        found
    }

    /// Resolve a tool or fail with an install hint
    pub fn require(&self, tool_name: &str) -> Result<PathBuf, PopError> {
        self.resolve_tool(tool_name).ok_or_else(|| {
            warn!("Required tool missing: {}", tool_name);
            PopError::MissingDependency(format!(
                "'{}' not found (install with: {})",
                tool_name,
                install_hint(tool_name)
            ))
        })
    }

    /// Resolve the first available tool among alternatives
    pub fn require_any(&self, candidates: &[&str]) -> Result<(String, PathBuf), PopError> {
        for tool in candidates {
            if let Some(path) = self.resolve_tool(tool) {
                return Ok((tool.to_string(), path));
            }
        }

        let hints: Vec<String> = candidates
            .iter()
            .map(|tool| format!("{} ({})", tool, install_hint(tool)))
            .collect();
        Err(PopError::MissingDependency(format!(
            "none of the alternatives found: {}",
            hints.join(", ")
        )))
    }

    /// Get a report of tool availability
    pub fn get_tools_report(&self) -> String {
        let mut report = String::from("External tools\n");
        if let Some(ref dir) = self.tools_dir {
            report.push_str(&format!("TOOLS_DIR: {}\n", dir.display()));
        }

        for (category, tools) in KNOWN_TOOLS {
            report.push_str(&format!("\n{}:\n", category));
            for tool in tools.iter() {
                match self.resolve_tool(tool) {
                    Some(path) => report.push_str(&format!("  ✅ {} -> {}\n", tool, path.display())),
                    None => report.push_str(&format!(
                        "  ❌ {} (install with: {})\n",
                        tool,
                        install_hint(tool)
                    )),
                }
            }
        }

        report
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn executable_name(tool_name: &str) -> String {
    if cfg!(windows) && Path::new(tool_name).extension().is_none() {
        format!("{}.exe", tool_name)
    } else {
        tool_name.to_string()
    }
}

/// Installation instructions for a tool on Debian-like systems
pub fn install_hint(tool_name: &str) -> String {
    match tool_name {
        "yt-dlp" => "pip install yt-dlp".to_string(),
        "youtube-dl" => "pip install youtube-dl".to_string(),
        "convert" => "sudo apt-get install imagemagick".to_string(),
        _ => format!("sudo apt-get install {}", tool_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(executable_name(name));
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_tools_dir_wins_over_path() {
        let tools = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();
        let bundled = touch(tools.path(), "ffmpeg");
        touch(system.path(), "ffmpeg");

        let resolver = ToolPathResolver::with_dirs(
            Some(tools.path().to_path_buf()),
            vec![system.path().to_path_buf()],
        );
        assert_eq!(resolver.resolve_tool("ffmpeg"), Some(bundled));
    }

    #[test]
    fn test_require_reports_missing_tool() {
        let resolver = ToolPathResolver::with_dirs(None, vec![]);
        let err = resolver.require("convert").unwrap_err();
        assert!(matches!(err, PopError::MissingDependency(_)));
        assert!(err.to_string().contains("imagemagick"));
    }

    #[test]
    fn test_require_any_takes_first_available() {
        let system = TempDir::new().unwrap();
        touch(system.path(), "youtube-dl");
        let resolver = ToolPathResolver::with_dirs(None, vec![system.path().to_path_buf()]);

        let (name, _) = resolver.require_any(&["yt-dlp", "youtube-dl"]).unwrap();
        assert_eq!(name, "youtube-dl");
    }

    #[test]
    fn test_report_lists_every_tool() {
        let resolver = ToolPathResolver::with_dirs(None, vec![]);
        let report = resolver.get_tools_report();
        for (_, tools) in KNOWN_TOOLS {
            for tool in tools.iter() {
                assert!(report.contains(tool));
            }
        }
    }
}
