//! # Dataset Fetching
//!
//! Provides the raw CSV texts of the dataset and its metadata table.
//!
//! ## Sources, in order:
//! 1. Local files in `Config::data_dir` (both must be present)
//! 2. The remote zip archive at `Config::data_url`, downloaded with `curl`
//!    into a temporary file and read member by member with `unzip -p`
//!
//! When a file name is not given it is found by its well-known prefix,
//! `API_SP.POP.TOTL` for the data and `Metadata_Country_` for the metadata.
//! Remote downloads are never written back to `data_dir`.

use crate::config::Config;
use crate::error::PopError;
use crate::process::ToolInvocation;
use crate::tool_resolver::ToolPathResolver;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const DATA_PREFIX: &str = "API_SP.POP.TOTL";
pub const METADATA_PREFIX: &str = "Metadata_Country_";

/// File names asked for on the command line
#[derive(Debug, Clone, Default)]
pub struct DatasetRequest {
    pub data_name: Option<String>,
    pub metadata_name: Option<String>,
}

impl DatasetRequest {
    pub fn new(data_name: Option<String>, metadata_name: Option<String>) -> Self {
        Self {
            data_name,
            metadata_name,
        }
    }
}

/// Where a dataset was read from
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetOrigin {
    Local(PathBuf),
    Remote(String),
}

/// Raw CSV texts, not yet cleaned
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub data: String,
    pub metadata: String,
    pub origin: DatasetOrigin,
}

/// Reads the dataset from disk or from the remote archive
pub struct DatasetFetcher {
    data_dir: PathBuf,
    data_url: String,
    resolver: ToolPathResolver,
}

impl DatasetFetcher {
    pub fn new(config: &Config) -> Self {
        Self::with_resolver(config, ToolPathResolver::new())
    }

    pub fn with_resolver(config: &Config, resolver: ToolPathResolver) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            data_url: config.data_url.clone(),
            resolver,
        }
    }

    /// Fetch both tables, preferring local files
    pub async fn fetch(&self, request: &DatasetRequest) -> Result<RawDataset, PopError> {
        let data_path = find_local(&self.data_dir, request.data_name.as_deref(), DATA_PREFIX);
        let metadata_path = find_local(&self.data_dir, request.metadata_name.as_deref(), METADATA_PREFIX);

        match (data_path, metadata_path) {
            (Some(data_path), Some(metadata_path)) => {
                info!("📂 Reading dataset from {}", data_path.display());
                let data = tokio::fs::read_to_string(&data_path).await?;
                let metadata = tokio::fs::read_to_string(&metadata_path).await?;
                Ok(RawDataset {
                    data,
                    metadata,
                    origin: DatasetOrigin::Local(self.data_dir.clone()),
                })
            }
            (data_path, metadata_path) => {
                if data_path.is_some() != metadata_path.is_some() {
                    warn!(
                        "Only one of the dataset files exists in {}, downloading both",
                        self.data_dir.display()
                    );
                }
                self.fetch_remote(request).await
            }
        }
    }

    async fn fetch_remote(&self, request: &DatasetRequest) -> Result<RawDataset, PopError> {
        let curl = self.resolver.require("curl")?;
        let unzip = self.resolver.require("unzip")?;

        info!("🌐 Downloading dataset from {}", self.data_url);
        let archive = NamedTempFile::with_suffix(".zip")?;
        let archive_path = archive.path().to_string_lossy().to_string();

        ToolInvocation::new("curl", curl)
            .args(crate::args!["-fsSL", "-o", &archive_path, &self.data_url])
            .run()
            .await
            .map_err(|e| PopError::Fetch(format!("download of {} failed: {}", self.data_url, e)))?;

        let listing = ToolInvocation::new("unzip", &unzip)
            .args(crate::args!["-Z1", &archive_path])
            .run()
            .await
            .map_err(|e| PopError::Fetch(format!("downloaded archive is unreadable: {}", e)))?;
        let members: Vec<String> = String::from_utf8_lossy(&listing.stdout)
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        debug!("Archive members: {:?}", members);

        let data_member = pick_member(&members, request.data_name.as_deref(), DATA_PREFIX)?;
        let metadata_member = pick_member(&members, request.metadata_name.as_deref(), METADATA_PREFIX)?;

        let data = self.read_member(&unzip, &archive_path, &data_member).await?;
        let metadata = self.read_member(&unzip, &archive_path, &metadata_member).await?;

        // `archive` is removed when dropped here
        Ok(RawDataset {
            data,
            metadata,
            origin: DatasetOrigin::Remote(self.data_url.clone()),
        })
    }

    async fn read_member(&self, unzip: &Path, archive: &str, member: &str) -> Result<String, PopError> {
        let output = ToolInvocation::new("unzip", unzip)
            .args(crate::args!["-p", archive, member])
            .run()
            .await
            .map_err(|e| PopError::Fetch(format!("could not extract {}: {}", member, e)))?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Local file by exact name, or the first `<prefix>*.csv` in `dir`
fn find_local(dir: &Path, name: Option<&str>, prefix: &str) -> Option<PathBuf> {
    if let Some(name) = name {
        let path = dir.join(name);
        return path.is_file().then_some(path);
    }

    let mut candidates: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let file_name = e.file_name().to_string_lossy();
            file_name.starts_with(prefix) && file_name.to_lowercase().ends_with(".csv")
        })
        .map(|e| e.into_path())
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Archive member by exact name, or the first one starting with `prefix`
fn pick_member(members: &[String], name: Option<&str>, prefix: &str) -> Result<String, PopError> {
    let found = match name {
        Some(name) => members.iter().find(|m| m.as_str() == name),
        None => members.iter().find(|m| m.starts_with(prefix)),
    };
    found.cloned().ok_or_else(|| {
        PopError::Fetch(format!(
            "archive has no member {}",
            name.map(str::to_string).unwrap_or_else(|| format!("{}*", prefix))
        ))
    })
}
