//! # Configuration Management Module
//!
//! Holds every tunable of a run in one `Config` value.
//!
//! ## Responsibilities:
//! - Defines the `Config` struct with directories, chart and GIF parameters
//! - Validates parameter ranges before a run starts
//! - Loads/saves configuration from/to a JSON file
//! - Provides sensible defaults for all parameters
//!
//! ## Parameters:
//! - `data_dir`: Directory searched for the dataset CSV files (default: `data`)
//! - `images_dir`: Root directory for frames and animations (default: `images`)
//! - `data_url`: Remote archive used when local files are absent
//! - `selection_size`: Entities per chart (1-5, default: 5)
//! - `headroom`: Factor applied to the raw maximum before rounding (>= 1.0, default: 1.3)
//! - `frame_width` / `frame_height`: Frame size in pixels (>= 200, default: 800x600)
//! - `animation_delay`: Delay between GIF frames in 1/100 s (default: 20)
//! - `gif_fps` / `gif_width`: Video-to-GIF sampling (default: 10 fps, 784 px)
//! - `keep_video`: Keep the intermediate MP4 after conversion (default: false)
//! - `seed`: Seed for the random country/year pick (default: None = entropy)
//! - `json_output`: Emit JSON events on stdout (default: false)
//!
//! ## Example:
//! ```rust
//! use population_gif::Config;
//!
//! let config = Config {
//!     selection_size: 3,
//!     headroom: 1.5,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// World Bank total population indicator, zipped CSV
pub const DEFAULT_DATA_URL: &str =
    "https://api.worldbank.org/v2/en/indicator/SP.POP.TOTL?downloadformat=csv";

/// Upper limit of entities drawn in one chart
pub const MAX_SELECTION_SIZE: usize = 5;

/// Configuration for chart rendering and media conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the dataset CSV files
    pub data_dir: PathBuf,
    /// Root directory for rendered frames and animations
    pub images_dir: PathBuf,
    /// Remote archive fetched when the local files are absent
    pub data_url: String,
    /// Number of entities per chart (1-5)
    pub selection_size: usize,
    /// Factor applied to the raw maximum before computing the axis bound
    pub headroom: f64,
    /// Frame width in pixels
    pub frame_width: u32,
    /// Frame height in pixels
    pub frame_height: u32,
    /// Delay between animation frames, in hundredths of a second
    pub animation_delay: u32,
    /// Frames per second sampled from a video when converting to GIF
    pub gif_fps: u32,
    /// Width of a converted GIF, height keeps the aspect ratio
    pub gif_width: u32,
    /// Keep the downloaded MP4 next to the GIF
    pub keep_video: bool,
    /// Seed for random picks (None = from entropy)
    pub seed: Option<u64>,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            images_dir: PathBuf::from("images"),
            data_url: DEFAULT_DATA_URL.to_string(),
            selection_size: MAX_SELECTION_SIZE,
            headroom: 1.3,
            frame_width: 800,
            frame_height: 600,
            animation_delay: 20,
            gif_fps: 10,
            gif_width: 784,
            keep_video: false,
            seed: None,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.selection_size == 0 || self.selection_size > MAX_SELECTION_SIZE {
            return Err(anyhow::anyhow!(
                "Selection size must be between 1 and {}",
                MAX_SELECTION_SIZE
            ));
        }

        if !self.headroom.is_finite() || self.headroom < 1.0 {
            return Err(anyhow::anyhow!("Headroom must be a finite factor >= 1.0"));
        }

        if self.frame_width < 200 || self.frame_height < 200 {
            return Err(anyhow::anyhow!("Frame size must be at least 200x200 pixels"));
        }

        if self.animation_delay == 0 {
            return Err(anyhow::anyhow!("Animation delay must be greater than 0"));
        }

        if self.gif_fps == 0 || self.gif_width == 0 {
            return Err(anyhow::anyhow!("GIF fps and width must be greater than 0"));
        }

        if self.data_url.trim().is_empty() {
            return Err(anyhow::anyhow!("Data URL must not be empty"));
        }

        Ok(())
    }

    /// Directory receiving the frames of one batch
    pub fn frames_dir(&self, batch_id: u8) -> PathBuf {
        self.images_dir.join(batch_id.to_string())
    }

    /// Path of the animation assembled from one batch
    pub fn animation_path(&self, batch_id: u8) -> PathBuf {
        self.images_dir.join(format!("population_{}.gif", batch_id))
    }

    /// Load configuration from file; callers run `validate()`
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.selection_size = 0;
        assert!(config.validate().is_err());

        config.selection_size = 6;
        assert!(config.validate().is_err());

        config.selection_size = 5;
        config.headroom = 0.9;
        assert!(config.validate().is_err());

        config.headroom = 1.3;
        config.frame_width = 100;
        assert!(config.validate().is_err());

        config.frame_width = 800;
        config.animation_delay = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.selection_size, 5);
        assert_eq!(config.headroom, 1.3);
        assert_eq!(config.animation_delay, 20);
        assert_eq!(config.gif_fps, 10);
        assert_eq!(config.gif_width, 784);
        assert_eq!(config.data_url, DEFAULT_DATA_URL);
        assert!(!config.json_output);
    }

    #[test]
    fn test_batch_paths() {
        let config = Config {
            images_dir: PathBuf::from("out"),
            ..Default::default()
        };
        assert_eq!(config.frames_dir(3), PathBuf::from("out").join("3"));
        assert_eq!(
            config.animation_path(1),
            PathBuf::from("out").join("population_1.gif")
        );
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            selection_size: 3,
            headroom: 1.5,
            animation_delay: 40,
            seed: Some(7),
            ..Default::default()
        };

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config.selection_size, 3);
        assert_eq!(loaded_config.headroom, 1.5);
        assert_eq!(loaded_config.animation_delay, 40);
        assert_eq!(loaded_config.seed, Some(7));
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{ "selection_size": 4 }"#)
            .await
            .unwrap();

        let config = Config::from_file(&config_path).await.unwrap();
        assert_eq!(config.selection_size, 4);
        assert_eq!(config.frame_width, 800);
    }

    #[tokio::test]
    async fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_file(&temp_dir.path().join("absent.json"))
            .await
            .unwrap();
        assert_eq!(config.selection_size, MAX_SELECTION_SIZE);
    }
}
