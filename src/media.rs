//! # Media Converter
//!
//! Downloads a video and turns it into an animated GIF.
//!
//! ## Pipeline:
//! 1. `yt-dlp` (or `youtube-dl`) fetches the best MP4 video + M4A audio and
//!    muxes them into `<name>.mp4`
//! 2. `ffmpeg` samples the video at `gif_fps`, scales it to `gif_width` with
//!    lanczos and encodes `<name>.gif` through a generated palette
//! 3. The intermediate MP4 is removed unless `keep_video` is set
//!
//! ## Palette filter graph:
//! ```text
//! fps=10,scale=784:-1:flags=lanczos,split [o1] [o2];[o1] palettegen [p]; [o2] fifo [o3];[o3] [p] paletteuse
//! ```

use crate::config::Config;
use crate::error::PopError;
use crate::process::ToolInvocation;
use crate::tool_resolver::ToolPathResolver;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Downloaders tried in order
pub const DOWNLOADERS: &[&str] = &["yt-dlp", "youtube-dl"];

/// Format selector: best MP4 video with M4A audio, or best of anything
const FORMAT_SELECTOR: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/bestvideo+bestaudio";

/// Result of one conversion
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub gif_path: PathBuf,
    pub video_path: Option<PathBuf>,
}

/// Handles video download and GIF encoding
pub struct MediaConverter {
    config: Config,
    resolver: ToolPathResolver,
}

impl MediaConverter {
    pub fn new(config: Config) -> Self {
        Self::with_resolver(config, ToolPathResolver::new())
    }

    pub fn with_resolver(config: Config, resolver: ToolPathResolver) -> Self {
        Self { config, resolver }
    }

    /// Download `url` and convert it to `<name>.gif`
    pub async fn convert(&self, url: &str, name: &str) -> Result<ConversionOutput> {
        validate_inputs(url, name)?;

        let (downloader_name, downloader) = self.resolver.require_any(DOWNLOADERS)?;
        let ffmpeg = self.resolver.require("ffmpeg")?;

        let video_path = PathBuf::from(format!("{}.mp4", name));
        let gif_path = PathBuf::from(format!("{}.gif", name));
        if let Some(parent) = gif_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!("🎬 Downloading {} with {}", url, downloader_name);
        let start_time = Instant::now();
        self.download_invocation(&downloader_name, downloader, url, name)
            .run()
            .await?;
        debug!("Download finished in {:.1}s", start_time.elapsed().as_secs_f64());

        if !video_path.exists() {
            return Err(PopError::ExternalProcess {
                tool: downloader_name,
                message: format!("expected output {} was not created", video_path.display()),
            }
            .into());
        }

        info!("🔄 Encoding {}", gif_path.display());
        self.encode_invocation(ffmpeg, &video_path, &gif_path).run().await?;
        info!("✅ GIF written to {}", gif_path.display());

        let video_path = if self.config.keep_video {
            Some(video_path)
        } else {
            if let Err(e) = tokio::fs::remove_file(&video_path).await {
                warn!("Could not remove {}: {}", video_path.display(), e);
            }
            None
        };

        Ok(ConversionOutput { gif_path, video_path })
    }

    fn download_invocation(&self, tool: &str, program: PathBuf, url: &str, name: &str) -> ToolInvocation {
        ToolInvocation::new(tool, program).args(crate::args![
            "-f",
            FORMAT_SELECTOR,
            "--merge-output-format",
            "mp4",
            "-o",
            format!("{}.%(ext)s", name),
            url,
        ])
    }

    fn encode_invocation(&self, ffmpeg: PathBuf, video: &Path, gif: &Path) -> ToolInvocation {
        let mut args = crate::args!["-y", "-i", video.to_string_lossy()];
        args.extend(crate::args![
            "-filter_complex",
            palette_filter(self.config.gif_fps, self.config.gif_width),
            gif.to_string_lossy(),
        ]);

        // Keep ffmpeg quiet unless we are debugging
        if !tracing::enabled!(tracing::Level::DEBUG) {
            args.extend(crate::args!["-loglevel", "warning"]);
        }

        ToolInvocation::new("ffmpeg", ffmpeg).args(args)
    }
}

/// Two-pass palette filter graph for good-looking GIFs
pub fn palette_filter(fps: u32, width: u32) -> String {
    format!(
        "fps={},scale={}:-1:flags=lanczos,split [o1] [o2];[o1] palettegen [p]; [o2] fifo [o3];[o3] [p] paletteuse",
        fps, width
    )
}

fn validate_inputs(url: &str, name: &str) -> Result<(), PopError> {
    if url.trim().is_empty() {
        return Err(PopError::Validation("video URL must not be empty".to_string()));
    }
    if name.trim().is_empty() {
        return Err(PopError::Validation("output name must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> MediaConverter {
        MediaConverter::with_resolver(Config::default(), ToolPathResolver::with_dirs(None, vec![]))
    }

    #[test]
    fn test_palette_filter() {
        assert_eq!(
            palette_filter(10, 784),
            "fps=10,scale=784:-1:flags=lanczos,split [o1] [o2];[o1] palettegen [p]; [o2] fifo [o3];[o3] [p] paletteuse"
        );
    }

    #[test]
    fn test_download_arguments_keep_url_intact() {
        let url = "https://youtu.be/x; rm -rf ~";
        let invocation = converter().download_invocation("yt-dlp", PathBuf::from("yt-dlp"), url, "clip");
        let args = invocation.get_args();
        assert_eq!(args[1], FORMAT_SELECTOR);
        assert_eq!(args[5], "clip.%(ext)s");
        assert_eq!(args.last().map(String::as_str), Some(url));
    }

    #[test]
    fn test_encode_arguments() {
        let invocation = converter().encode_invocation(
            PathBuf::from("ffmpeg"),
            Path::new("clip.mp4"),
            Path::new("clip.gif"),
        );
        let args = invocation.get_args();
        assert_eq!(&args[..3], &["-y", "-i", "clip.mp4"]);
        assert_eq!(args[3], "-filter_complex");
        assert_eq!(args[4], palette_filter(10, 784));
        assert_eq!(args[5], "clip.gif");
    }

    #[tokio::test]
    async fn test_empty_inputs_are_rejected() {
        let err = converter().convert("", "clip").await.unwrap_err();
        assert!(matches!(err.downcast_ref::<PopError>(), Some(PopError::Validation(_))));

        let err = converter().convert("https://youtu.be/x", " ").await.unwrap_err();
        assert!(matches!(err.downcast_ref::<PopError>(), Some(PopError::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_downloader_is_reported() {
        let err = converter().convert("https://youtu.be/x", "clip").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PopError>(),
            Some(PopError::MissingDependency(_))
        ));
    }
}
