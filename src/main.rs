//! # popgif - Main Entry Point
//!
//! ## Responsibilities:
//! - Parse command line arguments with `clap`
//! - Initialise `tracing` logging (INFO, or DEBUG with `--verbose`)
//! - Build and validate the `Config` (file first, then flag overrides)
//! - Dispatch to the media converter, a chart batch or a utility command
//!
//! ## Examples:
//! ```bash
//! popgif video-gif -p https://youtu.be/UkhLvJ6RSKc -n top_10_richest
//! popgif top5
//! popgif closest --country Poland -p API_SP.POP.TOTL_DS2_en_csv_v2.csv -n Metadata_Country_API_SP.POP.TOTL_DS2_en_csv_v2.csv
//! popgif closest-random --seed 7 --json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use population_gif::animation::AnimationAssembler;
use population_gif::dataset::{self, DatasetRequest};
use population_gif::json_output::JsonMessage;
use population_gif::media::MediaConverter;
use population_gif::tool_resolver::ToolPathResolver;
use population_gif::{ChartBatch, ChartMode, Config};

#[derive(Parser)]
#[command(name = "popgif")]
#[command(about = "Population ranking charts and video-to-GIF conversion")]
struct Args {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the dataset CSV files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory receiving frames and animations
    #[arg(long, global = true)]
    images_dir: Option<PathBuf>,

    /// Output progress and status as JSON lines on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct DatasetArgs {
    /// Name of the main dataset file
    #[arg(short = 'p', long)]
    data_name: Option<String>,

    /// Name of the metadata file
    #[arg(short = 'n', long)]
    metadata_name: Option<String>,
}

impl DatasetArgs {
    fn request(&self) -> DatasetRequest {
        DatasetRequest::new(self.data_name.clone(), self.metadata_name.clone())
    }
}

#[derive(Subcommand)]
enum Command {
    /// Download a video and convert it to a GIF
    VideoGif {
        /// URL of the video
        #[arg(short = 'p', long)]
        url: String,

        /// Name of the GIF, without extension
        #[arg(short = 'n', long)]
        file_name: String,

        /// Keep the downloaded MP4
        #[arg(long)]
        keep_video: bool,
    },

    /// Most populated countries of every year, assembled into a GIF
    Top5 {
        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// Countries closest to a random country in a random year
    ClosestRandom {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Seed for the random pick
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Countries closest to one country in every year, assembled into a GIF
    Closest {
        /// Reference country
        #[arg(short, long, default_value = "Poland")]
        country: String,

        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// Re-assemble the existing frames of a batch into its GIF
    Assemble {
        /// Batch number (1 = top5, 2 = closest-random, 3 = closest)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
        batch: u8,
    },

    /// Report which external tools are available
    CheckTools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stderr keeps stdout free for JSON events
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Config errors are reported as JSON events too, so `--json` is honoured
    // before the config file has been read.
    let mut json_output = args.json;
    if let Err(e) = execute(args, &mut json_output).await {
        if json_output {
            JsonMessage::error(e.to_string(), Some(format!("{:#}", e))).emit();
        }
        return Err(e);
    }

    Ok(())
}

/// Build and validate the config, then run the command.
/// `json_output` follows the config as soon as the file is loaded.
async fn execute(args: Args, json_output: &mut bool) -> Result<()> {
    let config = build_config(&args).await?;
    *json_output = config.json_output;
    config.validate()?;

    run(args.command, config).await
}

/// Load the config file and apply flag overrides, without validating
async fn build_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref path) => {
            if !path.exists() {
                return Err(anyhow::anyhow!("Config file does not exist: {}", path.display()));
            }
            Config::from_file(path).await?
        }
        None => Config::default(),
    };

    if let Some(ref data_dir) = args.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(ref images_dir) = args.images_dir {
        config.images_dir = images_dir.clone();
    }
    config.json_output |= args.json;

    Ok(config)
}

async fn run(command: Command, mut config: Config) -> Result<()> {
    match command {
        Command::VideoGif {
            url,
            file_name,
            keep_video,
        } => {
            config.keep_video |= keep_video;
            let json_output = config.json_output;
            let output = MediaConverter::new(config).convert(&url, &file_name).await?;
            if json_output {
                JsonMessage::Conversion {
                    gif_path: output.gif_path,
                    video_path: output.video_path,
                }
                .emit();
            }
        }
        Command::Top5 { dataset } => {
            run_batch(&config, &dataset.request(), ChartMode::TopN).await?;
        }
        Command::ClosestRandom { dataset, seed } => {
            if seed.is_some() {
                config.seed = seed;
            }
            run_batch(&config, &dataset.request(), ChartMode::ClosestRandom).await?;
        }
        Command::Closest { country, dataset } => {
            run_batch(&config, &dataset.request(), ChartMode::ClosestToEntity(country)).await?;
        }
        Command::Assemble { batch } => {
            let frames_dir = config.frames_dir(batch);
            if !frames_dir.is_dir() {
                return Err(anyhow::anyhow!("No frames directory: {}", frames_dir.display()));
            }
            AnimationAssembler::new(config.animation_delay)
                .assemble_dir(&frames_dir, &config.animation_path(batch))
                .await?;
        }
        Command::CheckTools => {
            println!("{}", ToolPathResolver::new().get_tools_report());
        }
    }

    Ok(())
}

async fn run_batch(config: &Config, request: &DatasetRequest, mode: ChartMode) -> Result<()> {
    let table = dataset::load(config, request).await?;
    let report = ChartBatch::new(&table, config).run(&mode).await?;

    match report.animation {
        Some(ref path) => info!("{} frames, animation {}", report.frames.len(), path.display()),
        None => info!("{} frames written", report.frames.len()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_config_file_keeps_json_flag() {
        let args = Args::try_parse_from([
            "popgif",
            "--json",
            "--config",
            "/nonexistent/popgif.json",
            "check-tools",
        ])
        .unwrap();

        let mut json_output = args.json;
        let result = execute(args, &mut json_output).await;
        assert!(result.unwrap_err().to_string().contains("does not exist"));
        assert!(json_output);
    }

    #[tokio::test]
    async fn test_invalid_config_file_enables_json_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"selection_size": 0, "json_output": true}"#).unwrap();

        let args = Args::try_parse_from([
            "popgif",
            "--config",
            path.to_str().unwrap(),
            "check-tools",
        ])
        .unwrap();

        let mut json_output = args.json;
        assert!(!json_output);
        let result = execute(args, &mut json_output).await;
        assert!(result.unwrap_err().to_string().contains("Selection size"));
        assert!(json_output);
    }
}
