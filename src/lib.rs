//! # Population GIF Library
//!
//! Population ranking charts and video-to-GIF conversion.
//!
//! ## Module layout:
//! - `config`: Run configuration and validation
//! - `error`: `PopError`, the crate's error type
//! - `dataset`: Fetching and cleaning the World Bank population table
//! - `ranking`: Top-N and closest-to-reference selections
//! - `axis`: Rounded value-axis bound shared by a batch
//! - `mode`: Chart modes and their display text
//! - `render`: Bar chart frames (plotters + image)
//! - `batch`: Planning and running one chart batch
//! - `animation`: Frames to GIF with ImageMagick
//! - `media`: Video download and GIF encoding
//! - `tool_resolver` / `process`: Locating and running external tools
//! - `progress` / `json_output`: Progress bar and JSON events
//!
//! ## Usage:
//! ```rust
//! use population_gif::dataset::PeriodSlice;
//! use population_gif::ranking::closest_to;
//!
//! let slice = PeriodSlice::from_pairs("2000", [("A", 10.0), ("B", 12.0), ("C", 50.0), ("D", 11.0)]);
//! let selection = closest_to(&slice, "B", 3).unwrap();
//! assert_eq!(selection.entity_names(), vec!["B", "D", "A"]);
//! ```

pub mod animation;
pub mod axis;
pub mod batch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod json_output;
pub mod media;
pub mod mode;
pub mod process;
pub mod progress;
pub mod ranking;
pub mod render;
pub mod tool_resolver;

pub use axis::{compute_bound, AxisBound};
pub use batch::{BatchPlan, BatchReport, ChartBatch};
pub use config::Config;
pub use dataset::{DatasetRequest, ObservationTable};
pub use error::PopError;
pub use mode::ChartMode;
pub use ranking::Selection;
