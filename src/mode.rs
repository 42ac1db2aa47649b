//! # Chart Modes
//!
//! The three kinds of chart batches and the text each one displays.

use serde::Serialize;
use std::fmt;

/// Title line shared by both "closest" modes
const CLOSEST_TITLE: &str = "Countries that are the closest by population size";

/// Which entities a batch shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "reference", rename_all = "snake_case")]
pub enum ChartMode {
    /// Largest entities of every period
    TopN,
    /// Neighbours of a random entity in a random period
    ClosestRandom,
    /// Neighbours of one entity in every period
    ClosestToEntity(String),
}

/// Title and subtitle of one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayText {
    pub title: String,
    pub subtitle: String,
}

impl ChartMode {
    /// Number used for the frame directory and the animation name
    pub fn batch_id(&self) -> u8 {
        match self {
            ChartMode::TopN => 1,
            ChartMode::ClosestRandom => 2,
            ChartMode::ClosestToEntity(_) => 3,
        }
    }

    /// Whether the frames of this batch are assembled into an animation
    pub fn assembles_animation(&self) -> bool {
        match self {
            ChartMode::TopN | ChartMode::ClosestToEntity(_) => true,
            ChartMode::ClosestRandom => false,
        }
    }

    /// Texts drawn on a frame; `highlight` is the entity the frame centres on
    pub fn display_text(&self, selection_size: usize, highlight: Option<&str>) -> DisplayText {
        match self {
            ChartMode::TopN => DisplayText {
                title: "Total Population Over Time".to_string(),
                subtitle: format!("Top {} Populated Countries", selection_size),
            },
            ChartMode::ClosestRandom | ChartMode::ClosestToEntity(_) => DisplayText {
                title: CLOSEST_TITLE.to_string(),
                subtitle: format!("to {}", highlight.unwrap_or_default()),
            },
        }
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartMode::TopN => write!(f, "top-n"),
            ChartMode::ClosestRandom => write!(f, "closest-random"),
            ChartMode::ClosestToEntity(entity) => write!(f, "closest to {}", entity),
        }
    }
}
