//! # Chart Renderer
//!
//! - `chart`: draws one bar chart per `Frame` and writes it as JPEG
//! - `palette`: fixed per-entity bar colours

pub mod chart;
pub mod palette;

pub use chart::{format_millions, ChartRenderer};
pub use palette::Palette;

use crate::ranking::Selection;

/// One chart to draw: the selection and the entity it centres on
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub selection: Selection,
    pub highlight: Option<String>,
}

impl Frame {
    pub fn new(selection: Selection, highlight: Option<String>) -> Self {
        Self {
            selection,
            highlight,
        }
    }

    pub fn period(&self) -> &str {
        &self.selection.period
    }
}
