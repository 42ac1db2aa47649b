//! # Population Dataset Loader
//!
//! - `fetch`: raw CSV texts from disk or from the remote archive
//! - `loader`: parsing, filtering to grouped entities, period columns
//! - `table`: the cleaned `ObservationTable` and its period slices

pub mod fetch;
pub mod loader;
pub mod table;

pub use fetch::{DatasetFetcher, DatasetOrigin, DatasetRequest, RawDataset};
pub use loader::parse_dataset;
pub use table::{Observation, ObservationTable, PeriodSlice};

use crate::config::Config;
use anyhow::{Context, Result};
use tracing::info;

/// Fetch and clean the dataset named by `request`
pub async fn load(config: &Config, request: &DatasetRequest) -> Result<ObservationTable> {
    let raw = DatasetFetcher::new(config).fetch(request).await?;
    let table = parse_dataset(&raw.data, &raw.metadata)
        .with_context(|| format!("Failed to clean dataset from {:?}", raw.origin))?;

    info!(
        "Loaded {} entities over {} periods",
        table.entity_count(),
        table.periods().len()
    );
    Ok(table)
}
