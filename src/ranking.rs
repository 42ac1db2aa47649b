//! # Ranking Engine
//!
//! Chooses which entities of a period are drawn in a chart.
//!
//! ## Operations:
//! - `top_n()`: the `n` largest values of a slice
//! - `closest_to()`: the `n` values nearest to a reference entity's value
//!
//! Both return a `Selection` ordered by descending value. Ties keep table
//! order: sorts are stable and the slice is already in table order.

use crate::dataset::{Observation, PeriodSlice};
use crate::error::PopError;
use std::cmp::Ordering;

/// Ranked subset of entities chosen for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub period: String,
    pub entries: Vec<Observation>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entries.iter().any(|o| o.entity == entity)
    }

    pub fn entity_names(&self) -> Vec<String> {
        self.entries.iter().map(|o| o.entity.clone()).collect()
    }
}

impl From<Selection> for PeriodSlice {
    fn from(selection: Selection) -> Self {
        PeriodSlice::new(selection.period, selection.entries)
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn ensure_positive(n: usize) -> Result<(), PopError> {
    if n == 0 {
        return Err(PopError::Validation(
            "selection size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// The `n` entities with the largest values, ordered descending
pub fn top_n(slice: &PeriodSlice, n: usize) -> Result<Selection, PopError> {
    ensure_positive(n)?;

    let mut entries = slice.observations.clone();
    entries.sort_by(|a, b| descending(a.value, b.value));
    entries.truncate(n);

    Ok(Selection {
        period: slice.period.clone(),
        entries,
    })
}

/// The `n` entities whose values are nearest to `reference`'s value,
/// reference included, ordered descending by value
pub fn closest_to(slice: &PeriodSlice, reference: &str, n: usize) -> Result<Selection, PopError> {
    ensure_positive(n)?;

    let centre = slice.get(reference).ok_or_else(|| {
        PopError::MissingKey(format!("{} has no value in {}", reference, slice.period))
    })?;

    let mut by_distance: Vec<&Observation> = slice.observations.iter().collect();
    by_distance.sort_by(|a, b| {
        let da = (a.value - centre).abs();
        let db = (b.value - centre).abs();
        da.partial_cmp(&db).unwrap_or(Ordering::Equal)
    });

    let mut entries: Vec<Observation> = by_distance.into_iter().take(n).cloned().collect();

    // A tie at distance zero must not push the reference itself out.
    if !entries.iter().any(|o| o.entity == reference) {
        entries.pop();
        entries.push(Observation::new(reference, centre));
    }

    entries.sort_by(|a, b| descending(a.value, b.value));

    Ok(Selection {
        period: slice.period.clone(),
        entries,
    })
}
