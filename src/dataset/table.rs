//! # Observation Table
//!
//! In-memory table of numeric observations indexed by entity name and period.
//! Entity rows keep the order of the source file; cells are `Option<f64>`.

use crate::error::PopError;
use indexmap::IndexMap;

/// One `(entity, value)` pair of a period column
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub entity: String,
    pub value: f64,
}

impl Observation {
    pub fn new(entity: impl Into<String>, value: f64) -> Self {
        Self {
            entity: entity.into(),
            value,
        }
    }
}

/// The present values of one period, in table order
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSlice {
    pub period: String,
    pub observations: Vec<Observation>,
}

impl PeriodSlice {
    pub fn new(period: impl Into<String>, observations: Vec<Observation>) -> Self {
        Self {
            period: period.into(),
            observations,
        }
    }

    /// Build a slice from `(name, value)` pairs
    pub fn from_pairs<S: Into<String>>(
        period: impl Into<String>,
        pairs: impl IntoIterator<Item = (S, f64)>,
    ) -> Self {
        let observations = pairs
            .into_iter()
            .map(|(entity, value)| Observation::new(entity, value))
            .collect();
        Self::new(period, observations)
    }

    /// Value of an entity, if it has one in this period
    pub fn get(&self, entity: &str) -> Option<f64> {
        self.observations
            .iter()
            .find(|o| o.entity == entity)
            .map(|o| o.value)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Cleaned numeric table: rows are entities, columns are periods
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    periods: Vec<String>,
    rows: IndexMap<String, Vec<Option<f64>>>,
}

impl ObservationTable {
    /// Build a table, rejecting duplicate entities and ragged rows
    pub fn new(
        periods: Vec<String>,
        rows: impl IntoIterator<Item = (String, Vec<Option<f64>>)>,
    ) -> Result<Self, PopError> {
        let mut map = IndexMap::new();
        for (entity, cells) in rows {
            if cells.len() != periods.len() {
                return Err(PopError::Schema(format!(
                    "row '{}' has {} cells, expected {}",
                    entity,
                    cells.len(),
                    periods.len()
                )));
            }
            if map.insert(entity.clone(), cells).is_some() {
                return Err(PopError::Schema(format!("duplicate entity name '{}'", entity)));
            }
        }

        Ok(Self { periods, rows: map })
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn entity_count(&self) -> usize {
        self.rows.len()
    }

    pub fn contains_entity(&self, entity: &str) -> bool {
        self.rows.contains_key(entity)
    }

    pub fn value(&self, entity: &str, period: &str) -> Option<f64> {
        let column = self.period_index(period)?;
        self.rows.get(entity).and_then(|cells| cells[column])
    }

    /// Present values of one period, or `None` for an unknown period
    pub fn slice(&self, period: &str) -> Option<PeriodSlice> {
        let column = self.period_index(period)?;
        let observations = self
            .rows
            .iter()
            .filter_map(|(entity, cells)| cells[column].map(|v| Observation::new(entity.clone(), v)))
            .collect();
        Some(PeriodSlice::new(period, observations))
    }

    /// All period slices, in column order
    pub fn slices(&self) -> impl Iterator<Item = PeriodSlice> + '_ {
        self.periods.iter().filter_map(|period| self.slice(period))
    }

    /// Largest value in the whole table
    pub fn max_value(&self) -> Option<f64> {
        self.rows
            .values()
            .flat_map(|cells| cells.iter().flatten().copied())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
    }

    /// Largest value of one entity's row
    pub fn row_max(&self, entity: &str) -> Result<Option<f64>, PopError> {
        let cells = self
            .rows
            .get(entity)
            .ok_or_else(|| PopError::MissingKey(entity.to_string()))?;
        Ok(cells
            .iter()
            .flatten()
            .copied()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v)))))
    }

    fn period_index(&self, period: &str) -> Option<usize> {
        self.periods.iter().position(|p| p == period)
    }
}
