//! # Dataset Parsing and Cleaning
//!
//! Turns the two World Bank CSV texts into an `ObservationTable`.
//!
//! ## Pipeline:
//! 1. Skip the 4-line preamble of the main file, read its header
//! 2. Collect the country codes whose metadata `Region` is filled in
//!    (aggregates such as "World" or "Euro area" have no region)
//! 3. Keep rows of those codes, keyed by `Country Name`
//! 4. Keep only period columns (all-digit headers) holding at least one value

use crate::dataset::table::ObservationTable;
use crate::error::PopError;
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashSet;
use tracing::debug;

/// Lines before the header row of the main dataset
pub const PREAMBLE_LINES: usize = 4;

pub const NAME_COLUMN: &str = "Country Name";
pub const CODE_COLUMN: &str = "Country Code";
pub const GROUP_COLUMN: &str = "Region";

/// Parse and clean the main dataset against its metadata table
pub fn parse_dataset(data_csv: &str, metadata_csv: &str) -> Result<ObservationTable, PopError> {
    let grouped = grouped_codes(metadata_csv)?;
    debug!("{} codes belong to a region", grouped.len());

    let body = skip_lines(strip_bom(data_csv), PREAMBLE_LINES);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader.headers()?.clone();
    let name_idx = column_index(&headers, NAME_COLUMN, "dataset")?;
    let code_idx = column_index(&headers, CODE_COLUMN, "dataset")?;

    let period_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .map(|(idx, h)| (idx, h.trim().to_string()))
        .filter(|(_, h)| is_period(h))
        .collect();

    let mut rows: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let code = record.get(code_idx).unwrap_or("").trim();
        if !grouped.contains(code) {
            continue;
        }

        let name = record.get(name_idx).unwrap_or("").trim().to_string();
        let mut cells = Vec::with_capacity(period_columns.len());
        for (idx, period) in &period_columns {
            cells.push(parse_cell(record.get(*idx), &name, period, line)?);
        }
        rows.push((name, cells));
    }

    // Keep a period only if some kept row has a value for it.
    let populated: Vec<usize> = (0..period_columns.len())
        .filter(|&col| rows.iter().any(|(_, cells)| cells[col].is_some()))
        .collect();
    debug!(
        "Kept {} rows and {} of {} period columns",
        rows.len(),
        populated.len(),
        period_columns.len()
    );

    let periods = populated
        .iter()
        .map(|&col| period_columns[col].1.clone())
        .collect();
    let rows = rows.into_iter().map(|(name, cells)| {
        let kept = populated.iter().map(|&col| cells[col]).collect();
        (name, kept)
    });

    ObservationTable::new(periods, rows)
}

/// Codes of entities with a non-empty grouping in the metadata table
pub fn grouped_codes(metadata_csv: &str) -> Result<HashSet<String>, PopError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(strip_bom(metadata_csv).as_bytes());

    let headers = reader.headers()?.clone();
    let code_idx = column_index(&headers, CODE_COLUMN, "metadata")?;
    let group_idx = column_index(&headers, GROUP_COLUMN, "metadata")?;

    let mut codes = HashSet::new();
    for result in reader.records() {
        let record = result?;
        let group = record.get(group_idx).unwrap_or("").trim();
        if !group.is_empty() {
            codes.insert(record.get(code_idx).unwrap_or("").trim().to_string());
        }
    }
    Ok(codes)
}

fn column_index(headers: &StringRecord, column: &str, table: &str) -> Result<usize, PopError> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| PopError::Schema(format!("{} has no '{}' column", table, column)))
}

fn parse_cell(raw: Option<&str>, entity: &str, period: &str, line: usize) -> Result<Option<f64>, PopError> {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(None),
    };
    // `f64::from_str` also accepts NaN and infinities, which are not counts.
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(PopError::Schema(format!(
            "non-numeric value '{}' for {} in {} (record {})",
            raw,
            entity,
            period,
            line + 1
        ))),
    }
}

fn is_period(header: &str) -> bool {
    !header.is_empty() && header.chars().all(|c| c.is_ascii_digit())
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

fn skip_lines(text: &str, count: usize) -> &str {
    let mut rest = text;
    for _ in 0..count {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}


#[cfg(test)]
mod tests {
    use super::fixtures::{DATA, METADATA};
    use super::*;

    #[test]
    fn test_aggregates_are_dropped() {
        let table = parse_dataset(DATA, METADATA).unwrap();
        let names: Vec<&str> = table.entities().collect();
        assert_eq!(names, vec!["Aruba", "Poland", "Chile"]);
        assert!(!table.contains_entity("World"));
    }

    #[test]
    fn test_only_populated_period_columns_remain() {
        let table = parse_dataset(DATA, METADATA).unwrap();
        // "1962" only has a value for the dropped aggregate, "Notes" is not a period
        assert_eq!(table.periods(), &["1960".to_string(), "1961".to_string()]);
        assert_eq!(table.value("Poland", "1961"), Some(30_061_000.0));
    }

    #[test]
    fn test_every_entity_is_grouped() {
        let table = parse_dataset(DATA, METADATA).unwrap();
        let grouped = grouped_codes(METADATA).unwrap();
        assert_eq!(grouped.len(), 3);
        assert_eq!(table.entity_count(), 3);
        for period in table.periods() {
            assert!(!table.slice(period).unwrap().is_empty());
        }
    }

    #[test]
    fn test_missing_key_column_is_schema_error() {
        let metadata = "\"Code\",\"Region\"\n\"POL\",\"Europe\"\n";
        assert!(matches!(parse_dataset(DATA, metadata), Err(PopError::Schema(_))));

        let data = "a\nb\nc\nd\n\"Name\",\"Country Code\",\"1960\"\n\"Poland\",\"POL\",\"1\"\n";
        assert!(matches!(parse_dataset(data, METADATA), Err(PopError::Schema(_))));
    }

    #[test]
    fn test_non_numeric_cell_is_schema_error() {
        let data = "a\nb\nc\nd\n\"Country Name\",\"Country Code\",\"1960\"\n\"Poland\",\"POL\",\"many\"\n";
        let err = parse_dataset(data, METADATA).unwrap_err();
        assert!(err.to_string().contains("many"));
    }

    #[test]
    fn test_nan_and_infinite_cells_are_schema_errors() {
        for cell in ["NaN", "inf", "-infinity"] {
            let data = format!(
                "a\nb\nc\nd\n\"Country Name\",\"Country Code\",\"1960\"\n\"Poland\",\"POL\",\"{}\"\n\"Chile\",\"CHL\",\"5\"\n",
                cell
            );
            let err = parse_dataset(&data, METADATA).unwrap_err();
            assert!(matches!(err, PopError::Schema(_)), "{} was accepted", cell);
            assert!(err.to_string().contains(cell));
        }
    }

    #[test]
    fn test_skip_lines() {
        assert_eq!(skip_lines("a\nb\nc", 2), "c");
        assert_eq!(skip_lines("a\n", 4), "");
    }
}
