//! CSV selection and filtering.
//!
//! This module turns a per-species CSV table into the aligned
//! covariate/response arrays the fitter consumes.
//!
//! Design goals:
//! - **Strict schema** for the named columns (clear errors, exit code 3)
//! - **Row-level tolerance**: unparseable rows are droppable, not fatal
//! - **Deterministic behavior**: filters are exact matches, years inclusive
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::error::ModelError;
use crate::keys::snake_case_string;

/// Filter and column options for [`get_df`].
#[derive(Debug, Clone)]
pub struct SelectorOptions {
    /// Inclusive `[lower, upper]` year filter; `None` skips the filter.
    pub year_interval: Option<[i32; 2]>,
    /// Exact sex match (case-insensitive); `None` passes every row through.
    pub sex: Option<String>,
    /// Exact location match (case-insensitive); `None` passes every row through.
    pub location: Option<String>,
    /// Response column name (e.g. fork length `fl`).
    pub response_var: String,
    /// Explanatory column name (e.g. `age`).
    pub explanatory_var: String,
    /// Drop rows whose selected values fail to parse instead of erroring.
    pub drop_na: bool,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        SelectorOptions {
            year_interval: None,
            sex: None,
            location: None,
            response_var: "fl".to_string(),
            explanatory_var: "age".to_string(),
            drop_na: true,
        }
    }
}

/// Aligned covariate/response arrays after filtering.
///
/// `x[i]` and `y[i]` always come from the same source row.
#[derive(Debug, Clone, Default)]
pub struct DataSelection {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl DataSelection {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Load a CSV table and select filtered covariate/response arrays.
///
/// Filters: year within the inclusive interval, exact (case-insensitive)
/// matches on sex/location when supplied. No matching rows is an empty
/// result, not an error; a *missing named column* is a data error.
pub fn get_df(
    data_dir: &Path,
    data_file: &str,
    options: &SelectorOptions,
) -> Result<DataSelection, ModelError> {
    let path = data_dir.join(data_file);
    let file = File::open(&path)
        .map_err(|e| ModelError::data(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| ModelError::data(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let x_col = resolve_column(&header_map, &options.explanatory_var, &path)?;
    let y_col = resolve_column(&header_map, &options.response_var, &path)?;

    // Filter columns are only required when the matching filter is active.
    let year_col = match options.year_interval {
        Some(_) => Some(resolve_column(&header_map, "year", &path)?),
        None => None,
    };
    let sex_col = match options.sex {
        Some(_) => Some(resolve_column(&header_map, "sex", &path)?),
        None => None,
    };
    let location_col = match options.location {
        Some(_) => Some(resolve_column(&header_map, "location", &path)?),
        None => None,
    };

    let mut selection = DataSelection::default();

    for (line, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| ModelError::data(format!("Failed to read CSV row: {e}")))?;
        selection.rows_read += 1;

        if let (Some(col), Some([lower, upper])) = (year_col, options.year_interval) {
            match parse_year(&record, col) {
                Some(year) => {
                    if year < lower || year > upper {
                        continue;
                    }
                }
                None if options.drop_na => continue,
                None => {
                    return Err(ModelError::data(format!(
                        "Unparseable year on data row {}.",
                        line + 1
                    )));
                }
            }
        }

        if let (Some(col), Some(want)) = (sex_col, options.sex.as_deref()) {
            if !field_matches(&record, col, want) {
                continue;
            }
        }
        if let (Some(col), Some(want)) = (location_col, options.location.as_deref()) {
            if !field_matches(&record, col, want) {
                continue;
            }
        }

        let xv = parse_value(&record, x_col);
        let yv = parse_value(&record, y_col);
        match (xv, yv) {
            (Some(xv), Some(yv)) => {
                selection.x.push(xv);
                selection.y.push(yv);
                selection.rows_used += 1;
            }
            _ if options.drop_na => continue,
            _ => {
                return Err(ModelError::data(format!(
                    "Unparseable '{}'/'{}' value on data row {}.",
                    options.explanatory_var,
                    options.response_var,
                    line + 1
                )));
            }
        }
    }

    Ok(selection)
}

/// Map snake-cased header names to column indices (first occurrence wins).
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        map.entry(snake_case_string(name)).or_insert(idx);
    }
    map
}

fn resolve_column(
    header_map: &HashMap<String, usize>,
    name: &str,
    path: &Path,
) -> Result<usize, ModelError> {
    header_map
        .get(&snake_case_string(name))
        .copied()
        .ok_or_else(|| {
            ModelError::data(format!(
                "Column '{name}' not found in '{}'.",
                path.display()
            ))
        })
}

fn parse_value(record: &StringRecord, col: usize) -> Option<f64> {
    let field = record.get(col)?.trim();
    if field.is_empty() {
        return None;
    }
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_year(record: &StringRecord, col: usize) -> Option<i32> {
    let field = record.get(col)?.trim();
    if field.is_empty() {
        return None;
    }
    // Accept both integer years and float-formatted exports ("2010.0").
    field
        .parse::<i32>()
        .ok()
        .or_else(|| field.parse::<f64>().ok().map(|v| v as i32))
}

fn field_matches(record: &StringRecord, col: usize, want: &str) -> bool {
    record
        .get(col)
        .map(|field| field.trim().eq_ignore_ascii_case(want.trim()))
        .unwrap_or(false)
}
