//! Shared utilities for the analysis.
//!
//! Small Series-level helpers used by the profiler, the cleaner and the join
//! layer: dtype classification, numeric string parsing, null filling, and
//! title normalization.

use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for cleaning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if matches!(dtype, DataType::String) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters used in numeric formatting that are stripped before parsing.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Clean a string for numeric parsing by removing formatting characters.
///
/// ```rust,ignore
/// assert_eq!(clean_numeric_string("1,131.6"), "1131.6");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !NUMERIC_FORMAT_CHARS.contains(c))
        .collect()
}

/// Try to parse a string as a numeric value (f64).
///
/// Returns `None` for blank input and for anything that is still not a
/// number once thousands separators and currency symbols are gone.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Normalize a film title for fuzzy joining: lower-case, punctuation
/// dropped, runs of whitespace collapsed to a single space.
pub fn normalize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Most frequent non-null value of a Series, rendered as a string.
///
/// Ties go to the value that appears first in row order.
pub fn string_mode(series: &Series) -> Option<String> {
    let str_series = series.cast(&DataType::String).ok()?;
    let values = str_series.str().ok()?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for val in values.into_iter().flatten() {
        *counts.entry(val).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for val in values.into_iter().flatten() {
        let count = counts.get(val).copied().unwrap_or(0);
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((val, count));
        }
    }

    best.map(|(val, _)| val.to_string())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let floats = series.cast(&DataType::Float64)?;
    let result_vec: Vec<Option<f64>> = floats
        .f64()?
        .into_iter()
        .map(|val| Some(val.unwrap_or(fill_value)))
        .collect();

    Ok(Series::new(series.name().clone(), result_vec))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let strings = series.cast(&DataType::String)?;
    let result_vec: Vec<Option<&str>> = strings
        .str()?
        .into_iter()
        .map(|val| Some(val.unwrap_or(fill_value)))
        .collect();

    Ok(Series::new(series.name().clone(), result_vec))
}

// =============================================================================
// Tests
// =============================================================================
