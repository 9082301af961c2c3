//! Type conversion functions for data cleaning.

use crate::error::{AnalysisError, Result};
use crate::utils::{is_numeric_dtype, parse_numeric_string};
use polars::prelude::*;

/// Convert a string column holding formatted numbers ("1,131.6") to Float64.
///
/// Blank strings and "nan" become nulls. Any other value that does not
/// parse to a finite number once separators are stripped, "inf" included,
/// fails the whole conversion. A column that is
/// already numeric is cast to Float64.
pub(crate) fn coerce_numeric(series: &Series) -> Result<Series> {
    if is_numeric_dtype(series.dtype()) {
        return Ok(series.cast(&DataType::Float64)?);
    }

    let column = series.name().to_string();
    let str_series = series.str().map_err(|_| AnalysisError::TypeConversionFailed {
        column: column.clone(),
        target_type: "Float64".to_string(),
        reason: format!("expected a string column, found {}", series.dtype()),
    })?;

    let mut result_vec: Vec<Option<f64>> = Vec::with_capacity(str_series.len());
    for (row, opt_val) in str_series.into_iter().enumerate() {
        match opt_val {
            None => result_vec.push(None),
            Some(raw) if raw.trim().is_empty() => result_vec.push(None),
            Some(raw) => match parse_numeric_string(raw) {
                Some(val) if val.is_nan() => result_vec.push(None),
                Some(val) if val.is_finite() => result_vec.push(Some(val)),
                Some(_) => {
                    return Err(AnalysisError::TypeConversionFailed {
                        column,
                        target_type: "Float64".to_string(),
                        reason: format!("row {}: non-finite value '{}'", row, raw),
                    });
                }
                None => {
                    return Err(AnalysisError::TypeConversionFailed {
                        column,
                        target_type: "Float64".to_string(),
                        reason: format!("row {}: unparsable value '{}'", row, raw),
                    });
                }
            },
        }
    }

    Ok(Series::new(series.name().clone(), result_vec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_thousands_separators() {
        let series = Series::new("foreign_gross".into(), &[Some("1,200"), Some(""), Some("3,400"), None]);

        let coerced = coerce_numeric(&series).unwrap();

        let values: Vec<Option<f64>> = coerced.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1200.0), None, Some(3400.0), None]);
    }

    #[test]
    fn test_coerce_decimal_with_separator() {
        let series = Series::new("foreign_gross".into(), &["1,131.6", "652000000"]);

        let coerced = coerce_numeric(&series).unwrap();
        let values: Vec<Option<f64>> = coerced.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1131.6), Some(652000000.0)]);
    }

    #[test]
    fn test_coerce_numeric_passthrough() {
        let series = Series::new("domestic_gross".into(), &[Some(1i64), None]);

        let coerced = coerce_numeric(&series).unwrap();
        assert_eq!(coerced.dtype(), &DataType::Float64);
        assert_eq!(coerced.null_count(), 1);
    }

    #[test]
    fn test_coerce_unparsable_is_fatal() {
        let series = Series::new("foreign_gross".into(), &["1,200", "about 3k"]);

        let err = coerce_numeric(&series).unwrap_err();
        match err {
            AnalysisError::TypeConversionFailed { column, reason, .. } => {
                assert_eq!(column, "foreign_gross");
                assert!(reason.contains("row 1"));
                assert!(reason.contains("about 3k"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_coerce_nan_is_missing() {
        let series = Series::new("foreign_gross".into(), &[Some("1,200"), Some("nan"), Some("NaN"), None]);

        let coerced = coerce_numeric(&series).unwrap();
        let values: Vec<Option<f64>> = coerced.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1200.0), None, None, None]);
    }

    #[test]
    fn test_coerce_infinity_is_fatal() {
        for raw in ["inf", "-Infinity"] {
            let series = Series::new("foreign_gross".into(), &["1,200", raw]);

            let err = coerce_numeric(&series).unwrap_err();
            match err {
                AnalysisError::TypeConversionFailed { reason, .. } => {
                    assert!(reason.contains("row 1"), "{reason}");
                    assert!(reason.contains(raw), "{reason}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_coerce_rejects_non_string_non_numeric() {
        let series = Series::new("flag".into(), &[true, false]);
        assert!(coerce_numeric(&series).is_err());
    }
}
