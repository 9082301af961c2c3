//! Statistical imputation methods.
//!
//! Provides mean, median and mode imputation. Every fill statistic is taken
//! from the non-null values of the input before anything is replaced.

use crate::error::{AnalysisError, Result};
use crate::types::{FillScalar, FillValue};
use crate::utils::{fill_numeric_nulls, fill_string_nulls, is_numeric_dtype, string_mode};
use polars::prelude::*;
use tracing::debug;

/// A column with its nulls replaced, plus what it was filled with.
#[derive(Debug, Clone)]
pub struct Imputed {
    pub series: Series,
    pub fill: FillValue,
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill nulls with the arithmetic mean of the non-null values.
    pub fn apply_numeric_mean(series: &Series) -> Result<Imputed> {
        Self::require_numeric(series)?;
        let mean = series
            .mean()
            .ok_or_else(|| AnalysisError::NoValidValues(series.name().to_string()))?;
        Self::fill_with_value(series, mean, "mean")
    }

    /// Fill nulls with the median of the non-null values.
    pub fn apply_numeric_median(series: &Series) -> Result<Imputed> {
        Self::require_numeric(series)?;
        let median = series
            .median()
            .ok_or_else(|| AnalysisError::NoValidValues(series.name().to_string()))?;
        Self::fill_with_value(series, median, "median")
    }

    /// Fill nulls with the most frequent value. Ties go to the value seen
    /// first.
    pub fn apply_mode(series: &Series) -> Result<Imputed> {
        let mode = string_mode(series)
            .ok_or_else(|| AnalysisError::NoValidValues(series.name().to_string()))?;
        let filled = fill_string_nulls(series, &mode)?;
        debug!("Filled '{}' with mode: '{}'", series.name(), mode);

        Ok(Imputed {
            series: filled,
            fill: FillValue {
                column: series.name().to_string(),
                method: "mode".to_string(),
                value: FillScalar::Text(mode),
                filled: series.null_count(),
            },
        })
    }

    fn require_numeric(series: &Series) -> Result<()> {
        if is_numeric_dtype(series.dtype()) {
            Ok(())
        } else {
            Err(AnalysisError::TypeConversionFailed {
                column: series.name().to_string(),
                target_type: "Float64".to_string(),
                reason: format!(
                    "column is {}; numeric imputation needs numeric coercion first",
                    series.dtype()
                ),
            })
        }
    }

    fn fill_with_value(series: &Series, fill_value: f64, method: &str) -> Result<Imputed> {
        let filled = fill_numeric_nulls(series, fill_value)?;
        debug!("Filled '{}' with {}: {:.2}", series.name(), method, fill_value);

        Ok(Imputed {
            series: filled,
            fill: FillValue {
                column: series.name().to_string(),
                method: method.to_string(),
                value: FillScalar::Number(fill_value),
                filled: series.null_count(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_values(series: &Series) -> Vec<Option<f64>> {
        series.f64().unwrap().into_iter().collect()
    }

    // ========================================================================
    // apply_numeric_mean() tests
    // ========================================================================

    #[test]
    fn test_apply_numeric_mean_basic() {
        let series = Series::new("runtime_minutes".into(), &[Some(80.0), None, Some(100.0)]);

        let imputed = StatisticalImputer::apply_numeric_mean(&series).unwrap();

        assert_eq!(imputed.series.null_count(), 0);
        assert_eq!(f64_values(&imputed.series), vec![Some(80.0), Some(90.0), Some(100.0)]);
        assert_eq!(imputed.fill.method, "mean");
        assert_eq!(imputed.fill.value, FillScalar::Number(90.0));
        assert_eq!(imputed.fill.filled, 1);
    }

    #[test]
    fn test_apply_numeric_mean_uses_pre_fill_statistic() {
        // Several nulls are all filled with the same value: the mean of the
        // original non-null values, never a running mean.
        let series = Series::new("v".into(), &[Some(10.0), None, None, Some(20.0), None]);

        let imputed = StatisticalImputer::apply_numeric_mean(&series).unwrap();

        assert_eq!(
            f64_values(&imputed.series),
            vec![Some(10.0), Some(15.0), Some(15.0), Some(20.0), Some(15.0)]
        );
        assert_eq!(imputed.series.mean(), series.mean());
    }

    #[test]
    fn test_apply_numeric_mean_integer_column_becomes_float() {
        let series = Series::new("runtime_minutes".into(), &[Some(91i64), None, Some(100)]);

        let imputed = StatisticalImputer::apply_numeric_mean(&series).unwrap();

        assert!(matches!(imputed.series.dtype(), DataType::Float64));
        assert_eq!(f64_values(&imputed.series)[1], Some(95.5));
    }

    #[test]
    fn test_apply_numeric_mean_all_nulls() {
        let series = Series::new("v".into(), &[Option::<f64>::None, None]);

        let err = StatisticalImputer::apply_numeric_mean(&series).unwrap_err();
        assert!(matches!(err, AnalysisError::NoValidValues(col) if col == "v"));
    }

    #[test]
    fn test_apply_numeric_mean_rejects_strings() {
        let series = Series::new("foreign_gross".into(), &[Some("1,200"), None]);

        let err = StatisticalImputer::apply_numeric_mean(&series).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_CONVERSION_FAILED");
    }

    // ========================================================================
    // apply_numeric_median() tests
    // ========================================================================

    #[test]
    fn test_apply_numeric_median_basic() {
        let series = Series::new("foreign_gross".into(), &[Some(1200.0), None, Some(3400.0)]);

        let imputed = StatisticalImputer::apply_numeric_median(&series).unwrap();

        assert_eq!(
            f64_values(&imputed.series),
            vec![Some(1200.0), Some(2300.0), Some(3400.0)]
        );
        assert_eq!(imputed.fill.method, "median");
    }

    #[test]
    fn test_apply_numeric_median_odd_count() {
        let series = Series::new("v".into(), &[Some(1.0), None, Some(3.0), None, Some(50.0)]);

        let imputed = StatisticalImputer::apply_numeric_median(&series).unwrap();
        assert_eq!(imputed.fill.value, FillScalar::Number(3.0));
        assert_eq!(imputed.fill.filled, 2);
    }

    // ========================================================================
    // apply_mode() tests
    // ========================================================================

    #[test]
    fn test_apply_mode_basic() {
        let series = Series::new(
            "genres".into(),
            &[Some("Drama"), Some("Comedy"), Some("Drama"), None, Some("Drama")],
        );

        let imputed = StatisticalImputer::apply_mode(&series).unwrap();

        let values: Vec<Option<&str>> = imputed.series.str().unwrap().into_iter().collect();
        assert_eq!(values[3], Some("Drama"));
        assert_eq!(imputed.series.null_count(), 0);
        assert_eq!(imputed.fill.value, FillScalar::Text("Drama".to_string()));
    }

    #[test]
    fn test_apply_mode_tie_breaking() {
        let series = Series::new("studio".into(), &[Some("Uni."), Some("BV"), None, Some("BV"), Some("Uni.")]);

        let imputed = StatisticalImputer::apply_mode(&series).unwrap();
        assert_eq!(imputed.fill.value, FillScalar::Text("Uni.".to_string()));
    }

    #[test]
    fn test_apply_mode_all_nulls() {
        let series = Series::new("genres".into(), &[Option::<&str>::None, None]);
        assert!(StatisticalImputer::apply_mode(&series).is_err());
    }
}
