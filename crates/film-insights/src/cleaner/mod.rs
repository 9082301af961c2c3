//! Data cleaning module.
//!
//! A [`CleaningPlan`] assigns at most one [`ColumnRule`] to each column.
//! [`TableCleaner::clean`] applies the plan once:
//!
//! 1. Row-drop masks are taken from the raw columns.
//! 2. Each imputation rule coerces (if asked) and fills its own column,
//!    with fill statistics computed from that column before replacement.
//! 3. Rows flagged in step 1 are removed.
//!
//! Rules never read a column another rule has written, so the order of rules
//! in a plan does not change the result.

mod converters;

use crate::error::{AnalysisError, Result};
use crate::imputers::{Imputed, StatisticalImputer};
use crate::types::{CleaningReport, FillScalar, TableKind, columns};
use crate::utils::{DtypeCategory, get_dtype_category};
use converters::coerce_numeric;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// What to do with the missing entries of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Imputation {
    /// Replace with the mean of the non-null values
    Mean,
    /// Replace with the median of the non-null values
    Median,
    /// Replace with the most frequent value
    Mode,
    /// Drop every row where the column is null
    DropRow,
}

/// Cleaning rule for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub column: String,
    /// Strip thousands separators and parse as Float64 before imputing.
    pub coerce_numeric: bool,
    pub imputation: Imputation,
}

impl ColumnRule {
    pub fn new(column: impl Into<String>, imputation: Imputation) -> Self {
        Self {
            column: column.into(),
            coerce_numeric: false,
            imputation,
        }
    }

    pub fn mean(column: impl Into<String>) -> Self {
        Self::new(column, Imputation::Mean)
    }

    pub fn median(column: impl Into<String>) -> Self {
        Self::new(column, Imputation::Median)
    }

    pub fn mode(column: impl Into<String>) -> Self {
        Self::new(column, Imputation::Mode)
    }

    pub fn drop_row(column: impl Into<String>) -> Self {
        Self::new(column, Imputation::DropRow)
    }

    pub fn with_numeric_coercion(mut self) -> Self {
        self.coerce_numeric = true;
        self
    }
}

/// Ordered set of column rules, one rule per column at most.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningPlan {
    rules: Vec<ColumnRule>,
}

impl CleaningPlan {
    /// Build a plan, rejecting any column that appears twice.
    pub fn new(rules: Vec<ColumnRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.column.as_str()) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "column '{}' would be cleaned twice",
                    rule.column
                )));
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[ColumnRule] {
        &self.rules
    }

    /// The fixed plan used for each source table.
    pub fn for_table(table: TableKind) -> Self {
        let rules = match table {
            TableKind::TitleBasics => vec![
                ColumnRule::mean(columns::RUNTIME_MINUTES),
                ColumnRule::mode(columns::GENRES),
            ],
            TableKind::MovieGross => vec![
                ColumnRule::mean(columns::DOMESTIC_GROSS),
                ColumnRule::median(columns::FOREIGN_GROSS).with_numeric_coercion(),
                ColumnRule::drop_row(columns::STUDIO),
                ColumnRule::drop_row(columns::TITLE),
                ColumnRule::drop_row(columns::YEAR),
            ],
            TableKind::TitleRatings => vec![ColumnRule::drop_row(columns::TCONST)],
        };
        Self { rules }
    }

    /// Derive a plan from dtypes for every column that has nulls.
    ///
    /// Numeric columns get `numeric`, string columns get `categorical`, and
    /// anything else has its null rows dropped.
    pub fn infer(df: &DataFrame, numeric: Imputation, categorical: Imputation) -> Self {
        let rules = df
            .get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .map(|col| {
                let imputation = match get_dtype_category(col.dtype()) {
                    DtypeCategory::Numeric => numeric,
                    DtypeCategory::String => categorical,
                    DtypeCategory::Other => Imputation::DropRow,
                };
                ColumnRule::new(col.name().to_string(), imputation)
            })
            .collect();
        Self { rules }
    }

    fn validate_against(&self, df: &DataFrame) -> Result<()> {
        for rule in &self.rules {
            if df.column(&rule.column).is_err() {
                return Err(AnalysisError::ColumnNotFound(rule.column.clone()));
            }
        }
        Ok(())
    }
}

/// Applies a [`CleaningPlan`] to a table.
pub struct TableCleaner;

impl TableCleaner {
    /// Clean a table, consuming the raw frame and returning a new one.
    pub fn clean(df: DataFrame, plan: &CleaningPlan) -> Result<(DataFrame, CleaningReport)> {
        plan.validate_against(&df)?;

        let mut report = CleaningReport {
            rows_before: df.height(),
            ..Default::default()
        };
        let mut df = df;

        // Drop masks come from the raw columns, before any replacement.
        let mut drop_mask: Option<BooleanChunked> = None;
        for rule in plan.rules().iter().filter(|r| r.imputation == Imputation::DropRow) {
            let column = df.column(&rule.column)?;
            let nulls = column.as_materialized_series().is_null();
            debug!("'{}': {} rows flagged for removal", rule.column, column.null_count());
            drop_mask = Some(match drop_mask {
                Some(mask) => &mask | &nulls,
                None => nulls,
            });
        }

        for rule in plan.rules() {
            let Some(impute) = Self::imputer_for(rule.imputation) else {
                continue;
            };
            let original = df.column(&rule.column)?.as_materialized_series().clone();

            let series = if rule.coerce_numeric {
                let coerced = coerce_numeric(&original)?;
                if original.dtype() != coerced.dtype() {
                    report.actions.push(format!(
                        "Converted '{}' from {} to Float64",
                        rule.column,
                        original.dtype()
                    ));
                }
                coerced
            } else {
                original
            };

            if series.null_count() == 0 {
                df.replace(&rule.column, series)?;
                debug!("'{}' has no missing values", rule.column);
                continue;
            }

            let Imputed { series: filled, fill } = impute(&series)?;

            if matches!(rule.imputation, Imputation::Mean | Imputation::Median) {
                debug!(
                    "'{}' mean before fill: {:?}, after fill: {:?}",
                    rule.column,
                    series.mean(),
                    filled.mean()
                );
            }

            report.actions.push(match &fill.value {
                FillScalar::Number(v) => format!(
                    "Filled {} missing '{}' values with {}: {:.2}",
                    fill.filled, rule.column, fill.method, v
                ),
                FillScalar::Text(v) => format!(
                    "Filled {} missing '{}' values with {}: '{}'",
                    fill.filled, rule.column, fill.method, v
                ),
            });
            report.fill_values.push(fill);
            df.replace(&rule.column, filled)?;
        }

        if let Some(mask) = drop_mask {
            let before = df.height();
            df = df.filter(&!&mask)?;
            let dropped = before - df.height();
            if dropped > 0 {
                report.actions.push(format!(
                    "Dropped {} rows with missing values in {:?}",
                    dropped,
                    plan.rules()
                        .iter()
                        .filter(|r| r.imputation == Imputation::DropRow)
                        .map(|r| r.column.as_str())
                        .collect::<Vec<_>>()
                ));
            }
        }

        report.rows_after = df.height();
        report.rows_dropped = report.rows_before - report.rows_after;

        info!(
            "Cleaned table: {} -> {} rows, {} columns imputed",
            report.rows_before,
            report.rows_after,
            report.fill_values.len()
        );

        Ok((df, report))
    }

    /// Fill function for an imputation, `None` for row drops.
    fn imputer_for(imputation: Imputation) -> Option<fn(&Series) -> Result<Imputed>> {
        match imputation {
            Imputation::Mean => Some(StatisticalImputer::apply_numeric_mean),
            Imputation::Median => Some(StatisticalImputer::apply_numeric_median),
            Imputation::Mode => Some(StatisticalImputer::apply_mode),
            Imputation::DropRow => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gross_frame() -> DataFrame {
        df![
            "title" => ["Toy Story 3", "Inception", "Shrek Forever After", "Salt", "Unknown"],
            "studio" => [Some("BV"), Some("WB"), Some("P/DW"), None, Some("Sony")],
            "domestic_gross" => [Some(415.0), Some(292.0), None, Some(118.0), None],
            "foreign_gross" => [Some("652,000"), Some("535,700"), None, Some(""), Some("1,200")],
            "year" => [2010i64, 2010, 2010, 2010, 2010],
        ]
        .unwrap()
    }

    // ========================================================================
    // CleaningPlan tests
    // ========================================================================

    #[test]
    fn test_plan_rejects_duplicate_column() {
        let result = CleaningPlan::new(vec![
            ColumnRule::mean("runtime_minutes"),
            ColumnRule::median("runtime_minutes"),
        ]);
        let err = result.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(err.to_string().contains("cleaned twice"));
    }

    #[test]
    fn test_plan_for_movie_gross() {
        let plan = CleaningPlan::for_table(TableKind::MovieGross);
        assert_eq!(plan.rules().len(), 5);
        assert!(plan.rules()[1].coerce_numeric);
        let dropped: Vec<&str> = plan
            .rules()
            .iter()
            .filter(|r| r.imputation == Imputation::DropRow)
            .map(|r| r.column.as_str())
            .collect();
        assert_eq!(dropped, vec!["studio", "title", "year"]);
    }

    #[test]
    fn test_plan_infer_from_dtypes() {
        let df = df![
            "a" => [Some(1.0), None],
            "b" => [Some("x"), None],
            "c" => [1i64, 2],
        ]
        .unwrap();

        let plan = CleaningPlan::infer(&df, Imputation::Median, Imputation::Mode);
        assert_eq!(
            plan.rules(),
            &[ColumnRule::median("a"), ColumnRule::mode("b")]
        );
    }

    // ========================================================================
    // TableCleaner::clean() tests
    // ========================================================================

    #[test]
    fn test_clean_movie_gross() {
        let plan = CleaningPlan::for_table(TableKind::MovieGross);
        let (cleaned, report) = TableCleaner::clean(gross_frame(), &plan).unwrap();

        // "Salt" has no studio and is dropped.
        assert_eq!(cleaned.height(), 4);
        assert_eq!(report.rows_dropped, 1);
        for name in ["studio", "domestic_gross", "foreign_gross"] {
            assert_eq!(cleaned.column(name).unwrap().null_count(), 0, "{name}");
        }

        // Mean of 415, 292, 118 computed before the row drop.
        let domestic: Vec<Option<f64>> = cleaned
            .column("domestic_gross")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(domestic[2], Some(275.0));
        assert_eq!(domestic[3], Some(275.0));

        // Median of 652000, 535700, 1200.
        let foreign: Vec<Option<f64>> = cleaned
            .column("foreign_gross")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(foreign, vec![Some(652000.0), Some(535700.0), Some(535700.0), Some(1200.0)]);
    }

    #[test]
    fn test_clean_movie_gross_drops_missing_title_and_year() {
        let df = df![
            "title" => [Some("A"), None, Some("C")],
            "studio" => ["BV", "WB", "Sony"],
            "domestic_gross" => [1.0, 2.0, 3.0],
            "foreign_gross" => ["10", "20", "30"],
            "year" => [Some(2010i64), Some(2011), None],
        ]
        .unwrap();

        let plan = CleaningPlan::for_table(TableKind::MovieGross);
        let (cleaned, report) = TableCleaner::clean(df, &plan).unwrap();

        assert_eq!(cleaned.height(), 1);
        assert_eq!(report.rows_dropped, 2);
        assert_eq!(cleaned.column("title").unwrap().null_count(), 0);
        assert_eq!(cleaned.column("year").unwrap().null_count(), 0);
        assert_eq!(cleaned.column("title").unwrap().str().unwrap().get(0), Some("A"));
    }

    #[test]
    fn test_clean_nan_string_is_filled_like_a_missing_value() {
        let df = df![
            "foreign_gross" => [Some("1,200"), Some("nan"), None, Some("3,400")],
        ]
        .unwrap();
        let plan = CleaningPlan::new(vec![ColumnRule::median("foreign_gross").with_numeric_coercion()]).unwrap();

        let (cleaned, report) = TableCleaner::clean(df, &plan).unwrap();

        let values: Vec<Option<f64>> = cleaned
            .column("foreign_gross")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(1200.0), Some(2300.0), Some(2300.0), Some(3400.0)]);
        assert_eq!(report.fill_values[0].filled, 2);
    }

    #[test]
    fn test_clean_foreign_gross_example() {
        let df = df![
            "foreign_gross" => ["1,200", "", "3,400"],
        ]
        .unwrap();
        let plan = CleaningPlan::new(vec![ColumnRule::median("foreign_gross").with_numeric_coercion()]).unwrap();

        let (cleaned, report) = TableCleaner::clean(df, &plan).unwrap();

        let values: Vec<Option<f64>> = cleaned
            .column("foreign_gross")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(1200.0), Some(2300.0), Some(3400.0)]);
        assert_eq!(report.fill_values.len(), 1);
    }

    #[test]
    fn test_clean_mean_preserved() {
        let df = df![
            "runtime_minutes" => [Some(80.0), None, Some(95.0), None, Some(110.0)],
        ]
        .unwrap();
        let before = df.column("runtime_minutes").unwrap().as_materialized_series().mean().unwrap();

        let plan = CleaningPlan::new(vec![ColumnRule::mean("runtime_minutes")]).unwrap();
        let (cleaned, _) = TableCleaner::clean(df, &plan).unwrap();

        let after = cleaned
            .column("runtime_minutes")
            .unwrap()
            .as_materialized_series()
            .mean()
            .unwrap();
        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let plan = CleaningPlan::for_table(TableKind::MovieGross);
        let (once, _) = TableCleaner::clean(gross_frame(), &plan).unwrap();
        let (twice, report) = TableCleaner::clean(once.clone(), &plan).unwrap();

        assert!(once.equals_missing(&twice));
        assert!(report.fill_values.is_empty());
        assert_eq!(report.rows_dropped, 0);
    }

    #[test]
    fn test_clean_rule_order_does_not_matter() {
        let forward = CleaningPlan::for_table(TableKind::MovieGross);
        let mut reversed_rules = forward.rules().to_vec();
        reversed_rules.reverse();
        let reversed = CleaningPlan::new(reversed_rules).unwrap();

        let (a, _) = TableCleaner::clean(gross_frame(), &forward).unwrap();
        let (b, _) = TableCleaner::clean(gross_frame(), &reversed).unwrap();
        assert!(a.equals_missing(&b));
    }

    #[test]
    fn test_clean_unknown_column() {
        let plan = CleaningPlan::new(vec![ColumnRule::mode("genres")]).unwrap();
        let err = TableCleaner::clean(gross_frame(), &plan).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_clean_unparsable_foreign_gross_is_fatal() {
        let df = df![
            "foreign_gross" => ["1,200", "lots"],
        ]
        .unwrap();
        let plan = CleaningPlan::new(vec![ColumnRule::median("foreign_gross").with_numeric_coercion()]).unwrap();

        let err = TableCleaner::clean(df, &plan).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_CONVERSION_FAILED");
    }

    #[test]
    fn test_clean_does_not_touch_unplanned_columns() {
        let df = df![
            "primary_title" => ["A", "B"],
            "original_title" => [None, Some("B")],
            "genres" => [None, Some("Drama")],
        ]
        .unwrap();
        let plan = CleaningPlan::new(vec![ColumnRule::mode("genres")]).unwrap();

        let (cleaned, _) = TableCleaner::clean(df, &plan).unwrap();
        assert_eq!(cleaned.height(), 2);
        assert_eq!(cleaned.column("original_title").unwrap().null_count(), 1);
    }
}
