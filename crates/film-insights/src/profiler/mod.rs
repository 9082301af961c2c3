//! Table profiling.
//!
//! Summarizes a raw table before cleaning: shape, per-column dtype and null
//! counts, duplicate rows, and the mean of numeric columns. The profile is
//! logged and carried into the report so the effect of imputation can be
//! compared against the untouched data.

use crate::error::Result;
use crate::types::{ColumnProfile, TableKind, TableProfile};
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use tracing::{debug, info};

/// Builds [`TableProfile`]s.
pub struct TableProfiler;

impl TableProfiler {
    /// Profile one table.
    pub fn profile(table: TableKind, df: &DataFrame) -> Result<TableProfile> {
        let height = df.height();
        let mut column_profiles = Vec::with_capacity(df.width());

        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let null_count = series.null_count();
            let null_percentage = if height == 0 {
                0.0
            } else {
                null_count as f64 / height as f64 * 100.0
            };
            let mean = if is_numeric_dtype(series.dtype()) {
                series.mean()
            } else {
                None
            };

            column_profiles.push(ColumnProfile {
                name: series.name().to_string(),
                dtype: format!("{}", series.dtype()),
                null_count,
                null_percentage,
                unique_count: series.n_unique()?,
                mean,
            });
        }

        let duplicate_count = if df.width() == 0 {
            0
        } else {
            height - df.unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?.height()
        };

        let profile = TableProfile {
            table,
            shape: df.shape(),
            column_profiles,
            duplicate_count,
        };
        Self::log_profile(&profile);
        Ok(profile)
    }

    fn log_profile(profile: &TableProfile) {
        info!(
            "Profiled {}: {:?}, {} missing values, {} duplicate rows",
            profile.table,
            profile.shape,
            profile.total_nulls(),
            profile.duplicate_count
        );
        for col in &profile.column_profiles {
            if col.null_count > 0 {
                debug!(
                    "  {} ({}): {} missing ({:.1}%)",
                    col.name, col.dtype, col.null_count, col.null_percentage
                );
            }
        }
    }
}
