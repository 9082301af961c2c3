//! Aggregate queries over the cleaned tables and the joined catalog.
//!
//! Every query takes its input by reference and returns a new frame. Top-N
//! queries sort descending with `maintain_order`, so equal metrics keep input
//! order; grouped queries use stable grouping for the same reason.

use crate::analysis::histogram::equal_width_bins;
use crate::error::{Result, ResultExt};
use crate::types::{HistogramBin, columns};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Metric the top-titles query ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    NumVotes,
    ForeignGross,
    AverageRating,
}

impl RankMetric {
    pub const ALL: [RankMetric; 3] = [
        RankMetric::NumVotes,
        RankMetric::ForeignGross,
        RankMetric::AverageRating,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Self::NumVotes => columns::NUM_VOTES,
            Self::ForeignGross => columns::FOREIGN_GROSS,
            Self::AverageRating => columns::AVERAGE_RATING,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NumVotes => "votes",
            Self::ForeignGross => "foreign earnings",
            Self::AverageRating => "rating",
        }
    }
}

/// Which gross column a per-genre total sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrossKind {
    Domestic,
    Foreign,
}

impl GrossKind {
    pub fn source_column(&self) -> &'static str {
        match self {
            Self::Domestic => columns::DOMESTIC_GROSS,
            Self::Foreign => columns::FOREIGN_GROSS,
        }
    }

    pub fn total_column(&self) -> &'static str {
        match self {
            Self::Domestic => columns::TOTAL_DOMESTIC_GROSS,
            Self::Foreign => columns::TOTAL_FOREIGN_GROSS,
        }
    }
}

fn descending() -> SortMultipleOptions {
    SortMultipleOptions::default()
        .with_order_descending(true)
        .with_nulls_last(true)
        .with_maintain_order(true)
}

/// Number of titles per start year, keeping years with more than
/// `min_movies` titles, in ascending year order.
pub fn movies_per_year(basics: &DataFrame, min_movies: u32) -> Result<DataFrame> {
    let df = basics
        .clone()
        .lazy()
        .group_by([col(columns::START_YEAR)])
        .agg([len().alias(columns::N_MOVIES)])
        .filter(col(columns::N_MOVIES).gt(lit(min_movies)))
        .sort([columns::START_YEAR], SortMultipleOptions::default())
        .collect()
        .context("Counting movies per year")?;
    debug!("movies_per_year: {} years", df.height());
    Ok(df)
}

/// Top `n` catalog titles by `metric`, with their foreign gross, rating and
/// vote count.
pub fn top_titles(catalog: &DataFrame, metric: RankMetric, n: usize) -> Result<DataFrame> {
    let df = catalog
        .clone()
        .lazy()
        .select([
            col(columns::TITLE),
            col(columns::FOREIGN_GROSS),
            col(columns::AVERAGE_RATING),
            col(columns::NUM_VOTES),
        ])
        .sort([metric.column()], descending())
        .limit(n as IdxSize)
        .collect()
        .context(format!("Ranking titles by {}", metric.display_name()))?;
    debug!("top_titles({:?}): {} rows", metric, df.height());
    Ok(df)
}

/// Total gross per genre string, top `n` genres.
pub fn genre_gross_totals(catalog: &DataFrame, kind: GrossKind, n: usize) -> Result<DataFrame> {
    let df = catalog
        .clone()
        .lazy()
        .group_by_stable([col(columns::GENRES)])
        .agg([col(kind.source_column()).sum().alias(kind.total_column())])
        .sort([kind.total_column()], descending())
        .limit(n as IdxSize)
        .collect()
        .context(format!("Summing {} per genre", kind.source_column()))?;
    debug!("genre_gross_totals({:?}): {} rows", kind, df.height());
    Ok(df)
}

/// Studios with the most catalog titles, top `n`.
pub fn popular_studios(catalog: &DataFrame, n: usize) -> Result<DataFrame> {
    let df = catalog
        .clone()
        .lazy()
        .filter(col(columns::STUDIO).is_not_null())
        .group_by_stable([col(columns::STUDIO)])
        .agg([len().alias(columns::N_STUDIO)])
        .sort([columns::N_STUDIO], descending())
        .limit(n as IdxSize)
        .collect()
        .context("Counting titles per studio")?;
    debug!("popular_studios: {} rows", df.height());
    Ok(df)
}

/// Histogram of catalog runtimes.
pub fn runtime_distribution(catalog: &DataFrame, bins: usize) -> Result<Vec<HistogramBin>> {
    let runtimes = catalog.column(columns::RUNTIME_MINUTES)?.cast(&DataType::Float64)?;
    let values: Vec<f64> = runtimes.f64()?.into_iter().flatten().collect();
    Ok(equal_width_bins(&values, bins))
}
