//! Join and aggregate stage.
//!
//! [`join_catalog`] builds the three-way catalog; the functions in
//! [`queries`] derive every table the charts and the report consume.
//! [`AggregateTables::compute`] runs them all with the configured limits.

mod histogram;
mod join;
pub mod queries;

pub use histogram::equal_width_bins;
pub use join::join_catalog;
pub use queries::{GrossKind, RankMetric};

use crate::config::AnalysisConfig;
use crate::error::{Result, ResultExt};
use crate::types::HistogramBin;
use polars::prelude::*;
use tracing::info;

/// Every derived table of one analysis run.
#[derive(Debug, Clone)]
pub struct AggregateTables {
    pub movies_per_year: DataFrame,
    pub top_by_votes: DataFrame,
    pub top_by_foreign_gross: DataFrame,
    pub top_by_rating: DataFrame,
    pub domestic_by_genre: DataFrame,
    pub foreign_by_genre: DataFrame,
    pub popular_studios: DataFrame,
    pub runtime_histogram: Vec<HistogramBin>,
}

impl AggregateTables {
    /// Run every query. `basics` is the cleaned title-basics table and
    /// `catalog` the joined catalog.
    pub fn compute(basics: &DataFrame, catalog: &DataFrame, config: &AnalysisConfig) -> Result<Self> {
        let tables = Self {
            movies_per_year: queries::movies_per_year(basics, config.min_movies_per_year)?,
            top_by_votes: queries::top_titles(catalog, RankMetric::NumVotes, config.top_n)?,
            top_by_foreign_gross: queries::top_titles(catalog, RankMetric::ForeignGross, config.top_n)?,
            top_by_rating: queries::top_titles(catalog, RankMetric::AverageRating, config.top_n)?,
            domestic_by_genre: queries::genre_gross_totals(catalog, GrossKind::Domestic, config.genre_top_n)?,
            foreign_by_genre: queries::genre_gross_totals(catalog, GrossKind::Foreign, config.genre_top_n)?,
            popular_studios: queries::popular_studios(catalog, config.studio_top_n)?,
            runtime_histogram: queries::runtime_distribution(catalog, config.runtime_bins)
                .context("Binning runtimes")?,
        };
        info!(
            "Computed aggregates: {} years, {} studios, {} runtime bins",
            tables.movies_per_year.height(),
            tables.popular_studios.height(),
            tables.runtime_histogram.len()
        );
        Ok(tables)
    }

    /// Named frames in a fixed order, for reporting and printing.
    pub fn frames(&self) -> [(&'static str, &DataFrame); 7] {
        [
            ("movies_per_year", &self.movies_per_year),
            ("top_by_votes", &self.top_by_votes),
            ("top_by_foreign_gross", &self.top_by_foreign_gross),
            ("top_by_rating", &self.top_by_rating),
            ("domestic_by_genre", &self.domestic_by_genre),
            ("foreign_by_genre", &self.foreign_by_genre),
            ("popular_studios", &self.popular_studios),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_respects_limits() {
        let basics = df![
            "start_year" => [2010i64, 2010, 2011],
        ]
        .unwrap();
        let catalog = df![
            "title" => ["A", "B", "C"],
            "genres" => ["Drama", "Drama", "Action"],
            "studio" => ["BV", "WB", "BV"],
            "runtime_minutes" => [90.0, 100.0, 110.0],
            "domestic_gross" => [1.0, 2.0, 3.0],
            "foreign_gross" => [3.0, 2.0, 1.0],
            "averagerating" => [5.0, 6.0, 7.0],
            "numvotes" => [10i64, 20, 30],
        ]
        .unwrap();
        let config = AnalysisConfig::builder()
            .top_n(2)
            .genre_top_n(1)
            .studio_top_n(1)
            .min_movies_per_year(0)
            .runtime_bins(4)
            .build()
            .unwrap();

        let tables = AggregateTables::compute(&basics, &catalog, &config).unwrap();

        assert_eq!(tables.movies_per_year.height(), 2);
        assert_eq!(tables.top_by_votes.height(), 2);
        assert_eq!(tables.domestic_by_genre.height(), 1);
        assert_eq!(tables.popular_studios.height(), 1);
        assert_eq!(tables.runtime_histogram.len(), 4);
        assert_eq!(tables.frames().len(), 7);
    }
}
