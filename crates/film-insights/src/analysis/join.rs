//! The three-way inner join every aggregate reads.
//!
//! `title basics ⋈ movie gross` on title name, then `⋈ title ratings` on
//! `tconst`. Output rows follow title-basics order, then movie-gross order,
//! so ties in later sorts resolve the same way on every run.

use crate::config::TitleMatch;
use crate::error::{Result, ResultExt};
use crate::types::{JoinSummary, columns};
use crate::utils::normalize_title;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info, warn};

const TITLE_KEY: &str = "__title_key";
const BASICS_ROW: &str = "__basics_row";
const GROSS_ROW: &str = "__gross_row";

/// Join the cleaned tables into the catalog.
pub fn join_catalog(
    basics: &DataFrame,
    gross: &DataFrame,
    ratings: &DataFrame,
    title_match: TitleMatch,
) -> Result<(DataFrame, JoinSummary)> {
    let basics_keyed = with_title_key(basics, columns::PRIMARY_TITLE, title_match)?
        .with_row_index(BASICS_ROW.into(), None)?;
    let gross_keyed = with_title_key(gross, columns::TITLE, title_match)?
        .with_row_index(GROSS_ROW.into(), None)?;

    let unmatched_gross_rows = count_unmatched(&basics_keyed, &gross_keyed)?;
    if unmatched_gross_rows > 0 {
        warn!(
            "{} of {} gross rows have no {:?} title match and are excluded",
            unmatched_gross_rows,
            gross.height(),
            title_match
        );
    }

    let titled = basics_keyed
        .lazy()
        .join(
            gross_keyed.lazy(),
            [col(TITLE_KEY)],
            [col(TITLE_KEY)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()
        .context("Joining title basics to movie gross")?;
    debug!("Title join produced {} rows", titled.height());

    let catalog = titled
        .clone()
        .lazy()
        .join(
            ratings.clone().lazy(),
            [col(columns::TCONST)],
            [col(columns::TCONST)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([BASICS_ROW, GROSS_ROW], SortMultipleOptions::default())
        .collect()
        .context("Joining ratings on tconst")?
        .drop(TITLE_KEY)?
        .drop(BASICS_ROW)?
        .drop(GROSS_ROW)?;

    let summary = JoinSummary {
        basics_rows: basics.height(),
        gross_rows: gross.height(),
        ratings_rows: ratings.height(),
        title_matched_rows: titled.height(),
        unmatched_gross_rows,
        catalog_rows: catalog.height(),
    };
    info!(
        "Joined catalog: {} rows ({} title matches)",
        summary.catalog_rows, summary.title_matched_rows
    );

    Ok((catalog, summary))
}

/// Append the join key column derived from `title_column`.
fn with_title_key(df: &DataFrame, title_column: &str, title_match: TitleMatch) -> Result<DataFrame> {
    let titles = df.column(title_column)?.cast(&DataType::String)?;
    let key = match title_match {
        TitleMatch::Exact => titles.as_materialized_series().clone().with_name(TITLE_KEY.into()),
        TitleMatch::Normalized => {
            let keys: Vec<Option<String>> = titles
                .str()?
                .into_iter()
                .map(|t| t.map(normalize_title))
                .collect();
            Series::new(TITLE_KEY.into(), keys)
        }
    };

    let mut keyed = df.clone();
    keyed.with_column(key)?;
    Ok(keyed)
}

fn count_unmatched(basics: &DataFrame, gross: &DataFrame) -> Result<usize> {
    let basics_keys = basics.column(TITLE_KEY)?.str()?;
    let known: HashSet<&str> = basics_keys.into_iter().flatten().collect();

    let gross_keys = gross.column(TITLE_KEY)?.str()?;
    Ok(gross_keys
        .into_iter()
        .filter(|key| key.is_none_or(|k| !known.contains(k)))
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basics() -> DataFrame {
        df![
            "tconst" => ["tt1", "tt2", "tt3", "tt4"],
            "primary_title" => ["Inception", "Toy Story 3", "Spider-Man: Far From Home", "Salt"],
            "start_year" => [2010i64, 2010, 2019, 2010],
            "runtime_minutes" => [148.0, 103.0, 129.0, 100.0],
            "genres" => ["Action,Adventure,Sci-Fi", "Adventure,Animation,Comedy", "Action,Adventure,Sci-Fi", "Action,Thriller"],
        ]
        .unwrap()
    }

    fn gross() -> DataFrame {
        df![
            "title" => ["Toy Story 3", "Inception", "Spider-Man Far from Home", "Not In Basics"],
            "studio" => ["BV", "WB", "Sony", "IFC"],
            "domestic_gross" => [415.0, 292.0, 390.0, 1.0],
            "foreign_gross" => [652.0, 535.0, 741.0, 2.0],
            "year" => [2010i64, 2010, 2019, 2010],
        ]
        .unwrap()
    }

    fn ratings() -> DataFrame {
        df![
            "tconst" => ["tt2", "tt1", "tt3", "tt9"],
            "averagerating" => [8.3, 8.8, 7.5, 5.0],
            "numvotes" => [682218i64, 1841066, 300000, 10],
        ]
        .unwrap()
    }

    #[test]
    fn test_exact_join() {
        let (catalog, summary) = join_catalog(&basics(), &gross(), &ratings(), TitleMatch::Exact).unwrap();

        assert_eq!(catalog.height(), 2);
        assert_eq!(summary.title_matched_rows, 2);
        assert_eq!(summary.unmatched_gross_rows, 2);
        // Rows follow title-basics order.
        let titles: Vec<Option<&str>> = catalog.column("title").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(titles, vec![Some("Inception"), Some("Toy Story 3")]);
        assert!(catalog.column(TITLE_KEY).is_err());
        assert!(catalog.column(BASICS_ROW).is_err());
        assert!(catalog.column("averagerating").is_ok());
    }

    #[test]
    fn test_normalized_join_recovers_punctuation_mismatch() {
        let (catalog, summary) =
            join_catalog(&basics(), &gross(), &ratings(), TitleMatch::Normalized).unwrap();

        assert_eq!(catalog.height(), 3);
        assert_eq!(summary.unmatched_gross_rows, 1);
    }

    #[test]
    fn test_join_cardinality_bounds() {
        let (catalog, summary) = join_catalog(&basics(), &gross(), &ratings(), TitleMatch::Exact).unwrap();

        assert!(summary.catalog_rows <= summary.title_matched_rows.min(summary.ratings_rows));
        assert!(summary.title_matched_rows <= summary.basics_rows * summary.gross_rows);
        assert_eq!(summary.catalog_rows, catalog.height());
    }

    #[test]
    fn test_duplicate_titles_fan_out() {
        let basics = df![
            "tconst" => ["tt1", "tt2"],
            "primary_title" => ["Salt", "Salt"],
            "start_year" => [2010i64, 2014],
            "runtime_minutes" => [100.0, 90.0],
            "genres" => ["Action", "Drama"],
        ]
        .unwrap();
        let gross = df![
            "title" => ["Salt", "Salt"],
            "studio" => ["Sony", "IFC"],
            "domestic_gross" => [118.0, 1.0],
            "foreign_gross" => [175.0, 1.0],
            "year" => [2010i64, 2014],
        ]
        .unwrap();
        let ratings = df![
            "tconst" => ["tt1", "tt2"],
            "averagerating" => [6.4, 5.0],
            "numvotes" => [10i64, 20],
        ]
        .unwrap();

        let (catalog, _) = join_catalog(&basics, &gross, &ratings, TitleMatch::Exact).unwrap();
        assert_eq!(catalog.height(), 4);
        assert!(catalog.height() <= basics.height() * gross.height());
    }
}
