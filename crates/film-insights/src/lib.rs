//! Film Market Analysis Library
//!
//! Box-office market analysis over the IMDb title tables and Box Office Mojo
//! gross figures, built with Rust and Polars.
//!
//! # Overview
//!
//! A run goes through these stages:
//!
//! - **Ingestion**: reads the three source tables (gzip or plain CSV) and profiles them
//! - **Cleaning**: coerces formatted numbers and fills missing values per a [`CleaningPlan`]
//! - **Joining**: inner-joins titles to gross data by name and to ratings by `tconst`
//! - **Aggregating**: per-year counts, top-N titles, per-genre gross totals,
//!   popular studios and a runtime histogram
//! - **Rendering**: one PNG bar chart per aggregate
//! - **Reporting**: an optional JSON report of the whole run
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use film_insights::{Analysis, AnalysisConfig, TitleMatch};
//!
//! let config = AnalysisConfig::builder()
//!     .data_dir("data")
//!     .output_dir("outputs")
//!     .title_match(TitleMatch::Normalized)
//!     .emit_report(true)
//!     .build()?;
//!
//! let result = Analysis::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("{}", result.aggregates.top_by_votes);
//! ```
//!
//! # Individual stages
//!
//! Every stage is usable on its own:
//!
//! ```rust,ignore
//! use film_insights::analysis::{join_catalog, queries};
//! use film_insights::{CleaningPlan, TableCleaner, TableKind, TitleMatch};
//!
//! let (gross, report) = TableCleaner::clean(raw_gross, &CleaningPlan::for_table(TableKind::MovieGross))?;
//! let (catalog, summary) = join_catalog(&basics, &gross, &ratings, TitleMatch::Exact)?;
//! let studios = queries::popular_studios(&catalog, 10)?;
//! ```

pub mod analysis;
pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod ingest;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analysis::{AggregateTables, GrossKind, RankMetric, join_catalog};
pub use charts::{BarChart, ChartColor};
pub use cleaner::{CleaningPlan, ColumnRule, Imputation, TableCleaner};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError, TitleMatch};
pub use error::{AnalysisError, ResultExt};
pub use imputers::StatisticalImputer;
pub use ingest::{SourceTables, load_sources, read_csv};
pub use pipeline::{
    Analysis, AnalysisBuilder, AnalysisResult, AnalysisStage, ClosureProgressReporter,
    ProgressReporter, ProgressUpdate,
};
pub use profiler::TableProfiler;
pub use reporting::{AnalysisReport, ReportGenerator};
pub use types::{
    CleaningReport, ColumnProfile, FillScalar, FillValue, HistogramBin, JoinSummary, TableCleaning,
    TableKind, TableProfile,
};
pub use utils::{
    DtypeCategory, clean_numeric_string, get_dtype_category, is_numeric_dtype, normalize_title,
    parse_numeric_string,
};
