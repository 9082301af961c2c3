//! The analysis pipeline and its builder.

use crate::analysis::{AggregateTables, join_catalog};
use crate::charts;
use crate::cleaner::{CleaningPlan, TableCleaner};
use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::error::{Result, ResultExt};
use crate::ingest::{SourceTables, load_sources};
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::profiler::TableProfiler;
use crate::reporting::ReportGenerator;
use crate::types::{JoinSummary, TableCleaning, TableKind, TableProfile};
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Everything one analysis run produced.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Profiles of the raw tables, in [`TableKind::ALL`] order.
    pub profiles: Vec<TableProfile>,
    /// The tables after cleaning.
    pub cleaned: SourceTables,
    pub cleaning: Vec<TableCleaning>,
    pub catalog: DataFrame,
    pub join: JoinSummary,
    pub aggregates: AggregateTables,
    /// PNG files written, empty when chart rendering is disabled.
    pub chart_paths: Vec<PathBuf>,
    /// Path of the JSON report, when one was written.
    pub report_path: Option<PathBuf>,
    pub duration_ms: u64,
}

impl AnalysisResult {
    pub fn cleaning_for(&self, table: TableKind) -> Option<&TableCleaning> {
        self.cleaning.iter().find(|c| c.table == table)
    }
}

/// Runs ingestion, cleaning, the catalog join, the aggregate queries, and
/// the optional chart and report outputs.
///
/// # Example
///
/// ```rust,ignore
/// use film_insights::{Analysis, AnalysisConfig};
///
/// let config = AnalysisConfig::builder()
///     .data_dir("data")
///     .render_charts(false)
///     .build()?;
///
/// let result = Analysis::builder()
///     .config(config)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run()?;
///
/// println!("{}", result.aggregates.top_by_votes);
/// ```
pub struct Analysis {
    config: AnalysisConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    reporter: ReportGenerator,
}

static_assertions::assert_impl_all!(Analysis: Send);

impl Analysis {
    pub fn builder() -> AnalysisBuilder {
        AnalysisBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the source tables named by the configuration and analyse them.
    pub fn run(&self) -> Result<AnalysisResult> {
        let start = Instant::now();
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Ingestion,
            0.0,
            "Loading source tables...",
        ));
        let sources = load_sources(&self.config).map_err(|e| {
            error!("Ingestion failed: {}", e);
            e
        })?;
        self.process_from(sources, start)
    }

    /// Analyse tables that are already in memory.
    pub fn process(&self, sources: SourceTables) -> Result<AnalysisResult> {
        self.process_from(sources, Instant::now())
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_from(&self, sources: SourceTables, start: Instant) -> Result<AnalysisResult> {
        match self.process_internal(sources, start) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Analysis finished in {} ms",
                    result.duration_ms
                )));
                Ok(result)
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                Err(e)
            }
        }
    }

    fn process_internal(&self, sources: SourceTables, start: Instant) -> Result<AnalysisResult> {
        sources.validate()?;

        let profiles = TableKind::ALL
            .iter()
            .map(|&kind| TableProfiler::profile(kind, sources.get(kind)))
            .collect::<Result<Vec<_>>>()?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Ingestion,
            1.0,
            "Source tables loaded",
        ));

        // Cleaning
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            0.0,
            "Cleaning tables...",
        ));
        info!("Cleaning source tables...");
        let SourceTables {
            title_basics,
            movie_gross,
            title_ratings,
        } = sources;

        let mut cleaning = Vec::with_capacity(TableKind::ALL.len());
        let mut clean = |kind: TableKind, df: DataFrame| -> Result<DataFrame> {
            let (df, report) = TableCleaner::clean(df, &CleaningPlan::for_table(kind))
                .context(format!("Cleaning {}", kind))?;
            cleaning.push(TableCleaning { table: kind, report });
            Ok(df)
        };
        let cleaned = SourceTables {
            title_basics: clean(TableKind::TitleBasics, title_basics)?,
            movie_gross: clean(TableKind::MovieGross, movie_gross)?,
            title_ratings: clean(TableKind::TitleRatings, title_ratings)?,
        };
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            1.0,
            "Cleaning complete",
        ));

        // Joining
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Joining,
            0.0,
            "Joining catalog...",
        ));
        let (catalog, join) = join_catalog(
            &cleaned.title_basics,
            &cleaned.movie_gross,
            &cleaned.title_ratings,
            self.config.title_match,
        )?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Joining,
            1.0,
            format!("Catalog has {} rows", join.catalog_rows),
        ));

        // Aggregating
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Aggregating,
            0.0,
            "Computing aggregates...",
        ));
        let aggregates = AggregateTables::compute(&cleaned.title_basics, &catalog, &self.config)?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Aggregating,
            1.0,
            "Aggregates computed",
        ));

        // Rendering
        let chart_paths = if self.config.render_charts {
            self.report_progress(ProgressUpdate::new(
                AnalysisStage::Rendering,
                0.0,
                "Rendering charts...",
            ));
            let paths = charts::render_all(&aggregates, &self.config.output_dir)?;
            self.report_progress(ProgressUpdate::new(
                AnalysisStage::Rendering,
                1.0,
                format!("Rendered {} charts", paths.len()),
            ));
            paths
        } else {
            info!("Skipping chart rendering (disabled)");
            Vec::new()
        };

        let mut result = AnalysisResult {
            profiles,
            cleaned,
            cleaning,
            catalog,
            join,
            aggregates,
            chart_paths,
            report_path: None,
            duration_ms: 0,
        };

        // Reporting
        if self.config.emit_report {
            self.report_progress(ProgressUpdate::new(
                AnalysisStage::Reporting,
                0.0,
                "Writing report...",
            ));
            result.duration_ms = start.elapsed().as_millis() as u64;
            let report = ReportGenerator::build_report(&self.config, &result)?;
            let path = self.reporter.write_report(&report)?;
            self.report_progress(ProgressUpdate::new(
                AnalysisStage::Reporting,
                1.0,
                format!("Report written to {}", path.display()),
            ));
            result.report_path = Some(path);
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        info!("Analysis complete in {} ms", result.duration_ms);
        Ok(result)
    }
}

/// Builder for [`Analysis`].
#[derive(Default)]
pub struct AnalysisBuilder {
    config: Option<AnalysisConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(AnalysisBuilder: Send);

impl AnalysisBuilder {
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a custom progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the analysis. Fails if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Analysis, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let reporter = ReportGenerator::new(config.output_dir.clone());
        Ok(Analysis {
            config,
            progress_reporter: self.progress_reporter,
            reporter,
        })
    }
}
