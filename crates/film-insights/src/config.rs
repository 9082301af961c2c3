//! Configuration types for the film market analysis.
//!
//! This module provides configuration options using the builder pattern.
//! Defaults reproduce the standard box-office study: the three well-known
//! file names in the working directory, top 10 titles, top 5 genres, and a
//! 30-bin runtime histogram.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default file name of the IMDb title basics table.
pub const TITLE_BASICS_FILE: &str = "imdb.title.basics.csv.gz";
/// Default file name of the Box Office Mojo gross table.
pub const MOVIE_GROSS_FILE: &str = "bom.movie_gross.csv.gz";
/// Default file name of the IMDb title ratings table.
pub const TITLE_RATINGS_FILE: &str = "imdb.title.ratings.csv.gz";

/// How film titles are compared when joining metadata to gross data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TitleMatch {
    /// Byte-for-byte equality of `primary_title` and `title`.
    #[default]
    Exact,
    /// Case-folded, punctuation stripped, whitespace collapsed.
    Normalized,
}

/// Configuration for an analysis run.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use film_insights::config::{AnalysisConfig, TitleMatch};
///
/// let config = AnalysisConfig::builder()
///     .data_dir("data")
///     .top_n(20)
///     .title_match(TitleMatch::Normalized)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Directory the three source tables are read from.
    /// Default: "."
    pub data_dir: PathBuf,

    /// Directory charts and the JSON report are written to.
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// File name of the title basics table inside `data_dir`.
    pub title_basics_file: String,

    /// File name of the movie gross table inside `data_dir`.
    pub movie_gross_file: String,

    /// File name of the title ratings table inside `data_dir`.
    pub title_ratings_file: String,

    /// Rows kept by the top-titles queries.
    /// Default: 10
    pub top_n: usize,

    /// Rows kept by the genre gross queries.
    /// Default: 5
    pub genre_top_n: usize,

    /// Rows kept by the popular studios query.
    /// Default: 10
    pub studio_top_n: usize,

    /// A year is kept in the per-year count only if it has strictly more
    /// titles than this.
    /// Default: 100
    pub min_movies_per_year: u32,

    /// Number of equal-width bins in the runtime histogram.
    /// Default: 30
    pub runtime_bins: usize,

    /// Title comparison used by the metadata/gross join.
    /// Default: Exact
    pub title_match: TitleMatch,

    /// Whether to write PNG charts to `output_dir`.
    /// Default: true
    pub render_charts: bool,

    /// Whether to write the JSON report to `output_dir`.
    /// Default: false
    pub emit_report: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            output_dir: PathBuf::from("outputs"),
            title_basics_file: TITLE_BASICS_FILE.to_string(),
            movie_gross_file: MOVIE_GROSS_FILE.to_string(),
            title_ratings_file: TITLE_RATINGS_FILE.to_string(),
            top_n: 10,
            genre_top_n: 5,
            studio_top_n: 10,
            min_movies_per_year: 100,
            runtime_bins: 30,
            title_match: TitleMatch::default(),
            render_charts: true,
            emit_report: false,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Full path of the title basics table.
    pub fn title_basics_path(&self) -> PathBuf {
        self.data_dir.join(&self.title_basics_file)
    }

    /// Full path of the movie gross table.
    pub fn movie_gross_path(&self) -> PathBuf {
        self.data_dir.join(&self.movie_gross_file)
    }

    /// Full path of the title ratings table.
    pub fn title_ratings_path(&self) -> PathBuf {
        self.data_dir.join(&self.title_ratings_file)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let counts = [
            ("top_n", self.top_n),
            ("genre_top_n", self.genre_top_n),
            ("studio_top_n", self.studio_top_n),
            ("runtime_bins", self.runtime_bins),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigValidationError::ZeroCount {
                    field: field.to_string(),
                });
            }
        }

        let files = [
            ("title_basics_file", &self.title_basics_file),
            ("movie_gross_file", &self.movie_gross_file),
            ("title_ratings_file", &self.title_ratings_file),
        ];
        for (field, value) in files {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyFileName {
                    field: field.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': must be at least 1")]
    ZeroCount { field: String },

    #[error("Invalid value for '{field}': file name must not be empty")]
    EmptyFileName { field: String },
}

impl From<ConfigValidationError> for crate::error::AnalysisError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::AnalysisError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    title_basics_file: Option<String>,
    movie_gross_file: Option<String>,
    title_ratings_file: Option<String>,
    top_n: Option<usize>,
    genre_top_n: Option<usize>,
    studio_top_n: Option<usize>,
    min_movies_per_year: Option<u32>,
    runtime_bins: Option<usize>,
    title_match: Option<TitleMatch>,
    render_charts: Option<bool>,
    emit_report: Option<bool>,
}

impl AnalysisConfigBuilder {
    /// Set the directory the source tables are read from.
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Set the output directory for charts and the report.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Override the title basics file name.
    pub fn title_basics_file(mut self, name: impl Into<String>) -> Self {
        self.title_basics_file = Some(name.into());
        self
    }

    /// Override the movie gross file name.
    pub fn movie_gross_file(mut self, name: impl Into<String>) -> Self {
        self.movie_gross_file = Some(name.into());
        self
    }

    /// Override the title ratings file name.
    pub fn title_ratings_file(mut self, name: impl Into<String>) -> Self {
        self.title_ratings_file = Some(name.into());
        self
    }

    /// Set how many titles the top-N queries keep.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Set how many genres the gross-by-genre queries keep.
    pub fn genre_top_n(mut self, n: usize) -> Self {
        self.genre_top_n = Some(n);
        self
    }

    /// Set how many studios the popular studios query keeps.
    pub fn studio_top_n(mut self, n: usize) -> Self {
        self.studio_top_n = Some(n);
        self
    }

    /// Set the per-year title count a year must exceed to be reported.
    pub fn min_movies_per_year(mut self, min: u32) -> Self {
        self.min_movies_per_year = Some(min);
        self
    }

    /// Set the number of runtime histogram bins.
    pub fn runtime_bins(mut self, bins: usize) -> Self {
        self.runtime_bins = Some(bins);
        self
    }

    /// Set the title comparison used by the metadata/gross join.
    pub fn title_match(mut self, mode: TitleMatch) -> Self {
        self.title_match = Some(mode);
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Enable or disable writing the JSON report.
    pub fn emit_report(mut self, emit: bool) -> Self {
        self.emit_report = Some(emit);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            data_dir: self.data_dir.unwrap_or(defaults.data_dir),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            title_basics_file: self.title_basics_file.unwrap_or(defaults.title_basics_file),
            movie_gross_file: self.movie_gross_file.unwrap_or(defaults.movie_gross_file),
            title_ratings_file: self
                .title_ratings_file
                .unwrap_or(defaults.title_ratings_file),
            top_n: self.top_n.unwrap_or(defaults.top_n),
            genre_top_n: self.genre_top_n.unwrap_or(defaults.genre_top_n),
            studio_top_n: self.studio_top_n.unwrap_or(defaults.studio_top_n),
            min_movies_per_year: self
                .min_movies_per_year
                .unwrap_or(defaults.min_movies_per_year),
            runtime_bins: self.runtime_bins.unwrap_or(defaults.runtime_bins),
            title_match: self.title_match.unwrap_or_default(),
            render_charts: self.render_charts.unwrap_or(defaults.render_charts),
            emit_report: self.emit_report.unwrap_or(defaults.emit_report),
        };

        config.validate()?;
        Ok(config)
    }
}
