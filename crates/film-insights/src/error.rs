//! Custom error types for the film market analysis.
//!
//! Every stage of the analysis returns [`Result`], built on a single
//! `thiserror` hierarchy. Errors serialize as `{code, message}` so the JSON
//! report and the CLI can surface them uniformly.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Column was not found in a table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Invalid configuration or cleaning plan.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No non-missing values to compute a fill statistic from.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Type conversion failed.
    #[error("Failed to convert column '{column}' to {target_type}: {reason}")]
    TypeConversionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// A source table could not be read.
    #[error("Failed to ingest '{path}': {reason}")]
    IngestionFailed { path: String, reason: String },

    /// Chart rendering failed.
    #[error("Failed to render chart: {0}")]
    ChartRenderFailed(String),

    /// Report generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, independent of the message text.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::IngestionFailed { .. } => "INGESTION_FAILED",
            Self::ChartRenderFailed(_) => "CHART_RENDER_FAILED",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the failure came from the input data rather than from the
    /// environment (files, rendering, serialization).
    pub fn is_data_error(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::NoValidValues(_)
            | Self::TypeConversionFailed { .. } => true,
            Self::WithContext { source, .. } => source.is_data_error(),
            _ => false,
        }
    }
}

impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            AnalysisError::ColumnNotFound("genres".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            AnalysisError::TypeConversionFailed {
                column: "foreign_gross".to_string(),
                target_type: "Float64".to_string(),
                reason: "bad".to_string(),
            }
            .error_code(),
            "TYPE_CONVERSION_FAILED"
        );
    }

    #[test]
    fn test_is_data_error() {
        assert!(AnalysisError::NoValidValues("x".to_string()).is_data_error());
        assert!(!AnalysisError::ChartRenderFailed("x".to_string()).is_data_error());
        assert!(
            AnalysisError::ColumnNotFound("genres".to_string())
                .with_context("Cleaning title basics")
                .is_data_error()
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = AnalysisError::ColumnNotFound("studio".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("studio"));
    }

    #[test]
    fn test_with_context() {
        let error = AnalysisError::ColumnNotFound("tconst".to_string())
            .with_context("Loading title ratings");
        assert!(error.to_string().contains("Loading title ratings"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_io_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let error = result.context("Opening bom.movie_gross.csv.gz").unwrap_err();
        assert_eq!(error.error_code(), "IO_ERROR");
        assert!(error.to_string().contains("bom.movie_gross.csv.gz"));
    }
}
