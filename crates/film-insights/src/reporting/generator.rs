use crate::config::{AnalysisConfig, TitleMatch};
use crate::error::{AnalysisError, Result, ResultExt};
use crate::pipeline::AnalysisResult;
use crate::types::{HistogramBin, JoinSummary, TableCleaning, TableProfile};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// File name of the report inside the output directory.
pub const REPORT_FILE_NAME: &str = "film_market_report.json";

// ============================================================================
// Report Types
// ============================================================================

/// JSON document describing one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub duration_ms: u64,
    pub inputs: ReportInputs,
    pub title_match: TitleMatch,
    /// Profiles of the raw tables
    pub profiles: Vec<TableProfile>,
    /// What cleaning did to each table
    pub cleaning: Vec<TableCleaning>,
    pub join: JoinSummary,
    /// Every aggregate table as a list of row objects, keyed by name
    pub aggregates: BTreeMap<String, Vec<Map<String, Value>>>,
    pub runtime_histogram: Vec<HistogramBin>,
    /// Chart files written during the run
    pub charts: Vec<String>,
}

/// Paths of the three source tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInputs {
    pub title_basics: String,
    pub movie_gross: String,
    pub title_ratings: String,
}

// ============================================================================
// Report Generator
// ============================================================================

/// Builds [`AnalysisReport`]s and writes them to the output directory.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }

    /// Assemble the report of a finished run.
    pub fn build_report(config: &AnalysisConfig, result: &AnalysisResult) -> Result<AnalysisReport> {
        let mut aggregates = BTreeMap::new();
        for (name, df) in result.aggregates.frames() {
            let rows = frame_to_records(df).context(format!("Serializing {}", name))?;
            aggregates.insert(name.to_string(), rows);
        }

        Ok(AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            duration_ms: result.duration_ms,
            inputs: ReportInputs {
                title_basics: config.title_basics_path().display().to_string(),
                movie_gross: config.movie_gross_path().display().to_string(),
                title_ratings: config.title_ratings_path().display().to_string(),
            },
            title_match: config.title_match,
            profiles: result.profiles.clone(),
            cleaning: result.cleaning.clone(),
            join: result.join,
            aggregates,
            runtime_histogram: result.aggregates.runtime_histogram.clone(),
            charts: result
                .chart_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        })
    }

    /// Write `report` as pretty JSON to `<output_dir>/film_market_report.json`.
    pub fn write_report(&self, report: &AnalysisReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .context(format!("Creating {}", self.output_dir.display()))?;

        let json = serde_json::to_string_pretty(report)
            .map_err(|e| AnalysisError::ReportGenerationFailed(e.to_string()))?;

        let report_path = self.report_path();
        let mut file = File::create(&report_path)
            .context(format!("Creating {}", report_path.display()))?;
        file.write_all(json.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}

/// Convert a frame to one JSON object per row. Non-finite floats become
/// `null`.
pub fn frame_to_records(df: &DataFrame) -> Result<Vec<Map<String, Value>>> {
    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let mut row = Map::new();
        for column in df.get_columns() {
            let value = column.get(i)?;
            row.insert(column.name().to_string(), any_value_to_json(&value));
        }
        rows.push(row);
    }
    debug!("Serialized {} rows", rows.len());
    Ok(rows)
}

fn any_value_to_json(value: &AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(*b),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Int8(v) => Value::from(*v),
        AnyValue::Int16(v) => Value::from(*v),
        AnyValue::Int32(v) => Value::from(*v),
        AnyValue::Int64(v) => Value::from(*v),
        AnyValue::UInt8(v) => Value::from(*v),
        AnyValue::UInt16(v) => Value::from(*v),
        AnyValue::UInt32(v) => Value::from(*v),
        AnyValue::UInt64(v) => Value::from(*v),
        AnyValue::Float32(v) => float_to_json(*v as f64),
        AnyValue::Float64(v) => float_to_json(*v),
        other => Value::String(other.to_string()),
    }
}

fn float_to_json(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
