//! Ingestion of the three source tables.
//!
//! Tables are delimited text, usually gzip-compressed. Column types are
//! inferred from every row so that a thousands separator deep into the file
//! still keeps `foreign_gross` a string column.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result, ResultExt};
use crate::types::TableKind;
use flate2::read::GzDecoder;
use polars::prelude::*;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, info};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// The three raw tables, exactly as read from disk.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub title_basics: DataFrame,
    pub movie_gross: DataFrame,
    pub title_ratings: DataFrame,
}

impl SourceTables {
    pub fn get(&self, kind: TableKind) -> &DataFrame {
        match kind {
            TableKind::TitleBasics => &self.title_basics,
            TableKind::MovieGross => &self.movie_gross,
            TableKind::TitleRatings => &self.title_ratings,
        }
    }

    /// Check that every table carries the columns the queries read.
    pub fn validate(&self) -> Result<()> {
        for kind in TableKind::ALL {
            require_columns(kind, self.get(kind))?;
        }
        Ok(())
    }
}

/// Load all three tables named by the configuration.
pub fn load_sources(config: &AnalysisConfig) -> Result<SourceTables> {
    let tables = SourceTables {
        title_basics: load_table(TableKind::TitleBasics, &config.title_basics_path())?,
        movie_gross: load_table(TableKind::MovieGross, &config.movie_gross_path())?,
        title_ratings: load_table(TableKind::TitleRatings, &config.title_ratings_path())?,
    };
    Ok(tables)
}

/// Read one table and check its required columns.
pub fn load_table(kind: TableKind, path: &Path) -> Result<DataFrame> {
    info!("Loading {} from: {}", kind, path.display());
    let df = read_csv(path)?;
    require_columns(kind, &df).context(format!("Loading {}", kind))?;
    info!("Loaded {}: {:?}", kind, df.shape());
    Ok(df)
}

/// Read a CSV file, transparently decompressing gzip content.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let raw = std::fs::read(path).context(format!("Reading {}", path.display()))?;

    let bytes = if raw.starts_with(&GZIP_MAGIC) {
        debug!("Decompressing gzip input: {}", path.display());
        let mut decoded = Vec::new();
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut decoded)
            .map_err(|e| AnalysisError::IngestionFailed {
                path: path.display().to_string(),
                reason: format!("invalid gzip stream: {}", e),
            })?;
        decoded
    } else {
        raw
    };

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| AnalysisError::IngestionFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

fn require_columns(kind: TableKind, df: &DataFrame) -> Result<()> {
    for name in kind.required_columns() {
        if df.column(name).is_err() {
            return Err(AnalysisError::ColumnNotFound(name.to_string()));
        }
    }
    Ok(())
}
