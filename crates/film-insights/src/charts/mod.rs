//! PNG bar charts for the aggregate tables.
//!
//! Every chart is a vertical bar chart over a segmented category axis. The
//! runtime histogram uses the same renderer with one bar per bin labelled by
//! its lower edge.

use crate::analysis::AggregateTables;
use crate::error::{AnalysisError, Result, ResultExt};
use crate::types::{HistogramBin, columns};
use plotters::prelude::*;
use polars::prelude::{DataFrame, DataType};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CHART_SIZE: (u32, u32) = (1280, 720);

/// Bar fill colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartColor {
    #[default]
    Blue,
    Red,
    Purple,
}

impl ChartColor {
    fn rgb(&self) -> RGBColor {
        match self {
            Self::Blue => RGBColor(31, 119, 180),
            Self::Red => RED,
            Self::Purple => RGBColor(128, 0, 128),
        }
    }
}

/// A bar chart ready to draw: one label and one value per bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub file_name: &'static str,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub color: ChartColor,
}

impl BarChart {
    fn new(
        file_name: &'static str,
        title: &'static str,
        x_label: &'static str,
        y_label: &'static str,
    ) -> Self {
        Self {
            file_name,
            title,
            x_label,
            y_label,
            labels: Vec::new(),
            values: Vec::new(),
            color: ChartColor::default(),
        }
    }

    fn with_color(mut self, color: ChartColor) -> Self {
        self.color = color;
        self
    }

    /// Take bar labels from `label_column` and heights from `value_column`.
    /// Null labels render as "NA" and null values as zero.
    fn with_frame(mut self, df: &DataFrame, label_column: &str, value_column: &str) -> Result<Self> {
        let labels = df.column(label_column)?.cast(&DataType::String)?;
        let values = df.column(value_column)?.cast(&DataType::Float64)?;

        self.labels = labels
            .str()?
            .into_iter()
            .map(|l| l.unwrap_or("NA").to_string())
            .collect();
        self.values = values.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect();
        Ok(self)
    }

    fn with_histogram(mut self, bins: &[HistogramBin]) -> Self {
        self.labels = bins.iter().map(|b| format!("{:.0}", b.lower)).collect();
        self.values = bins.iter().map(|b| b.count as f64).collect();
        self
    }

    /// Draw the chart into `dir/<file_name>`.
    pub fn render_png(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name);
        self.draw(&path)
            .map_err(|reason| AnalysisError::ChartRenderFailed(format!("{}: {}", self.file_name, reason)))?;
        debug!("Rendered {} bars to {}", self.values.len(), path.display());
        Ok(path)
    }

    fn draw(&self, path: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let bars = self.values.len() as u32;
        let top = self.values.iter().copied().fold(0.0, f64::max);
        let y_max = if top > 0.0 { top * 1.05 } else { 1.0 };

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(self.title, ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d((0u32..bars.max(1)).into_segmented(), 0f64..y_max)?;

        let labels = &self.labels;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(self.x_label)
            .y_desc(self.y_label)
            .x_labels(labels.len().max(1))
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(self.color.rgb().filled())
                .margin(4)
                .data(self.values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
        )?;

        root.present()?;
        Ok(())
    }
}

/// Build the five charts from the aggregate tables.
pub fn chart_set(aggregates: &AggregateTables) -> Result<Vec<BarChart>> {
    Ok(vec![
        BarChart::new("movies_per_year.png", "Number of Movies per year", "years", "count").with_frame(
            &aggregates.movies_per_year,
            columns::START_YEAR,
            columns::N_MOVIES,
        )?,
        BarChart::new(
            "domestic_gross_by_genre.png",
            "Domestic earnings by genres",
            "Genres",
            "Domestic_gross",
        )
        .with_frame(&aggregates.domestic_by_genre, columns::GENRES, columns::TOTAL_DOMESTIC_GROSS)?,
        BarChart::new(
            "foreign_gross_by_genre.png",
            "Foreign earnings by genres",
            "Genres",
            "Foreign_gross",
        )
        .with_color(ChartColor::Red)
        .with_frame(&aggregates.foreign_by_genre, columns::GENRES, columns::TOTAL_FOREIGN_GROSS)?,
        BarChart::new("runtime_distribution.png", "Runtime", "runtime_minutes", "Frequency")
            .with_histogram(&aggregates.runtime_histogram),
        BarChart::new("popular_studios.png", "Popular Studio", "studio", "n_studio")
            .with_color(ChartColor::Purple)
            .with_frame(&aggregates.popular_studios, columns::STUDIO, columns::N_STUDIO)?,
    ])
}

/// Render every chart into `output_dir`, creating it if needed.
pub fn render_all(aggregates: &AggregateTables, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir).context(format!("Creating {}", output_dir.display()))?;

    let paths = chart_set(aggregates)?
        .iter()
        .map(|chart| chart.render_png(output_dir))
        .collect::<Result<Vec<_>>>()?;

    info!("Wrote {} charts to {}", paths.len(), output_dir.display());
    Ok(paths)
}
