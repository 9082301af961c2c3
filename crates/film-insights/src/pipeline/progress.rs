//! Progress reporting for the analysis pipeline.
//!
//! The pipeline emits one [`ProgressUpdate`] when a stage starts and one when
//! it finishes. Register a callback with
//! [`AnalysisBuilder::on_progress`](crate::pipeline::AnalysisBuilder::on_progress)
//! or a custom [`ProgressReporter`].
//!
//! # Example
//!
//! ```rust,ignore
//! use film_insights::Analysis;
//!
//! let result = Analysis::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of an analysis run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Reading and profiling the source tables
    Ingestion,
    /// Coercing and imputing each table
    Cleaning,
    /// Building the three-way catalog
    Joining,
    /// Running the aggregate queries
    Aggregating,
    /// Writing PNG charts
    Rendering,
    /// Writing the JSON report
    Reporting,
    /// Run finished
    Complete,
}

impl AnalysisStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ingestion => "Loading Tables",
            Self::Cleaning => "Cleaning Tables",
            Self::Joining => "Joining Catalog",
            Self::Aggregating => "Computing Aggregates",
            Self::Rendering => "Rendering Charts",
            Self::Reporting => "Writing Report",
            Self::Complete => "Complete",
        }
    }

    /// Share of the whole run this stage accounts for.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Ingestion => 0.30,
            Self::Cleaning => 0.20,
            Self::Joining => 0.15,
            Self::Aggregating => 0.15,
            Self::Rendering => 0.15,
            Self::Reporting => 0.05,
            Self::Complete => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Ingestion => 0.0,
            Self::Cleaning => 0.30,
            Self::Joining => 0.50,
            Self::Aggregating => 0.65,
            Self::Rendering => 0.80,
            Self::Reporting => 0.95,
            Self::Complete => 1.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: AnalysisStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    /// Progress `stage_progress` (0.0 - 1.0) of the way through `stage`.
    pub fn new(stage: AnalysisStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + stage.weight() * stage_progress.clamp(0.0, 1.0);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Complete,
            progress: 1.0,
            message: message.into(),
        }
    }
}

/// Receiver of progress updates.
///
/// Implementations must be `Send + Sync` so a run can be moved to a worker
/// thread while updates are consumed elsewhere.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
static_assertions::assert_impl_all!(AnalysisStage: Send, Sync, Copy);
