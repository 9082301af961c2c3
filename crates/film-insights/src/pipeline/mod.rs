//! Pipeline module.
//!
//! [`Analysis`] chains every stage of a run and reports progress as it goes.

mod builder;
pub mod progress;

pub use builder::{Analysis, AnalysisBuilder, AnalysisResult};
pub use progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
