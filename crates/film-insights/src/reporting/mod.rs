//! Report generation module.
//!
//! [`AnalysisReport`] is the JSON document of one run. It backs both the
//! `--json` CLI output and the `film_market_report.json` file written with
//! `--emit-report`.
//!
//! # Example
//!
//! ```rust,ignore
//! use film_insights::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_report(&config, &result)?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

mod generator;

pub use generator::{AnalysisReport, REPORT_FILE_NAME, ReportGenerator, ReportInputs, frame_to_records};
