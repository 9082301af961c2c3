//! Imputation module for handling missing values.
//!
//! Statistical imputation (mean, median, mode) over a single column.

mod statistical;

pub use statistical::{Imputed, StatisticalImputer};
