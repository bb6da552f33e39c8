//! Outlier filtering and least squares regression over monthly civil registration records.
//!
//! A run loads a [`Table`] from CSV, measures the spread of each count column, removes the rows
//! that fall outside the IQR bounds an [`OutlierPolicy`] enforces, and fits OLS models on what is
//! left. [`Analysis`] chains those steps; the free functions expose each one on its own.

#![allow(clippy::float_cmp)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate serde_derive;

#[macro_use]
mod macros_private;

mod analysis;
mod csv_table;
mod describe;
mod error;
mod format;
mod fs;
mod model;
mod outliers;
mod record;
mod report;
pub mod stats;
mod table;

pub use crate::analysis::{Analysis, AnalysisOutput, ModelOutput, ModelSpec, Prediction};
pub use crate::csv_table::{load_table, read_table, save_table, write_table};
pub use crate::describe::{describe, monthly_totals, Summary};
pub use crate::error::{Error, Result};
pub use crate::model::{fit_model, predict, Coefficient, FittedModel, INTERCEPT};
pub use crate::outliers::{
    compute_column_stats, filter_outliers, filter_outliers_with, ColumnRule, ColumnStats,
    FilterOutcome, FilterStep, OutlierCounts, OutlierPolicy, ThresholdMode,
};
pub use crate::record::{Column, Record};
pub use crate::report::{CliReport, CliVerbosity};
pub use crate::table::{fill_missing, Table};

lazy_static! {
    static ref DEBUG_ENABLED: bool = std::env::var_os("VITAL_STATS_DEBUG").is_some();
}

fn debug_enabled() -> bool {
    *DEBUG_ENABLED
}
