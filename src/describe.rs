//! Descriptive summaries of a table.

use itertools::Itertools;

use crate::error::{Error, Result};
use crate::record::Column;
use crate::stats::univariate::Sample;
use crate::table::Table;

/// Count, moments and quartiles of one column's present values
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub column: Column,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Summary {
    pub fn of(table: &Table, column: Column) -> Result<Summary> {
        let values = table.values(column);
        let sample = Sample::try_new(&values).ok_or(Error::InsufficientData {
            needed: 2,
            found: values.len(),
        })?;

        let mean = sample.mean();
        let (q1, median, q3) = sample.percentiles().quartiles();

        Ok(Summary {
            column,
            count: sample.len(),
            mean,
            std: sample.std_dev(Some(mean)),
            min: sample.min(),
            q1,
            median,
            q3,
            max: sample.max(),
        })
    }
}

/// Summaries of every column, `ID` first
pub fn describe(table: &Table) -> Result<Vec<Summary>> {
    Column::ALL
        .iter()
        .map(|&column| Summary::of(table, column))
        .collect()
}

/// Sum of `column` per calendar month, largest first
///
/// Missing values count as zero; months with no rows are left out. Ties keep calendar order.
pub fn monthly_totals(table: &Table, column: Column) -> Vec<(u8, f64)> {
    let mut totals = [None; 12];
    for record in table {
        if let Some(total) = (record.month as usize)
            .checked_sub(1)
            .and_then(|i| totals.get_mut(i))
        {
            *total.get_or_insert(0.) += record.get(column).unwrap_or(0.);
        }
    }

    totals
        .iter()
        .enumerate()
        .filter_map(|(i, total)| total.map(|t| (i as u8 + 1, t)))
        .sorted_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
        .collect()
}
