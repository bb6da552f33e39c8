//! IQR-based outlier detection and the record filter built on it.
//!
//! Bounds are Tukey's inner fences, `Q1 - 1.5 * IQR` and `Q3 + 1.5 * IQR`, computed with
//! linearly interpolated quartiles. Which side of which column is enforced comes from an
//! [`OutlierPolicy`], never from the detection step: a column may have outliers on both sides and
//! still only be filtered on one of them.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::record::Column;
use crate::stats::univariate::outliers::tukey::{Fences, LabeledSample};
use crate::stats::univariate::Sample;
use crate::table::Table;

/// Number of values outside each of the four Tukey fences
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierCounts {
    pub low_severe: usize,
    pub low_mild: usize,
    pub high_mild: usize,
    pub high_severe: usize,
}

impl OutlierCounts {
    pub fn total(&self) -> usize {
        self.low_severe + self.low_mild + self.high_mild + self.high_severe
    }
}

/// Spread of one column, and the bounds derived from it
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Non-missing values
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub any_outlier_min: bool,
    pub any_outlier_max: bool,
    pub outliers: OutlierCounts,
}

impl ColumnStats {
    /// Computes the stats of the present values of `column`
    ///
    /// Needs at least two values.
    pub fn of(table: &Table, column: Column) -> Result<ColumnStats> {
        let values = table.values(column);
        let sample = Sample::try_new(&values).ok_or(Error::InsufficientData {
            needed: 2,
            found: values.len(),
        })?;

        Ok(ColumnStats::from_sample(sample))
    }

    fn from_sample(sample: &Sample<f64>) -> ColumnStats {
        let percentiles = sample.percentiles();
        let (q1, median, q3) = percentiles.quartiles();
        let (min, max) = (percentiles.min(), percentiles.max());
        let fences = Fences::from_quartiles(q1, q3);
        let counts = LabeledSample::new(sample, fences).count();

        ColumnStats {
            count: sample.len(),
            min,
            q1,
            median,
            q3,
            max,
            iqr: q3 - q1,
            lower_bound: fences.low_mild,
            upper_bound: fences.high_mild,
            any_outlier_min: min < fences.low_mild,
            any_outlier_max: max > fences.high_mild,
            outliers: OutlierCounts {
                low_severe: counts.low_severe,
                low_mild: counts.low_mild,
                high_mild: counts.high_mild,
                high_severe: counts.high_severe,
            },
        }
    }
}

/// Computes `ColumnStats` for each of the ten measure columns
pub fn compute_column_stats(table: &Table) -> Result<BTreeMap<Column, ColumnStats>> {
    Column::MEASURES
        .iter()
        .map(|&column| ColumnStats::of(table, column).map(|stats| (column, stats)))
        .collect()
}

/// Which bounds of a column the filter enforces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub column: Column,
    #[serde(default)]
    pub remove_below: bool,
    #[serde(default)]
    pub remove_above: bool,
}

impl ColumnRule {
    pub fn new(column: Column, remove_below: bool, remove_above: bool) -> ColumnRule {
        ColumnRule {
            column,
            remove_below,
            remove_above,
        }
    }

    pub fn is_active(&self) -> bool {
        self.remove_below || self.remove_above
    }

    /// Missing values never violate a bound
    fn violates(&self, value: Option<f64>, lower: f64, upper: f64) -> bool {
        match value {
            Some(v) => (self.remove_below && v < lower) || (self.remove_above && v > upper),
            None => false,
        }
    }
}

/// Ordered per-column filtering rules
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutlierPolicy {
    rules: Vec<ColumnRule>,
}

impl OutlierPolicy {
    pub fn new(rules: Vec<ColumnRule>) -> OutlierPolicy {
        OutlierPolicy { rules }
    }

    /// Reads a policy from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<OutlierPolicy> {
        crate::fs::load(&path)
    }

    pub fn rules(&self) -> &[ColumnRule] {
        &self.rules
    }

    pub fn rule(&self, column: Column) -> Option<&ColumnRule> {
        self.rules.iter().find(|r| r.column == column)
    }
}

impl Default for OutlierPolicy {
    /// Low outliers go everywhere except deaths (high only), adoptions (both sides), marriages
    /// and population (kept)
    fn default() -> OutlierPolicy {
        use Column::*;

        OutlierPolicy::new(vec![
            ColumnRule::new(Births, true, false),
            ColumnRule::new(BoysBirthCertificates, true, false),
            ColumnRule::new(GirlsBirthCertificates, true, false),
            ColumnRule::new(Deaths, false, true),
            ColumnRule::new(Marriages, false, false),
            ColumnRule::new(Divorces, true, false),
            ColumnRule::new(PaternityExaminations, true, false),
            ColumnRule::new(Adoptions, true, true),
            ColumnRule::new(NameChanges, true, false),
            ColumnRule::new(TotalPopulation, false, false),
        ])
    }
}

/// Where the filter takes its thresholds from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// All bounds are computed once, from the unfiltered table
    Frozen,
    /// Each column's bounds are recomputed from what earlier rules left behind
    Cascading,
}

impl Default for ThresholdMode {
    fn default() -> ThresholdMode {
        ThresholdMode::Frozen
    }
}

/// One applied rule
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterStep {
    pub column: Column,
    /// Enforced lower bound, if any
    pub lower: Option<f64>,
    /// Enforced upper bound, if any
    pub upper: Option<f64>,
    pub removed: usize,
}

/// Filtered table plus what each rule removed
#[derive(Clone, Debug, PartialEq)]
pub struct FilterOutcome {
    pub table: Table,
    pub steps: Vec<FilterStep>,
}

/// Frozen-threshold filter with the default policy
pub fn filter_outliers(table: &Table) -> Result<Table> {
    filter_outliers_with(table, &OutlierPolicy::default(), ThresholdMode::Frozen)
        .map(|outcome| outcome.table)
}

/// Applies the active rules of `policy` in order
///
/// A row is dropped as soon as one rule flags it. Rules with neither side enabled are skipped
/// without looking at the data.
pub fn filter_outliers_with(
    table: &Table,
    policy: &OutlierPolicy,
    mode: ThresholdMode,
) -> Result<FilterOutcome> {
    let active: Vec<&ColumnRule> = policy.rules().iter().filter(|r| r.is_active()).collect();

    let frozen = match mode {
        ThresholdMode::Frozen => active
            .iter()
            .map(|rule| ColumnStats::of(table, rule.column).map(|s| (rule.column, s)))
            .collect::<Result<BTreeMap<_, _>>>()?,
        ThresholdMode::Cascading => BTreeMap::new(),
    };

    let mut current = table.clone();
    let mut steps = Vec::with_capacity(active.len());

    for rule in active {
        let stats = match frozen.get(&rule.column) {
            Some(stats) => *stats,
            None => ColumnStats::of(&current, rule.column)?,
        };
        let (lower, upper) = (stats.lower_bound, stats.upper_bound);

        let before = current.len();
        current = current.filter(|record| !rule.violates(record.get(rule.column), lower, upper));
        let removed = before - current.len();

        info!(
            "{}: removed {} rows outside [{}, {}]",
            rule.column,
            removed,
            if rule.remove_below { lower } else { f64::NEG_INFINITY },
            if rule.remove_above { upper } else { f64::INFINITY },
        );

        steps.push(FilterStep {
            column: rule.column,
            lower: if rule.remove_below { Some(lower) } else { None },
            upper: if rule.remove_above { Some(upper) } else { None },
            removed,
        });
    }

    Ok(FilterOutcome {
        table: current,
        steps,
    })
}
