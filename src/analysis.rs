use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::csv_table;
use crate::describe::{self, Summary};
use crate::error::{Error, Result};
use crate::fs;
use crate::model::{self, FittedModel};
use crate::outliers::{self, ColumnStats, FilterStep, OutlierPolicy, ThresholdMode};
use crate::record::Column;
use crate::table::{self, Table};

/// A model to fit, and the points to evaluate it at
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSpec {
    target: String,
    predictors: Vec<String>,
    points: Vec<Vec<f64>>,
}

impl ModelSpec {
    pub fn new(target: &str, predictors: &[&str]) -> ModelSpec {
        ModelSpec {
            target: target.to_owned(),
            predictors: predictors.iter().map(|&p| p.to_owned()).collect(),
            points: vec![],
        }
    }

    /// Adds a point to predict at, one value per predictor
    pub fn predict_at(mut self, values: Vec<f64>) -> ModelSpec {
        self.points.push(values);
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn predictors(&self) -> &[String] {
        &self.predictors
    }

    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    fn fit(&self, table: &Table) -> Result<ModelOutput> {
        let predictors: Vec<&str> = self.predictors.iter().map(|p| p.as_str()).collect();
        let model = model::fit_model(table, &self.target, &predictors)?;
        let predictions = self
            .points
            .iter()
            .map(|values| {
                model::predict(&model, values).map(|value| Prediction {
                    inputs: values.clone(),
                    value,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ModelOutput { model, predictions })
    }
}

/// Batch configuration: which filter to apply, and which models to fit on what is left.
///
/// ```rust,no_run
/// use vital_stats::{load_table, Analysis, ModelSpec, ThresholdMode};
///
/// # fn main() -> vital_stats::Result<()> {
/// let table = load_table("moscow.csv")?;
/// let output = Analysis::default()
///     .threshold_mode(ThresholdMode::Cascading)
///     .models(vec![ModelSpec::new("births", &["marriages"]).predict_at(vec![69.])])
///     .run(&table)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Analysis {
    policy: OutlierPolicy,
    threshold_mode: ThresholdMode,
    fill_missing: bool,
    models: Vec<ModelSpec>,
    monthly_column: Column,
    json_output: Option<PathBuf>,
    filtered_output: Option<PathBuf>,
}

impl Default for Analysis {
    /// Default policy with frozen thresholds, no zero-fill, and the two births models
    fn default() -> Analysis {
        Analysis {
            policy: OutlierPolicy::default(),
            threshold_mode: ThresholdMode::Frozen,
            fill_missing: false,
            models: vec![
                ModelSpec::new("births", &["marriages"]).predict_at(vec![69.]),
                ModelSpec::new("births", &["divorces", "adoptions"]).predict_at(vec![100., 100.]),
            ],
            monthly_column: Column::Births,
            json_output: None,
            filtered_output: None,
        }
    }
}

impl Analysis {
    /// Changes the outlier policy.
    pub fn policy(mut self, policy: OutlierPolicy) -> Analysis {
        self.policy = policy;
        self
    }

    /// Changes where the filter takes its thresholds from.
    pub fn threshold_mode(mut self, mode: ThresholdMode) -> Analysis {
        self.threshold_mode = mode;
        self
    }

    /// Replaces missing measures with zero before anything else runs.
    pub fn fill_missing(mut self, enabled: bool) -> Analysis {
        self.fill_missing = enabled;
        self
    }

    /// Replaces the models to fit.
    pub fn models(mut self, models: Vec<ModelSpec>) -> Analysis {
        self.models = models;
        self
    }

    /// Changes the column whose monthly totals are ranked.
    pub fn monthly_column(mut self, column: Column) -> Analysis {
        self.monthly_column = column;
        self
    }

    /// Writes the output as JSON once the run completes. Failing to write is logged, not fatal.
    pub fn json_output<P: AsRef<Path>>(mut self, path: P) -> Analysis {
        self.json_output = Some(path.as_ref().to_owned());
        self
    }

    /// Writes the filtered table as CSV once the run completes. Failing to write is logged, not
    /// fatal.
    pub fn filtered_output<P: AsRef<Path>>(mut self, path: P) -> Analysis {
        self.filtered_output = Some(path.as_ref().to_owned());
        self
    }

    pub fn run(&self, table: &Table) -> Result<AnalysisOutput> {
        let filled;
        let table = if self.fill_missing {
            filled = table::fill_missing(table);
            &filled
        } else {
            table
        };

        let mut sparse_columns = vec![];
        let column_stats: BTreeMap<_, _> = elapsed!(
            "Computing column statistics",
            skip_sparse(&Column::MEASURES, &mut sparse_columns, |column| {
                ColumnStats::of(table, column)
            })
        )?
        .into_iter()
        .collect();
        let outcome = elapsed!(
            "Filtering outliers",
            outliers::filter_outliers_with(table, &self.policy, self.threshold_mode)
        )?;
        let filtered = outcome.table;

        info!("Kept {} of {} records", filtered.len(), table.len());

        let summary: Vec<_> = elapsed!(
            "Describing filtered table",
            skip_sparse(&Column::ALL, &mut sparse_columns, |column| {
                Summary::of(&filtered, column)
            })
        )?
        .into_iter()
        .map(|(_, summary)| summary)
        .collect();
        let monthly_totals = describe::monthly_totals(&filtered, self.monthly_column);
        let models = elapsed!(
            "Fitting models",
            self.models
                .iter()
                .map(|spec| spec.fit(&filtered))
                .collect::<Result<Vec<_>>>()
        )?;

        let output = AnalysisOutput {
            records_in: table.len(),
            records_out: filtered.len(),
            threshold_mode: self.threshold_mode,
            column_stats,
            filter_steps: outcome.steps,
            summary,
            sparse_columns,
            monthly_column: self.monthly_column,
            monthly_totals,
            models,
            filtered,
        };

        if let Some(path) = &self.json_output {
            log_if_err!(output.save_json(path));
        }
        if let Some(path) = &self.filtered_output {
            log_if_err!(csv_table::save_table(&output.filtered, path));
        }

        Ok(output)
    }
}

// Applies `f` to each column, setting aside the ones with fewer than two values instead of
// failing. Any other error is returned.
fn skip_sparse<T, F>(
    columns: &[Column],
    sparse: &mut Vec<Column>,
    mut f: F,
) -> Result<Vec<(Column, T)>>
where
    F: FnMut(Column) -> Result<T>,
{
    let mut out = Vec::with_capacity(columns.len());

    for &column in columns {
        match f(column) {
            Ok(value) => out.push((column, value)),
            Err(Error::InsufficientData { found, .. }) => {
                info!("{}: {} values, no statistics", column.alias(), found);
                if !sparse.contains(&column) {
                    sparse.push(column);
                }
            }
            Err(e) => return Err(e),
        }
    }

    Ok(out)
}

/// A model evaluated at one point
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prediction {
    pub inputs: Vec<f64>,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelOutput {
    pub model: FittedModel,
    pub predictions: Vec<Prediction>,
}

/// Everything one run produced
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisOutput {
    pub records_in: usize,
    pub records_out: usize,
    pub threshold_mode: ThresholdMode,
    /// Computed on the unfiltered (possibly zero-filled) table
    pub column_stats: BTreeMap<Column, ColumnStats>,
    pub filter_steps: Vec<FilterStep>,
    pub summary: Vec<Summary>,
    /// Columns with fewer than two values, left out of `column_stats` or `summary`
    pub sparse_columns: Vec<Column>,
    pub monthly_column: Column,
    pub monthly_totals: Vec<(u8, f64)>,
    pub models: Vec<ModelOutput>,
    #[serde(skip)]
    pub filtered: Table,
}

impl AnalysisOutput {
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::save(self, &path)
    }
}
