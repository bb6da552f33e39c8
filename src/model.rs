//! Ordinary least squares models over table columns.

use std::fmt;

use itertools::Itertools;

use crate::error::{Error, Result};
use crate::record::Column;
use crate::stats::regression::Ols;
use crate::table::Table;

/// Name of the constant term
pub const INTERCEPT: &str = "Intercept";

/// One fitted parameter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    name: String,
    estimate: f64,
    std_error: f64,
    t_value: f64,
    p_value: f64,
}

impl Coefficient {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    pub fn std_error(&self) -> f64 {
        self.std_error
    }

    pub fn t_value(&self) -> f64 {
        self.t_value
    }

    /// Two-sided
    pub fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// A fitted `target ~ predictors` model
///
/// Coefficients are ordered intercept first, then one per predictor in the order they were
/// requested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    target: Column,
    predictors: Vec<Column>,
    coefficients: Vec<Coefficient>,
    r_squared: f64,
    adjusted_r_squared: f64,
    f_statistic: f64,
    f_p_value: f64,
    observations: usize,
    df_residual: usize,
}

impl FittedModel {
    pub fn target(&self) -> Column {
        self.target
    }

    pub fn predictors(&self) -> &[Column] {
        &self.predictors
    }

    pub fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }

    /// Looks a coefficient up by predictor alias, header name or `Intercept`
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        let name = match name.parse::<Column>() {
            Ok(column) => column.alias(),
            Err(_) => name,
        };

        self.coefficients.iter().find(|c| c.name == name)
    }

    pub fn intercept(&self) -> f64 {
        self.coefficients[0].estimate
    }

    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    pub fn adjusted_r_squared(&self) -> f64 {
        self.adjusted_r_squared
    }

    pub fn f_statistic(&self) -> f64 {
        self.f_statistic
    }

    pub fn f_p_value(&self) -> f64 {
        self.f_p_value
    }

    /// Rows that survived the missing-value drop
    pub fn observations(&self) -> usize {
        self.observations
    }

    pub fn df_residual(&self) -> usize {
        self.df_residual
    }

    /// `births ~ divorces + adoptions`
    pub fn formula(&self) -> String {
        format!(
            "{} ~ {}",
            self.target.alias(),
            self.predictors.iter().map(|c| c.alias()).join(" + ")
        )
    }
}

impl fmt::Display for FittedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.formula())
    }
}

/// Fits `target ~ predictors` by least squares, with an intercept
///
/// Column names may be CSV headers or aliases. Rows missing the target or any predictor are
/// left out of the fit.
pub fn fit_model(table: &Table, target: &str, predictors: &[&str]) -> Result<FittedModel> {
    let target: Column = target.parse()?;
    let predictors = predictors
        .iter()
        .map(|name| name.parse::<Column>())
        .collect::<Result<Vec<_>>>()?;

    let mut ys = Vec::with_capacity(table.len());
    let mut columns = vec![Vec::with_capacity(table.len()); predictors.len()];
    for record in table {
        let y = match record.get(target) {
            Some(y) => y,
            None => continue,
        };
        let xs = match predictors.iter().map(|&c| record.get(c)).collect::<Option<Vec<_>>>() {
            Some(xs) => xs,
            None => continue,
        };

        ys.push(y);
        for (column, x) in columns.iter_mut().zip(xs) {
            column.push(x);
        }
    }

    if ys.len() < table.len() {
        info!(
            "{} ~ ...: dropped {} rows with missing values",
            target.alias(),
            table.len() - ys.len()
        );
    }

    let slices: Vec<&[f64]> = columns.iter().map(|c| &c[..]).collect();
    let ols = Ols::fit(&slices, &ys)?;

    let names = Some(INTERCEPT.to_owned())
        .into_iter()
        .chain(predictors.iter().map(|c| c.alias().to_owned()));
    let coefficients = names
        .zip(ols.coefficients())
        .zip(ols.standard_errors())
        .zip(ols.t_values())
        .zip(ols.p_values()?)
        .map(
            |((((name, &estimate), &std_error), t_value), p_value)| Coefficient {
                name,
                estimate,
                std_error,
                t_value,
                p_value,
            },
        )
        .collect();

    Ok(FittedModel {
        target,
        predictors,
        coefficients,
        r_squared: ols.r_squared(),
        adjusted_r_squared: ols.adjusted_r_squared(),
        f_statistic: ols.f_statistic(),
        f_p_value: ols.f_p_value()?,
        observations: ols.observations(),
        df_residual: ols.df_residual(),
    })
}

/// `β0 + Σ βi·xi`, with `values` in predictor order
pub fn predict(model: &FittedModel, values: &[f64]) -> Result<f64> {
    if values.len() != model.predictors.len() {
        return Err(Error::PredictorMismatch {
            expected: model.predictors.len(),
            found: values.len(),
        });
    }

    Ok(model.coefficients[1..]
        .iter()
        .zip(values)
        .fold(model.intercept(), |acc, (c, x)| acc + c.estimate * x))
}
