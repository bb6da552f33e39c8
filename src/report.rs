use std::fmt::Write;

use anes::{Attribute, Color, ResetAttributes, SetAttribute, SetForegroundColor};
use itertools::Itertools;

use crate::analysis::{AnalysisOutput, ModelOutput};
use crate::format;
use crate::outliers::{ColumnStats, FilterStep};
use crate::record::Column;

/// Significance level below which coefficients are highlighted
const SIGNIFICANCE_LEVEL: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliVerbosity {
    Quiet,
    Normal,
    Verbose,
}

/// Renders an `AnalysisOutput` for the terminal
#[derive(Clone, Copy, Debug)]
pub struct CliReport {
    pub enable_text_coloring: bool,
    pub verbosity: CliVerbosity,
}

impl CliReport {
    pub fn new(enable_text_coloring: bool, verbosity: CliVerbosity) -> CliReport {
        CliReport {
            enable_text_coloring,
            verbosity,
        }
    }

    fn with_color(&self, color: Color, s: &str) -> String {
        if self.enable_text_coloring {
            format!("{}{}{}", SetForegroundColor(color), s, ResetAttributes)
        } else {
            String::from(s)
        }
    }

    fn green(&self, s: &str) -> String {
        self.with_color(Color::DarkGreen, s)
    }

    fn yellow(&self, s: &str) -> String {
        self.with_color(Color::DarkYellow, s)
    }

    fn red(&self, s: &str) -> String {
        self.with_color(Color::DarkRed, s)
    }

    fn bold(&self, s: String) -> String {
        if self.enable_text_coloring {
            format!("{}{}{}", SetAttribute(Attribute::Bold), s, ResetAttributes)
        } else {
            s
        }
    }

    fn faint(&self, s: String) -> String {
        if self.enable_text_coloring {
            format!("{}{}{}", SetAttribute(Attribute::Faint), s, ResetAttributes)
        } else {
            s
        }
    }

    pub fn print(&self, output: &AnalysisOutput) {
        print!("{}", self.render(output));
    }

    pub fn render(&self, output: &AnalysisOutput) -> String {
        let mut out = String::new();

        if self.verbosity != CliVerbosity::Quiet {
            for (column, stats) in &output.column_stats {
                self.column_stats(&mut out, *column, stats);
            }
            if !output.sparse_columns.is_empty() {
                let _ = writeln!(
                    out,
                    "{}",
                    self.faint(format!(
                        "Fewer than 2 values, no statistics: {}",
                        output.sparse_columns.iter().map(|c| c.alias()).join(", ")
                    ))
                );
            }
            out.push('\n');
            self.filter_steps(&mut out, output);
        }

        if self.verbosity == CliVerbosity::Verbose {
            self.summary(&mut out, output);
            self.monthly_totals(&mut out, output);
        }

        for model in &output.models {
            self.model(&mut out, model);
        }

        out
    }

    fn column_stats(&self, out: &mut String, column: Column, stats: &ColumnStats) {
        let _ = writeln!(
            out,
            "{:<40} {}",
            self.bold(column.to_string()),
            self.faint(format!(
                "[{} {} {}]",
                format::short(stats.lower_bound),
                format::short(stats.median),
                format::short(stats.upper_bound),
            )),
        );
        let _ = writeln!(
            out,
            "{:<24}min {:>10}  q1 {:>10}  q3 {:>10}  max {:>10}  iqr {}",
            "",
            format::short(stats.min),
            format::short(stats.q1),
            format::short(stats.q3),
            format::short(stats.max),
            format::short(stats.iqr),
        );
        self.outliers(out, stats);
    }

    fn outliers(&self, out: &mut String, stats: &ColumnStats) {
        let counts = stats.outliers;
        let noutliers = counts.total();
        let sample_size = stats.count;

        if noutliers == 0 {
            return;
        }

        let _ = writeln!(
            out,
            "{}",
            self.yellow(&format!(
                "Found {} outliers among {} records ({})",
                noutliers,
                sample_size,
                format::percent(noutliers, sample_size)
            ))
        );

        let mut print = |n, label| {
            if n != 0 {
                let _ = writeln!(
                    out,
                    "  {} ({}) {}",
                    n,
                    format::percent(n, sample_size),
                    label
                );
            }
        };

        print(counts.low_severe, "low severe");
        print(counts.low_mild, "low mild");
        print(counts.high_mild, "high mild");
        print(counts.high_severe, "high severe");
    }

    fn filter_steps(&self, out: &mut String, output: &AnalysisOutput) {
        for step in &output.filter_steps {
            let _ = writeln!(out, "{}", self.filter_step(step));
        }

        let removed = output.records_in - output.records_out;
        let line = format!(
            "Kept {} of {} records",
            format::integer(output.records_out as f64),
            format::integer(output.records_in as f64)
        );
        let _ = writeln!(
            out,
            "{}\n",
            if removed == 0 {
                self.green(&line)
            } else {
                self.yellow(&format!("{}, removed {}", line, removed))
            }
        );
    }

    fn filter_step(&self, step: &FilterStep) -> String {
        let range = match (step.lower, step.upper) {
            (Some(lo), Some(hi)) => format!("outside [{}, {}]", format::short(lo), format::short(hi)),
            (Some(lo), None) => format!("below {}", format::short(lo)),
            (None, Some(hi)) => format!("above {}", format::short(hi)),
            (None, None) => String::from("nothing"),
        };

        format!(
            "{:<24} removed {:>3} {}",
            step.column.alias(),
            step.removed,
            self.faint(range)
        )
    }

    fn summary(&self, out: &mut String, output: &AnalysisOutput) {
        let _ = writeln!(
            out,
            "{:<24} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        );
        for s in &output.summary {
            let _ = writeln!(
                out,
                "{:<24} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
                s.column.alias(),
                s.count,
                format::short(s.mean),
                format::short(s.std),
                format::short(s.min),
                format::short(s.q1),
                format::short(s.median),
                format::short(s.q3),
                format::short(s.max),
            );
        }
        out.push('\n');
    }

    fn monthly_totals(&self, out: &mut String, output: &AnalysisOutput) {
        let _ = writeln!(
            out,
            "{} by month: {}\n",
            output.monthly_column.alias(),
            output
                .monthly_totals
                .iter()
                .map(|(month, total)| format!("{:>2}={}", month, format::integer(*total)))
                .join(", ")
        );
    }

    fn model(&self, out: &mut String, fitted: &ModelOutput) {
        let model = &fitted.model;

        let _ = writeln!(
            out,
            "{} {}",
            self.bold(model.formula()),
            self.faint(format!(
                "(n = {}, df = {})",
                model.observations(),
                model.df_residual()
            ))
        );
        let _ = writeln!(
            out,
            "{:<24} {:>14} {:>12} {:>9} {:>8}",
            "", "coef", "std err", "t", "P>|t|"
        );
        for c in model.coefficients() {
            let p = format::p_value(c.p_value());
            let p = if c.p_value() < SIGNIFICANCE_LEVEL {
                self.green(&format!("{:>8}", p))
            } else {
                self.red(&format!("{:>8}", p))
            };
            let _ = writeln!(
                out,
                "{:<24} {:>14} {:>12} {:>9} {}",
                c.name(),
                format::estimate(c.estimate()),
                format::short(c.std_error()),
                format!("{:.3}", c.t_value()),
                p
            );
        }
        let _ = writeln!(
            out,
            "R-squared {:.4}  adj. {:.4}  F {} (p {})",
            model.r_squared(),
            model.adjusted_r_squared(),
            format::short(model.f_statistic()),
            format::p_value(model.f_p_value())
        );

        for prediction in &fitted.predictions {
            let inputs = model
                .predictors()
                .iter()
                .zip(&prediction.inputs)
                .map(|(c, x)| format!("{} = {}", c.alias(), x))
                .join(", ");
            let _ = writeln!(
                out,
                "Predicted {} at {}: {}",
                model.target().alias(),
                inputs,
                self.bold(format::short(prediction.value))
            );
        }
        out.push('\n');
    }
}
