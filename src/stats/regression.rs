//! Regression analysis

use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use crate::error::{Error, Result};

// Relative size below which a column counts as a combination of the ones before it
const RANK_TOLERANCE: f64 = 1e-10;

/// Ordinary least squares fit of `y = b0 + b1 * x1 + .. + bk * xk`
///
/// The design matrix (a column of ones followed by the predictors) is factored with Householder
/// reflections, so the normal equations are never formed.
#[derive(Clone, Debug)]
pub struct Ols {
    coefficients: Vec<f64>,
    standard_errors: Vec<f64>,
    ss_residual: f64,
    ss_total: f64,
    observations: usize,
}

impl Ols {
    /// Fits `ys` against an intercept plus one slice per predictor
    ///
    /// - Time: `O(length * predictors^2)`
    /// - Memory: `O(length * predictors)`
    ///
    /// # Panics
    ///
    /// Panics if a predictor slice and `ys` differ in length
    pub fn fit(predictors: &[&[f64]], ys: &[f64]) -> Result<Ols> {
        let n = ys.len();
        let p = predictors.len() + 1;
        assert!(predictors.iter().all(|xs| xs.len() == n));

        if n <= p {
            return Err(Error::InsufficientData {
                needed: p + 1,
                found: n,
            });
        }

        // Column major, intercept first
        let mut a: Vec<Vec<f64>> = Vec::with_capacity(p);
        a.push(vec![1.; n]);
        a.extend(predictors.iter().map(|xs| xs.to_vec()));
        let mut qty = ys.to_vec();

        let norms: Vec<f64> = a
            .iter()
            .map(|column| crate::stats::dot(column, column).sqrt())
            .collect();

        for j in 0..p {
            householder(&mut a, &mut qty, j);
        }

        // |R[j][j]| is the part of column j that the previous columns can't explain
        if (0..p).any(|j| a[j][j].abs() <= RANK_TOLERANCE * norms[j]) {
            return Err(Error::SingularDesignMatrix);
        }

        // R is stored in the upper triangle: R[i][j] == a[j][i]
        let r = |i: usize, j: usize| a[j][i];

        let mut coefficients = vec![0.; p];
        for i in (0..p).rev() {
            let tail: f64 = (i + 1..p).map(|j| r(i, j) * coefficients[j]).sum();
            coefficients[i] = (qty[i] - tail) / r(i, i);
        }

        let ss_residual = ys
            .iter()
            .enumerate()
            .map(|(row, &y)| {
                let fitted = coefficients[0]
                    + predictors
                        .iter()
                        .zip(&coefficients[1..])
                        .map(|(xs, b)| xs[row] * b)
                        .sum::<f64>();
                (y - fitted).powi(2)
            })
            .sum::<f64>();

        let y_bar = crate::stats::sum(ys) / n as f64;
        let ss_total = ys.iter().map(|&y| (y - y_bar).powi(2)).sum::<f64>();

        // Var(b) = sigma^2 (R'R)^-1 = sigma^2 R^-1 R^-T
        let sigma2 = ss_residual / (n - p) as f64;
        let r_inv = invert_upper(p, r);
        let standard_errors = r_inv
            .iter()
            .map(|row| (sigma2 * crate::stats::dot(row, row)).sqrt())
            .collect();

        Ok(Ols {
            coefficients,
            standard_errors,
            ss_residual,
            ss_total,
            observations: n,
        })
    }

    /// Intercept first, then one coefficient per predictor
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn standard_errors(&self) -> &[f64] {
        &self.standard_errors
    }

    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Residual degrees of freedom, `n - k - 1`
    pub fn df_residual(&self) -> usize {
        self.observations - self.coefficients.len()
    }

    /// Sum of squared residuals
    pub fn ss_residual(&self) -> f64 {
        self.ss_residual
    }

    /// `t` statistic of each coefficient against a zero null
    pub fn t_values(&self) -> Vec<f64> {
        self.coefficients
            .iter()
            .zip(&self.standard_errors)
            .map(|(b, se)| b / se)
            .collect()
    }

    /// Two-sided p-value of each coefficient
    ///
    /// A coefficient whose `t` is `NaN` (zero standard error over a zero estimate) gets a `NaN`
    /// p-value.
    pub fn p_values(&self) -> Result<Vec<f64>> {
        let dist = StudentsT::new(0., 1., self.df_residual() as f64)
            .map_err(|e| Error::InvalidDistribution(e.to_string()))?;

        Ok(self
            .t_values()
            .into_iter()
            .map(|t| {
                if t.is_nan() {
                    f64::NAN
                } else {
                    2. * dist.sf(t.abs())
                }
            })
            .collect())
    }

    /// Computes the goodness of fit (coefficient of determination)
    ///
    /// `NaN` when the response is constant.
    pub fn r_squared(&self) -> f64 {
        if self.ss_total == 0. {
            return f64::NAN;
        }

        1. - self.ss_residual / self.ss_total
    }

    /// R² penalized by the number of predictors
    pub fn adjusted_r_squared(&self) -> f64 {
        let n = self.observations as f64;
        let df = self.df_residual() as f64;

        1. - (1. - self.r_squared()) * (n - 1.) / df
    }

    /// F statistic of the regression against the intercept-only model
    ///
    /// `NaN` for a model without predictors.
    pub fn f_statistic(&self) -> f64 {
        let k = self.coefficients.len() - 1;
        if k == 0 {
            return f64::NAN;
        }

        let explained = (self.ss_total - self.ss_residual) / k as f64;
        let unexplained = self.ss_residual / self.df_residual() as f64;

        explained / unexplained
    }

    /// Probability of an F statistic at least this large under the intercept-only model
    ///
    /// `NaN` for a model without predictors. A perfect fit has an infinite F and a zero p-value.
    pub fn f_p_value(&self) -> Result<f64> {
        let k = self.coefficients.len() - 1;
        if k == 0 {
            return Ok(f64::NAN);
        }

        let f = self.f_statistic();
        if f.is_nan() {
            return Ok(f64::NAN);
        } else if f.is_infinite() {
            return Ok(0.);
        }

        let dist = FisherSnedecor::new(k as f64, self.df_residual() as f64)
            .map_err(|e| Error::InvalidDistribution(e.to_string()))?;

        Ok(dist.sf(f))
    }

    /// Evaluates the fitted hyperplane at `xs`
    ///
    /// # Panics
    ///
    /// Panics if `xs` doesn't hold exactly one value per predictor
    pub fn predict(&self, xs: &[f64]) -> f64 {
        assert_eq!(xs.len() + 1, self.coefficients.len());

        self.coefficients[0] + crate::stats::dot(&self.coefficients[1..], xs)
    }
}

// Reflects rows `j..` of columns `j..` (and of `qty`) so that column `j` vanishes below the
// diagonal
fn householder(a: &mut [Vec<f64>], qty: &mut [f64], j: usize) {
    let norm = crate::stats::dot(&a[j][j..], &a[j][j..]).sqrt();
    if norm == 0. {
        return;
    }

    let alpha = if a[j][j] > 0. { -norm } else { norm };
    let mut v = a[j][j..].to_vec();
    v[0] -= alpha;
    let v_norm2 = crate::stats::dot(&v, &v);
    if v_norm2 == 0. {
        return;
    }

    for column in a[j..].iter_mut() {
        reflect(&v, v_norm2, &mut column[j..]);
    }
    reflect(&v, v_norm2, &mut qty[j..]);
}

fn reflect(v: &[f64], v_norm2: f64, x: &mut [f64]) {
    let scale = 2. * crate::stats::dot(v, x) / v_norm2;

    for (xi, vi) in x.iter_mut().zip(v) {
        *xi -= scale * vi;
    }
}

// Inverse of the `p x p` upper triangular matrix `r`, returned row major
fn invert_upper<F>(p: usize, r: F) -> Vec<Vec<f64>>
where
    F: Fn(usize, usize) -> f64,
{
    let mut inv = vec![vec![0.; p]; p];

    for col in 0..p {
        inv[col][col] = 1. / r(col, col);
        for i in (0..col).rev() {
            let acc: f64 = (i + 1..=col).map(|k| r(i, k) * inv[k][col]).sum();
            inv[i][col] = -acc / r(i, i);
        }
    }

    inv
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use rand::Rng;

    use super::Ols;
    use crate::error::Error;

    #[test]
    fn simple_regression_by_hand() {
        let xs = [1., 2., 3., 4., 5.];
        let ys = [2., 4., 5., 4., 5.];
        let ols = Ols::fit(&[&xs], &ys).unwrap();

        assert_relative_eq!(ols.coefficients()[0], 2.2, epsilon = 1e-12);
        assert_relative_eq!(ols.coefficients()[1], 0.6, epsilon = 1e-12);
        assert_relative_eq!(ols.ss_residual(), 2.4, epsilon = 1e-12);
        assert_relative_eq!(ols.r_squared(), 0.6, epsilon = 1e-12);
        assert_relative_eq!(ols.adjusted_r_squared(), 1. - 0.4 * 4. / 3., epsilon = 1e-12);
        assert_relative_eq!(ols.standard_errors()[0], 0.88_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(ols.standard_errors()[1], 0.08_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(ols.t_values()[1], 2.121_320_343_559_642, epsilon = 1e-10);

        let p_values = ols.p_values().unwrap();
        assert_relative_eq!(p_values[0], 0.100_743_456_085_419_9, epsilon = 1e-9);
        assert_relative_eq!(p_values[1], 0.124_027_062_657_554_6, epsilon = 1e-9);

        assert_relative_eq!(ols.f_statistic(), 4.5, epsilon = 1e-10);
        assert_relative_eq!(ols.f_p_value().unwrap(), p_values[1], epsilon = 1e-9);
        assert_eq!(ols.df_residual(), 3);
        assert_relative_eq!(ols.predict(&[10.]), 8.2, epsilon = 1e-12);
    }

    #[test]
    fn two_predictors_by_hand() {
        let x1 = [1., 2., 3., 4., 5., 6., 7.];
        let x2 = [2., 1., 4., 3., 6., 5., 8.];
        let ys = [3., 5., 4., 8., 7., 10., 11.];
        let ols = Ols::fit(&[&x1, &x2], &ys).unwrap();

        assert_relative_eq!(ols.coefficients()[0], 281. / 168., epsilon = 1e-12);
        assert_relative_eq!(ols.coefficients()[1], 341. / 168., epsilon = 1e-12);
        assert_relative_eq!(ols.coefficients()[2], -17. / 24., epsilon = 1e-12);
        assert_eq!(ols.df_residual(), 4);

        // σ² = 53 / 84 and diag((XᵀX)⁻¹) = (241 / 336, 61 / 336, 7 / 48)
        let sigma2: f64 = 53. / 84.;
        let diag = [241. / 336., 61. / 336., 7. / 48.];
        for (se, d) in ols.standard_errors().iter().zip(&diag) {
            assert_relative_eq!(*se, (sigma2 * d).sqrt(), epsilon = 1e-12);
        }

        let p_values = ols.p_values().unwrap();
        assert_relative_eq!(p_values[0], 0.067_749_640_864_336_41, epsilon = 1e-9);
        assert_relative_eq!(p_values[1], 0.003_889_086_534_924_492, epsilon = 1e-9);
        assert_relative_eq!(p_values[2], 0.079_802_553_782_255_37, epsilon = 1e-9);

        assert_relative_eq!(ols.r_squared(), 1099. / 1152., epsilon = 1e-12);
        assert_relative_eq!(ols.f_statistic(), 41.471_698_113_207_545, epsilon = 1e-9);
        assert_relative_eq!(ols.f_p_value().unwrap(), 0.002_116_638_937_114_198, epsilon = 1e-9);
    }

    #[test]
    fn perfect_fit_is_significant() {
        let xs = [1., 2., 3., 4.];
        let ys = [3., 5., 7., 9.];
        let ols = Ols::fit(&[&xs], &ys).unwrap();

        assert!(ols.f_p_value().unwrap() < 1e-12);
        assert!(ols.p_values().unwrap()[1] < 1e-12);
    }

    #[test]
    fn recovers_exact_plane_with_correlated_predictors() {
        let x1: Vec<f64> = (0..40).map(|i| f64::from(i) * 0.5).collect();
        // Nearly collinear with x1
        let x2: Vec<f64> = x1
            .iter()
            .enumerate()
            .map(|(i, x)| x + 1e-4 * f64::from((i % 3) as u8))
            .collect();
        let ys: Vec<f64> = x1
            .iter()
            .zip(&x2)
            .map(|(a, b)| 1.5 + 2. * a - 3. * b)
            .collect();

        let ols = Ols::fit(&[&x1, &x2], &ys).unwrap();

        assert_relative_eq!(ols.coefficients()[0], 1.5, epsilon = 1e-6);
        assert_relative_eq!(ols.coefficients()[1], 2., epsilon = 1e-6);
        assert_relative_eq!(ols.coefficients()[2], -3., epsilon = 1e-6);
    }

    #[test]
    fn collinear_predictors_are_singular() {
        let x1 = [1., 2., 3., 4., 5., 6.];
        let x2: Vec<f64> = x1.iter().map(|x| 2. * x - 1.).collect();
        let ys = [3., 1., 4., 1., 5., 9.];

        match Ols::fit(&[&x1, &x2], &ys) {
            Err(Error::SingularDesignMatrix) => {}
            other => panic!("expected a singular design, got {:?}", other),
        }
    }

    #[test]
    fn constant_predictor_is_collinear_with_intercept() {
        let xs = [7.; 5];
        let ys = [1., 2., 3., 4., 5.];

        assert!(matches!(
            Ols::fit(&[&xs], &ys),
            Err(Error::SingularDesignMatrix)
        ));
    }

    #[test]
    fn needs_more_rows_than_coefficients() {
        let x1 = [1., 2., 4.];
        let x2 = [3., 1., 2.];
        let ys = [1., 0., 5.];

        // n = k + 1
        assert!(matches!(
            Ols::fit(&[&x1, &x2], &ys),
            Err(Error::InsufficientData {
                needed: 4,
                found: 3
            })
        ));

        // n = k + 2
        let x1 = [1., 2., 4., 8.];
        let x2 = [3., 1., 2., 1.];
        let ys = [1., 0., 5., 2.];
        let ols = Ols::fit(&[&x1, &x2], &ys).unwrap();
        assert_eq!(ols.df_residual(), 1);
    }

    #[test]
    fn least_squares_is_optimal() {
        let mut rng = crate::stats::test::rng(0x5eed);
        let n = 30;
        let x1: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..100.0)).collect();
        let x2: Vec<f64> = (0..n).map(|_| rng.gen_range(-5.0..5.0)).collect();
        let ys: Vec<f64> = x1
            .iter()
            .zip(&x2)
            .map(|(a, b)| 10. + 0.3 * a - 2. * b + rng.gen_range(-4.0..4.0))
            .collect();

        let ols = Ols::fit(&[&x1, &x2], &ys).unwrap();
        let ssr = |b: &[f64]| -> f64 {
            (0..n)
                .map(|i| (ys[i] - b[0] - b[1] * x1[i] - b[2] * x2[i]).powi(2))
                .sum()
        };
        let best = ssr(ols.coefficients());
        assert_relative_eq!(best, ols.ss_residual(), max_relative = 1e-9);

        for _ in 0..1000 {
            let perturbed: Vec<f64> = ols
                .coefficients()
                .iter()
                .map(|b| b + rng.gen_range(-1e-3..1e-3))
                .collect();

            assert!(ssr(&perturbed) >= best);
        }
    }
}
