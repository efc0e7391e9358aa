//! Ordinary least squares
//!
//! Solves the normal equations (X'X) b = X'y with Gauss-Jordan elimination and
//! reports classical (homoskedastic) standard errors:
//!
//! se(b_j) = sqrt(s² · [(X'X)⁻¹]_jj),  s² = SSR / (n - k)

use crate::error::{EvalError, Result};
use ndarray::{Array1, Array2, Axis, s};

/// Relative pivot size below which the design is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Fitted regression.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// Estimated coefficients, one per design column
    pub coefficients: Array1<f64>,
    /// Standard errors of the coefficients
    pub std_errors: Array1<f64>,
    /// t-statistics (coefficient / standard error)
    pub t_values: Array1<f64>,
    /// Residual variance s²
    pub residual_variance: f64,
    /// Residual degrees of freedom (n - k)
    pub dof: usize,
}

/// Prepend a column of ones to `x`.
pub fn add_constant(x: &Array2<f64>) -> Array2<f64> {
    let mut design = Array2::<f64>::ones((x.nrows(), x.ncols() + 1));
    design.slice_mut(s![.., 1..]).assign(x);
    design
}

/// Fit `y = X b + e` by least squares.
///
/// # Errors
/// * `DimensionMismatch` if `x` and `y` disagree on the number of rows
/// * `InsufficientData` if there are no residual degrees of freedom
/// * `SingularMatrix` if the columns of `x` are linearly dependent
pub fn ols(x: &Array2<f64>, y: &Array1<f64>) -> Result<OlsFit> {
    let (n, k) = x.dim();
    if y.len() != n {
        return Err(EvalError::DimensionMismatch {
            expected: n,
            actual: y.len(),
        });
    }
    if k == 0 || n <= k {
        return Err(EvalError::InsufficientData {
            observations: n,
            parameters: k,
        });
    }

    let xtx = x.t().dot(x);
    let xtx_inv = invert(&xtx)?;
    let coefficients = xtx_inv.dot(&x.t().dot(y));

    let residuals = y - &x.dot(&coefficients);
    let dof = n - k;
    let residual_variance = residuals.dot(&residuals) / dof as f64;

    let std_errors = xtx_inv
        .diag()
        .mapv(|v| (residual_variance * v).max(0.0).sqrt());
    let t_values = &coefficients / &std_errors;

    Ok(OlsFit {
        coefficients,
        std_errors,
        t_values,
        residual_variance,
        dof,
    })
}

/// t-statistic of the slope in `return = a + b * factor`.
///
/// `None` when the regression cannot be fitted (fewer than three points or a
/// constant factor) or the slope's standard error is zero. A standard error
/// that is rounding noise relative to the slope counts as zero.
pub fn factor_t_value(factor: &[f64], returns: &[f64]) -> Option<f64> {
    slope_fit(factor, returns).and_then(|fit| {
        let beta = fit.coefficients[1];
        let se = fit.std_errors[1];
        let t = fit.t_values[1];
        (se > 0.0 && se > SINGULAR_TOLERANCE * beta.abs() && t.is_finite()).then_some(t)
    })
}

/// Slope of `return = a + b * factor`, `None` when the regression cannot be fitted.
pub fn factor_beta(factor: &[f64], returns: &[f64]) -> Option<f64> {
    slope_fit(factor, returns)
        .map(|fit| fit.coefficients[1])
        .filter(|b| b.is_finite())
}

fn slope_fit(factor: &[f64], returns: &[f64]) -> Option<OlsFit> {
    if factor.len() != returns.len() {
        return None;
    }
    let x = Array1::from(factor.to_vec()).insert_axis(Axis(1));
    let y = Array1::from(returns.to_vec());
    ols(&add_constant(&x), &y).ok()
}

/// Inverse of a square matrix by Gauss-Jordan elimination with partial pivoting.
fn invert(matrix: &Array2<f64>) -> Result<Array2<f64>> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(EvalError::DimensionMismatch {
            expected: n,
            actual: matrix.ncols(),
        });
    }

    let scale = matrix
        .diag()
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return Err(EvalError::SingularMatrix);
    }

    let mut a = matrix.clone();
    let mut inv = Array2::<f64>::eye(n);

    for col in 0..n {
        // Pick the largest pivot in this column
        let mut pivot_row = col;
        for row in (col + 1)..n {
            if a[[row, col]].abs() > a[[pivot_row, col]].abs() {
                pivot_row = row;
            }
        }

        let pivot = a[[pivot_row, col]];
        if pivot.abs() <= SINGULAR_TOLERANCE * scale {
            return Err(EvalError::SingularMatrix);
        }

        if pivot_row != col {
            for j in 0..n {
                a.swap([col, j], [pivot_row, j]);
                inv.swap([col, j], [pivot_row, j]);
            }
        }

        for j in 0..n {
            a[[col, j]] /= pivot;
            inv[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                a[[row, j]] -= factor * a[[col, j]];
                inv[[row, j]] -= factor * inv[[col, j]];
            }
        }
    }

    Ok(inv)
}
