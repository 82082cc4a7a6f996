use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::CreditEngineError;
use crate::CreditEngineResult;

/// Solve `A x = b` by Gaussian elimination with partial pivoting.
///
/// `A` must be square and non-singular. Singularity is not detected: a
/// zero pivot column is skipped and its unknown left at zero, so a singular
/// system yields a meaningless vector rather than an error.
pub fn gaussian_elimination(a: &[Vec<Decimal>], b: &[Decimal]) -> CreditEngineResult<Vec<Decimal>> {
    let n = a.len();
    if b.len() != n {
        return Err(CreditEngineError::dimension_mismatch("gaussian_elimination rhs", n, b.len()));
    }
    for row in a {
        if row.len() != n {
            return Err(CreditEngineError::dimension_mismatch(
                "gaussian_elimination matrix row",
                n,
                row.len(),
            ));
        }
    }

    // Augmented matrix [A | b]
    let mut m: Vec<Vec<Decimal>> = a
        .iter()
        .zip(b)
        .map(|(row, &rhs)| {
            let mut r = row.clone();
            r.push(rhs);
            r
        })
        .collect();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| m[i][col].abs().cmp(&m[j][col].abs()))
            .unwrap_or(col);
        m.swap(col, pivot_row);

        let pivot = m[col][col];
        if pivot.is_zero() {
            continue;
        }
        for row in (col + 1)..n {
            let factor = m[row][col] / pivot;
            if factor.is_zero() {
                continue;
            }
            for k in col..=n {
                let delta = factor * m[col][k];
                m[row][k] -= delta;
            }
        }
    }

    let mut x = vec![Decimal::ZERO; n];
    for i in (0..n).rev() {
        if m[i][i].is_zero() {
            continue;
        }
        let mut sum = m[i][n];
        for j in (i + 1)..n {
            sum -= m[i][j] * x[j];
        }
        x[i] = sum / m[i][i];
    }
    Ok(x)
}

/// Ordinary least squares via the normal equations `(XᵀX) β = Xᵀy`.
///
/// Each row of `x` is one observation. Include a column of ones for an
/// intercept.
pub fn linear_regression(x: &[Vec<Decimal>], y: &[Decimal]) -> CreditEngineResult<Vec<Decimal>> {
    let n = x.len();
    if y.len() != n {
        return Err(CreditEngineError::dimension_mismatch("linear_regression observations", n, y.len()));
    }
    let k = x.first().map(|r| r.len()).unwrap_or(0);
    if k == 0 || n < k {
        return Err(CreditEngineError::InsufficientData(format!(
            "linear_regression needs at least {k} observations for {k} regressors, got {n}"
        )));
    }
    if let Some(bad) = x.iter().find(|r| r.len() != k) {
        return Err(CreditEngineError::dimension_mismatch("linear_regression regressors", k, bad.len()));
    }

    let mut xtx = vec![vec![dec!(0); k]; k];
    let mut xty = vec![dec!(0); k];
    for (row, &yi) in x.iter().zip(y) {
        for i in 0..k {
            xty[i] += row[i] * yi;
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    gaussian_elimination(&xtx, &xty)
}
