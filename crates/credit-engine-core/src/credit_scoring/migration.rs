//! Rating migration matrices.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CreditEngineError;
use crate::types::Probability;
use crate::CreditEngineResult;

/// Allowed |row sum − 1|.
const ROW_TOLERANCE: Decimal = dec!(0.000000001);

/// Ratings ordered best to worst with a row-stochastic transition matrix.
/// Row `i` is "from `ratings[i]`", column `j` is "to `ratings[j]`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationMatrix {
    pub ratings: Vec<String>,
    pub transition_probabilities: Vec<Vec<Probability>>,
}

impl MigrationMatrix {
    pub fn new(ratings: Vec<String>, transition_probabilities: Vec<Vec<Probability>>) -> CreditEngineResult<Self> {
        let matrix = MigrationMatrix { ratings, transition_probabilities };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Normalizes observed transition counts row by row. A rating with
    /// no observations stays put with probability 1.
    pub fn from_counts(ratings: Vec<String>, counts: &[Vec<u64>]) -> CreditEngineResult<Self> {
        let n = ratings.len();
        check_square(n, counts.iter().map(Vec::len), counts.len())?;

        let probabilities = counts
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let total: u64 = row.iter().sum();
                if total == 0 {
                    (0..n).map(|j| if i == j { Decimal::ONE } else { Decimal::ZERO }).collect()
                } else {
                    let total = Decimal::from(total);
                    row.iter().map(|&c| Decimal::from(c) / total).collect()
                }
            })
            .collect();

        Self::new(ratings, probabilities)
    }

    pub fn validate(&self) -> CreditEngineResult<()> {
        let n = self.ratings.len();
        if n == 0 {
            return Err(CreditEngineError::InsufficientData("migration matrix has no ratings".into()));
        }
        check_square(
            n,
            self.transition_probabilities.iter().map(Vec::len),
            self.transition_probabilities.len(),
        )?;
        for (i, row) in self.transition_probabilities.iter().enumerate() {
            if row.iter().any(|p| *p < Decimal::ZERO) {
                return Err(CreditEngineError::invalid_input(
                    "transition_probabilities",
                    format!("row {} has a negative probability", self.ratings[i]),
                ));
            }
            let sum: Decimal = row.iter().sum();
            if (sum - Decimal::ONE).abs() > ROW_TOLERANCE {
                return Err(CreditEngineError::invalid_input(
                    "transition_probabilities",
                    format!("row {} sums to {sum}", self.ratings[i]),
                ));
            }
        }
        Ok(())
    }

    pub fn index_of(&self, rating: &str) -> CreditEngineResult<usize> {
        self.ratings
            .iter()
            .position(|r| r == rating)
            .ok_or_else(|| CreditEngineError::invalid_input("rating", format!("'{rating}' is not in the matrix")))
    }

    /// Probability of moving to a better rating within one period.
    pub fn upgrade_probability(&self, rating: &str) -> CreditEngineResult<Probability> {
        let i = self.index_of(rating)?;
        Ok(self.transition_probabilities[i][..i].iter().sum())
    }

    /// Probability of moving to a worse rating (default included).
    pub fn downgrade_probability(&self, rating: &str) -> CreditEngineResult<Probability> {
        let i = self.index_of(rating)?;
        Ok(self.transition_probabilities[i][i + 1..].iter().sum())
    }

    /// Expected notch move `Σ p_ij (j − i)`; positive is deterioration.
    pub fn rating_drift(&self, rating: &str) -> CreditEngineResult<Decimal> {
        let i = self.index_of(rating)?;
        Ok(self.transition_probabilities[i]
            .iter()
            .enumerate()
            .map(|(j, p)| *p * (Decimal::from(j as i64) - Decimal::from(i as i64)))
            .sum())
    }

    /// `periods`-step matrix by repeated squaring.
    pub fn n_period(&self, periods: u32) -> MigrationMatrix {
        MigrationMatrix {
            ratings: self.ratings.clone(),
            transition_probabilities: matrix_power(&self.transition_probabilities, periods),
        }
    }

    /// Probability of reaching the last (default) state within `periods`.
    pub fn cumulative_default_probability(&self, rating: &str, periods: u32) -> CreditEngineResult<Probability> {
        let i = self.index_of(rating)?;
        let n = self.ratings.len();
        let multi = matrix_power(&self.transition_probabilities, periods);
        Ok(multi[i][n - 1])
    }
}

// ---------------------------------------------------------------------------
// Matrix operations
// ---------------------------------------------------------------------------

fn check_square(n: usize, row_lengths: impl Iterator<Item = usize>, rows: usize) -> CreditEngineResult<()> {
    if rows != n {
        return Err(CreditEngineError::dimension_mismatch("migration matrix rows", n, rows));
    }
    for len in row_lengths {
        if len != n {
            return Err(CreditEngineError::dimension_mismatch("migration matrix columns", n, len));
        }
    }
    Ok(())
}

fn identity(n: usize) -> Vec<Vec<Decimal>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { Decimal::ONE } else { Decimal::ZERO }).collect())
        .collect()
}

fn matrix_multiply(a: &[Vec<Decimal>], b: &[Vec<Decimal>]) -> Vec<Vec<Decimal>> {
    let n = a.len();
    let mut result = vec![vec![Decimal::ZERO; n]; n];
    for (i, row) in result.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..n).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    result
}

fn matrix_power(m: &[Vec<Decimal>], exp: u32) -> Vec<Vec<Decimal>> {
    let mut result = identity(m.len());
    let mut base = m.to_vec();
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = matrix_multiply(&result, &base);
        }
        e >>= 1;
        if e > 0 {
            base = matrix_multiply(&base, &base);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        ["A", "B", "D"].iter().map(|s| s.to_string()).collect()
    }

    fn matrix() -> MigrationMatrix {
        MigrationMatrix::new(
            labels(),
            vec![
                vec![dec!(0.90), dec!(0.08), dec!(0.02)],
                vec![dec!(0.10), dec!(0.80), dec!(0.10)],
                vec![dec!(0), dec!(0), dec!(1)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_counts_rows_stochastic() {
        let m = MigrationMatrix::from_counts(labels(), &[vec![7, 2, 1], vec![1, 1, 1], vec![0, 0, 0]]).unwrap();
        for row in &m.transition_probabilities {
            let sum: Decimal = row.iter().sum();
            assert!((sum - Decimal::ONE).abs() <= ROW_TOLERANCE);
        }
        // No observations from D: absorbing
        assert_eq!(m.transition_probabilities[2], vec![dec!(0), dec!(0), dec!(1)]);
    }

    #[test]
    fn test_upgrade_downgrade_drift() {
        let m = matrix();
        assert_eq!(m.upgrade_probability("B").unwrap(), dec!(0.10));
        assert_eq!(m.downgrade_probability("B").unwrap(), dec!(0.10));
        assert_eq!(m.upgrade_probability("A").unwrap(), Decimal::ZERO);
        assert_eq!(m.rating_drift("A").unwrap(), dec!(0.12));
        assert_eq!(m.rating_drift("B").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_cumulative_default_grows() {
        let m = matrix();
        let one = m.cumulative_default_probability("A", 1).unwrap();
        let two = m.cumulative_default_probability("A", 2).unwrap();
        assert_eq!(one, dec!(0.02));
        // 0.9*0.02 + 0.08*0.10 + 0.02*1
        assert_eq!(two, dec!(0.046));
        assert_eq!(m.n_period(0).transition_probabilities, identity(3));
    }

    #[test]
    fn test_bad_row_rejected() {
        let err = MigrationMatrix::new(
            labels(),
            vec![
                vec![dec!(0.90), dec!(0.08), dec!(0.01)],
                vec![dec!(0.10), dec!(0.80), dec!(0.10)],
                vec![dec!(0), dec!(0), dec!(1)],
            ],
        )
        .unwrap_err();
        assert!(matches!(err, CreditEngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_unknown_rating() {
        match matrix().upgrade_probability("CCC").unwrap_err() {
            CreditEngineError::InvalidInput { field, .. } => assert_eq!(field, "rating"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_non_square_rejected() {
        let err = MigrationMatrix::from_counts(labels(), &[vec![1, 0], vec![0, 1], vec![0, 1]]).unwrap_err();
        assert!(matches!(err, CreditEngineError::DimensionMismatch { .. }));
    }
}
