//! Newton-Raphson root finding.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CreditEngineError;
use crate::CreditEngineResult;

/// Derivatives smaller than this in magnitude abort the solve.
pub const MIN_DERIVATIVE: Decimal = dec!(0.0000000001);

/// Configuration shared by every iterative solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub tolerance: Decimal,
    pub max_iterations: u32,
    /// Sanity band for the root. An iterate leaving the band aborts the
    /// solve; a converged root outside it is reported as out of range.
    #[serde(default)]
    pub lower_bound: Option<Decimal>,
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            tolerance: dec!(0.00000001),
            max_iterations: 100,
            lower_bound: None,
            upper_bound: None,
        }
    }
}

impl SolverConfig {
    pub fn new(tolerance: Decimal, max_iterations: u32) -> Self {
        SolverConfig {
            tolerance,
            max_iterations,
            lower_bound: None,
            upper_bound: None,
        }
    }

    pub fn with_bounds(mut self, lower: Decimal, upper: Decimal) -> Self {
        self.lower_bound = Some(lower);
        self.upper_bound = Some(upper);
        self
    }

    /// Yield solves: default tolerance, band [-10%, 100%].
    pub fn yield_solver() -> Self {
        SolverConfig::default().with_bounds(dec!(-0.10), dec!(1.0))
    }

    /// Spread solves: 1e-6 tolerance, 100 iterations.
    pub fn z_spread() -> Self {
        SolverConfig::new(dec!(0.000001), 100).with_bounds(dec!(-1.0), dec!(1.0))
    }

    fn in_bounds(&self, x: Decimal) -> bool {
        self.lower_bound.map_or(true, |lo| x >= lo) && self.upper_bound.map_or(true, |hi| x <= hi)
    }
}

/// A converged root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub root: Decimal,
    pub iterations: u32,
    pub residual: Decimal,
}

/// Solve `f(x) = 0` by Newton-Raphson from `x0`.
///
/// Fails with [`CreditEngineError::ConvergenceFailure`] when the derivative
/// vanishes, the iteration budget is exhausted, or an intermediate iterate
/// leaves the configured band. A root that converges outside the band fails
/// with [`CreditEngineError::OutOfRangeResult`].
pub fn newton_raphson<F, D>(
    function: &str,
    f: F,
    df: D,
    x0: Decimal,
    config: &SolverConfig,
) -> CreditEngineResult<SolverResult>
where
    F: Fn(Decimal) -> Decimal,
    D: Fn(Decimal) -> Decimal,
{
    let mut x = x0;
    let mut last_delta = Decimal::ZERO;

    for iteration in 1..=config.max_iterations {
        let fx = f(x);
        if fx.abs() < config.tolerance {
            return finish(function, x, iteration - 1, fx, config);
        }

        let dfx = df(x);
        if dfx.abs() < MIN_DERIVATIVE {
            warn!(function, iteration, x = %x, "derivative vanished");
            return Err(CreditEngineError::ConvergenceFailure {
                function: function.into(),
                iterations: iteration,
                last_delta: fx,
            });
        }

        let step = fx / dfx;
        let next = x - step;
        last_delta = step;

        if step.abs() < config.tolerance {
            return finish(function, next, iteration, f(next), config);
        }

        if !config.in_bounds(next) {
            warn!(function, iteration, x = %next, "iterate left the sanity band");
            return Err(CreditEngineError::ConvergenceFailure {
                function: function.into(),
                iterations: iteration,
                last_delta: step,
            });
        }
        x = next;
    }

    warn!(function, iterations = config.max_iterations, "iteration budget exhausted");
    Err(CreditEngineError::ConvergenceFailure {
        function: function.into(),
        iterations: config.max_iterations,
        last_delta,
    })
}

fn finish(
    function: &str,
    root: Decimal,
    iterations: u32,
    residual: Decimal,
    config: &SolverConfig,
) -> CreditEngineResult<SolverResult> {
    if !config.in_bounds(root) {
        return Err(CreditEngineError::OutOfRangeResult {
            function: function.into(),
            value: root,
            lower: config.lower_bound.unwrap_or(Decimal::MIN),
            upper: config.upper_bound.unwrap_or(Decimal::MAX),
        });
    }
    debug!(function, iterations, root = %root, "converged");
    Ok(SolverResult {
        root,
        iterations,
        residual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_root_of_two() {
        let result = newton_raphson(
            "sqrt2",
            |x| x * x - dec!(2),
            |x| dec!(2) * x,
            Decimal::ONE,
            &SolverConfig::default(),
        )
        .unwrap();
        assert!((result.root - dec!(1.41421356237)).abs() < dec!(0.00000001));
        assert!(result.iterations < 10);
    }

    #[test]
    fn test_zero_derivative_fails() {
        let err = newton_raphson(
            "flat",
            |_| Decimal::ONE,
            |_| Decimal::ZERO,
            Decimal::ZERO,
            &SolverConfig::default(),
        )
        .unwrap_err();
        match err {
            CreditEngineError::ConvergenceFailure { iterations, .. } => assert_eq!(iterations, 1),
            other => panic!("Expected ConvergenceFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_budget_exhausted() {
        // x^2 + 1 has no real root; Newton oscillates.
        let config = SolverConfig::new(dec!(0.00000001), 15);
        let err = newton_raphson(
            "no_root",
            |x| x * x + Decimal::ONE,
            |x| dec!(2) * x,
            dec!(0.5),
            &config,
        )
        .unwrap_err();
        match err {
            CreditEngineError::ConvergenceFailure { iterations, .. } => assert_eq!(iterations, 15),
            other => panic!("Expected ConvergenceFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_iterate_leaving_band_fails() {
        // Root at 5, band tops out at 1: the first step jumps past it.
        let config = SolverConfig::default().with_bounds(dec!(-1), dec!(1));
        let err = newton_raphson("linear", |x| x - dec!(5), |_| Decimal::ONE, Decimal::ZERO, &config)
            .unwrap_err();
        assert!(matches!(err, CreditEngineError::ConvergenceFailure { .. }));
    }

    #[test]
    fn test_converged_root_outside_band_is_out_of_range() {
        // Starting at the root means no step is taken.
        let config = SolverConfig::default().with_bounds(dec!(-1), dec!(1));
        let err = newton_raphson("linear", |x| x - dec!(5), |_| Decimal::ONE, dec!(5), &config)
            .unwrap_err();
        match err {
            CreditEngineError::OutOfRangeResult { value, .. } => assert_eq!(value, dec!(5)),
            other => panic!("Expected OutOfRangeResult, got {other:?}"),
        }
    }
}
