//! Nelson-Siegel and Svensson curves.
//!
//! λ is held fixed, which makes the Nelson-Siegel model linear in its betas
//! and lets the fit run as a single least-squares regression on the three
//! basis functions. The Svensson fit keeps β3 at zero with a fixed λ2, so it
//! currently reproduces the Nelson-Siegel curve.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::yield_curve::{CurveMethod, YieldCurve, YieldCurvePoint};
use crate::error::CreditEngineError;
use crate::math::{decimal_exp, decimal_sqrt, linear_regression};
use crate::types::{Rate, Years};
use crate::CreditEngineResult;

pub const DEFAULT_LAMBDA: Decimal = dec!(2.0);
pub const DEFAULT_SVENSSON_LAMBDA2: Decimal = dec!(5.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NelsonSiegelParameters {
    /// Long-term level
    pub beta0: Decimal,
    /// Short-term component
    pub beta1: Decimal,
    /// Medium-term hump
    pub beta2: Decimal,
    /// Decay time scale in years
    pub lambda: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvenssonParameters {
    pub beta0: Decimal,
    pub beta1: Decimal,
    pub beta2: Decimal,
    /// Second hump
    pub beta3: Decimal,
    pub lambda1: Decimal,
    pub lambda2: Decimal,
}

/// Fitted parameters with goodness-of-fit statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParametricFit<P> {
    pub parameters: P,
    pub fitted_rates: Vec<Rate>,
    /// Observed minus fitted
    pub residuals: Vec<Decimal>,
    pub rmse: Decimal,
    pub r_squared: Decimal,
}

/// `β0 + β1·F1(τ) + β2·F2(τ)` with `F1 = (1 − e^(−τ/λ)) / (τ/λ)` and
/// `F2 = F1 − e^(−τ/λ)`.
pub fn evaluate_nelson_siegel(params: &NelsonSiegelParameters, maturity: Years) -> Rate {
    let (f1, f2) = basis(maturity, params.lambda);
    params.beta0 + params.beta1 * f1 + params.beta2 * f2
}

pub fn evaluate_svensson(params: &SvenssonParameters, maturity: Years) -> Rate {
    let (f1, f2) = basis(maturity, params.lambda1);
    let (_, f3) = basis(maturity, params.lambda2);
    params.beta0 + params.beta1 * f1 + params.beta2 * f2 + params.beta3 * f3
}

/// Fit β0..β2 at a fixed λ (default 2.0) by linear regression.
pub fn fit_nelson_siegel(
    points: &[YieldCurvePoint],
    lambda: Option<Decimal>,
) -> CreditEngineResult<ParametricFit<NelsonSiegelParameters>> {
    let lambda = lambda.unwrap_or(DEFAULT_LAMBDA);
    check_fit_input(points, lambda, "lambda")?;

    let x: Vec<Vec<Decimal>> = points
        .iter()
        .map(|p| {
            let (f1, f2) = basis(p.maturity, lambda);
            vec![Decimal::ONE, f1, f2]
        })
        .collect();
    let y: Vec<Decimal> = points.iter().map(|p| p.rate).collect();
    let beta = linear_regression(&x, &y)?;

    let parameters = NelsonSiegelParameters {
        beta0: beta[0],
        beta1: beta[1],
        beta2: beta[2],
        lambda,
    };
    Ok(goodness_of_fit(points, parameters, |p, t| evaluate_nelson_siegel(p, t)))
}

/// Svensson fit with β3 = 0 and fixed λ1, λ2.
pub fn fit_svensson(
    points: &[YieldCurvePoint],
    lambda1: Option<Decimal>,
    lambda2: Option<Decimal>,
) -> CreditEngineResult<ParametricFit<SvenssonParameters>> {
    let lambda2 = lambda2.unwrap_or(DEFAULT_SVENSSON_LAMBDA2);
    if lambda2 <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("lambda2", "must be positive"));
    }
    let ns = fit_nelson_siegel(points, lambda1)?;
    let parameters = SvenssonParameters {
        beta0: ns.parameters.beta0,
        beta1: ns.parameters.beta1,
        beta2: ns.parameters.beta2,
        beta3: Decimal::ZERO,
        lambda1: ns.parameters.lambda,
        lambda2,
    };
    Ok(goodness_of_fit(points, parameters, |p, t| evaluate_svensson(p, t)))
}

/// Sample a fitted Nelson-Siegel curve at the given maturities.
pub fn nelson_siegel_curve(params: &NelsonSiegelParameters, maturities: &[Years]) -> CreditEngineResult<YieldCurve> {
    let points = maturities
        .iter()
        .map(|&m| YieldCurvePoint {
            maturity: m,
            rate: evaluate_nelson_siegel(params, m),
        })
        .collect();
    YieldCurve::new(points, CurveMethod::NelsonSiegel)
}

fn basis(maturity: Years, lambda: Decimal) -> (Decimal, Decimal) {
    if maturity <= Decimal::ZERO || lambda <= Decimal::ZERO {
        return (Decimal::ONE, Decimal::ZERO);
    }
    let x = maturity / lambda;
    let e = decimal_exp(-x);
    let f1 = (Decimal::ONE - e) / x;
    (f1, f1 - e)
}

fn goodness_of_fit<P: Copy>(
    points: &[YieldCurvePoint],
    parameters: P,
    eval: impl Fn(&P, Years) -> Rate,
) -> ParametricFit<P> {
    let n = Decimal::from(points.len());
    let mean = points.iter().map(|p| p.rate).sum::<Decimal>() / n;

    let fitted_rates: Vec<Rate> = points.iter().map(|p| eval(&parameters, p.maturity)).collect();
    let residuals: Vec<Decimal> = points.iter().zip(&fitted_rates).map(|(p, f)| p.rate - f).collect();

    let ss_res: Decimal = residuals.iter().map(|r| r * r).sum();
    let ss_tot: Decimal = points.iter().map(|p| (p.rate - mean) * (p.rate - mean)).sum();

    ParametricFit {
        parameters,
        fitted_rates,
        residuals,
        rmse: decimal_sqrt(ss_res / n),
        r_squared: if ss_tot > Decimal::ZERO {
            Decimal::ONE - ss_res / ss_tot
        } else {
            Decimal::ONE
        },
    }
}

fn check_fit_input(points: &[YieldCurvePoint], lambda: Decimal, field: &str) -> CreditEngineResult<()> {
    if points.len() < 3 {
        return Err(CreditEngineError::InsufficientData(
            "Nelson-Siegel requires at least 3 curve points".into(),
        ));
    }
    if lambda <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input(field, "must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    fn synthetic_points(params: &NelsonSiegelParameters) -> Vec<YieldCurvePoint> {
        [dec!(0.25), dec!(0.5), dec!(1), dec!(2), dec!(3), dec!(5), dec!(7), dec!(10), dec!(20), dec!(30)]
            .iter()
            .map(|&m| YieldCurvePoint {
                maturity: m,
                rate: evaluate_nelson_siegel(params, m),
            })
            .collect()
    }

    #[test]
    fn test_fit_recovers_generating_parameters() {
        let truth = NelsonSiegelParameters {
            beta0: dec!(0.045),
            beta1: dec!(-0.02),
            beta2: dec!(0.01),
            lambda: DEFAULT_LAMBDA,
        };
        let fit = fit_nelson_siegel(&synthetic_points(&truth), None).unwrap();
        assert!(approx_eq(fit.parameters.beta0, truth.beta0, dec!(0.0000001)));
        assert!(approx_eq(fit.parameters.beta1, truth.beta1, dec!(0.0000001)));
        assert!(approx_eq(fit.parameters.beta2, truth.beta2, dec!(0.0000001)));
        assert!(fit.rmse < dec!(0.0000001));
        assert!(fit.r_squared > dec!(0.999999));
    }

    #[test]
    fn test_short_and_long_end_limits() {
        let p = NelsonSiegelParameters {
            beta0: dec!(0.05),
            beta1: dec!(-0.02),
            beta2: dec!(0.0),
            lambda: dec!(2),
        };
        assert_eq!(evaluate_nelson_siegel(&p, Decimal::ZERO), dec!(0.03));
        assert!(approx_eq(evaluate_nelson_siegel(&p, dec!(200)), dec!(0.0498), dec!(0.0001)));
    }

    #[test]
    fn test_flat_curve_fit() {
        let points: Vec<YieldCurvePoint> = [dec!(1), dec!(2), dec!(5), dec!(10)]
            .iter()
            .map(|&m| YieldCurvePoint { maturity: m, rate: dec!(0.04) })
            .collect();
        let fit = fit_nelson_siegel(&points, Some(dec!(1.5))).unwrap();
        for r in &fit.fitted_rates {
            assert!(approx_eq(*r, dec!(0.04), dec!(0.0000001)));
        }
        assert_eq!(fit.r_squared, Decimal::ONE);
    }

    #[test]
    fn test_svensson_keeps_beta3_zero() {
        let truth = NelsonSiegelParameters {
            beta0: dec!(0.04),
            beta1: dec!(-0.01),
            beta2: dec!(0.02),
            lambda: DEFAULT_LAMBDA,
        };
        let points = synthetic_points(&truth);
        let sv = fit_svensson(&points, None, None).unwrap();
        let ns = fit_nelson_siegel(&points, None).unwrap();
        assert_eq!(sv.parameters.beta3, Decimal::ZERO);
        assert_eq!(sv.parameters.lambda2, DEFAULT_SVENSSON_LAMBDA2);
        assert_eq!(sv.fitted_rates, ns.fitted_rates);
    }

    #[test]
    fn test_insufficient_points() {
        let points = vec![
            YieldCurvePoint { maturity: dec!(1), rate: dec!(0.03) },
            YieldCurvePoint { maturity: dec!(2), rate: dec!(0.035) },
        ];
        assert!(matches!(fit_nelson_siegel(&points, None), Err(CreditEngineError::InsufficientData(_))));
        assert!(matches!(
            fit_nelson_siegel(&synthetic_points(&NelsonSiegelParameters {
                beta0: dec!(0.04),
                beta1: dec!(0),
                beta2: dec!(0),
                lambda: dec!(1),
            }), Some(dec!(0))),
            Err(CreditEngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_nelson_siegel_curve_sampling() {
        let p = NelsonSiegelParameters {
            beta0: dec!(0.05),
            beta1: dec!(-0.01),
            beta2: dec!(0.0),
            lambda: dec!(2),
        };
        let curve = nelson_siegel_curve(&p, &[dec!(1), dec!(5), dec!(10)]).unwrap();
        assert_eq!(curve.method, CurveMethod::NelsonSiegel);
        assert_eq!(curve.rate_at(dec!(5)), evaluate_nelson_siegel(&p, dec!(5)));
    }
}
