//! Constant and piecewise-constant hazard rate default models.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CreditEngineError;
use crate::math::{decimal_exp, decimal_ln};
use crate::types::{Probability, Rate, Years};
use crate::CreditEngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Cumulative and marginal default probabilities on a tenor grid.
///
/// `marginal[i] = cumulative[i] − cumulative[i−1]`, which equals the
/// survival to `tenors[i−1]` times the forward PD over the interval.
/// Deserialisation runs the same checks as [`DefaultCurve::from_cumulative`];
/// `marginal` may be omitted from the input and is then derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDefaultCurve")]
pub struct DefaultCurve {
    pub tenors: Vec<Years>,
    pub cumulative: Vec<Probability>,
    pub marginal: Vec<Probability>,
}

#[derive(Deserialize)]
struct RawDefaultCurve {
    tenors: Vec<Years>,
    cumulative: Vec<Probability>,
    #[serde(default)]
    marginal: Option<Vec<Probability>>,
}

impl TryFrom<RawDefaultCurve> for DefaultCurve {
    type Error = CreditEngineError;

    fn try_from(raw: RawDefaultCurve) -> Result<Self, Self::Error> {
        let curve = DefaultCurve::from_cumulative(raw.tenors, raw.cumulative)?;
        if let Some(marginal) = raw.marginal {
            check_marginals(&curve.marginal, &marginal)?;
        }
        Ok(curve)
    }
}

const MARGINAL_TOLERANCE: Decimal = dec!(0.000000001);

impl DefaultCurve {
    pub fn from_cumulative(tenors: Vec<Years>, cumulative: Vec<Probability>) -> CreditEngineResult<Self> {
        let marginal = marginals_from_cumulative(&tenors, &cumulative)?;
        Ok(DefaultCurve { tenors, cumulative, marginal })
    }

    /// Re-check the grid invariants of a curve assembled field by field:
    /// positive strictly increasing tenors, non-decreasing cumulative PDs in
    /// [0, 1], and marginals equal to the cumulative differences.
    pub fn validate(&self) -> CreditEngineResult<()> {
        let expected = marginals_from_cumulative(&self.tenors, &self.cumulative)?;
        check_marginals(&expected, &self.marginal)
    }

    /// Flat hazard rate sampled at `tenors`.
    pub fn from_hazard_rate(hazard_rate: Rate, tenors: Vec<Years>) -> CreditEngineResult<Self> {
        let cumulative = tenors
            .iter()
            .map(|&t| reduced_form_default_probability(hazard_rate, t))
            .collect::<CreditEngineResult<Vec<_>>>()?;
        Self::from_cumulative(tenors, cumulative)
    }

    /// Piecewise-constant hazard: `hazard_rates[i]` applies on
    /// `(tenors[i−1], tenors[i]]`.
    pub fn from_hazard_rates(hazard_rates: &[Rate], tenors: Vec<Years>) -> CreditEngineResult<Self> {
        if hazard_rates.len() != tenors.len() {
            return Err(CreditEngineError::dimension_mismatch(
                "default curve hazard rates",
                tenors.len(),
                hazard_rates.len(),
            ));
        }
        let mut integrated = Decimal::ZERO;
        let mut prev_t = Decimal::ZERO;
        let mut cumulative = Vec::with_capacity(tenors.len());
        for (&h, &t) in hazard_rates.iter().zip(&tenors) {
            if h < Decimal::ZERO {
                return Err(CreditEngineError::invalid_input("hazard_rates", "must be non-negative"));
            }
            integrated += h * (t - prev_t);
            cumulative.push(Decimal::ONE - decimal_exp(-integrated));
            prev_t = t;
        }
        Self::from_cumulative(tenors, cumulative)
    }

    pub fn survival(&self, index: usize) -> Probability {
        self.cumulative.get(index).map_or(Decimal::ONE, |pd| Decimal::ONE - *pd)
    }

    /// Cumulative PD at `t`, log-linear in survival between tenors and
    /// flat hazard beyond the last one.
    pub fn cumulative_at(&self, t: Years) -> Probability {
        if t <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let mut prev_t = Decimal::ZERO;
        let mut prev_s = Decimal::ONE;
        for (i, &tenor) in self.tenors.iter().enumerate() {
            let s = self.survival(i);
            if t <= tenor || i + 1 == self.tenors.len() {
                if s <= Decimal::ZERO || prev_s <= Decimal::ZERO {
                    return Decimal::ONE;
                }
                let h = (decimal_ln(prev_s) - decimal_ln(s)) / (tenor - prev_t);
                return Decimal::ONE - prev_s * decimal_exp(-h * (t - prev_t));
            }
            prev_t = tenor;
            prev_s = s;
        }
        Decimal::ONE - prev_s
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// `1 − e^{−λt}`.
pub fn reduced_form_default_probability(hazard_rate: Rate, time_horizon: Years) -> CreditEngineResult<Probability> {
    if hazard_rate < Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("hazard_rate", "must be non-negative"));
    }
    if time_horizon < Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("time_horizon", "must be non-negative"));
    }
    Ok(Decimal::ONE - decimal_exp(-hazard_rate * time_horizon))
}

/// Conditional PD over `(t1, t2]` given survival to `t1`:
/// `(pd2 − pd1) / (1 − pd1)`.
pub fn forward_default_probability(pd1: Probability, pd2: Probability) -> CreditEngineResult<Probability> {
    for (field, pd) in [("pd1", pd1), ("pd2", pd2)] {
        if pd < Decimal::ZERO || pd > Decimal::ONE {
            return Err(CreditEngineError::invalid_input(field, "must lie within [0, 1]"));
        }
    }
    if pd2 < pd1 {
        return Err(CreditEngineError::invalid_input(
            "pd2",
            "cumulative PD cannot decrease with horizon",
        ));
    }
    if pd1 == Decimal::ONE {
        return Ok(Decimal::ONE);
    }
    Ok((pd2 - pd1) / (Decimal::ONE - pd1))
}

/// Constant hazard implied by a cumulative PD: `−ln(1 − pd) / t`.
pub fn hazard_rate_from_probability(pd: Probability, time_horizon: Years) -> CreditEngineResult<Rate> {
    if pd < Decimal::ZERO || pd >= Decimal::ONE {
        return Err(CreditEngineError::invalid_input("pd", "must lie within [0, 1)"));
    }
    if time_horizon <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("time_horizon", "must be positive"));
    }
    Ok(-decimal_ln(Decimal::ONE - pd) / time_horizon)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn marginals_from_cumulative(tenors: &[Years], cumulative: &[Probability]) -> CreditEngineResult<Vec<Probability>> {
    if tenors.is_empty() {
        return Err(CreditEngineError::InsufficientData(
            "default curve needs at least one tenor".into(),
        ));
    }
    if tenors.len() != cumulative.len() {
        return Err(CreditEngineError::dimension_mismatch(
            "default curve cumulative",
            tenors.len(),
            cumulative.len(),
        ));
    }
    if tenors[0] <= Decimal::ZERO || tenors.windows(2).any(|w| w[1] <= w[0]) {
        return Err(CreditEngineError::invalid_input(
            "tenors",
            "must be positive and strictly increasing",
        ));
    }
    let mut prev = Decimal::ZERO;
    let mut marginal = Vec::with_capacity(cumulative.len());
    for &pd in cumulative {
        if pd < prev || pd > Decimal::ONE {
            return Err(CreditEngineError::invalid_input(
                "cumulative",
                "must be non-decreasing within [0, 1]",
            ));
        }
        marginal.push(pd - prev);
        prev = pd;
    }
    Ok(marginal)
}

fn check_marginals(expected: &[Probability], supplied: &[Probability]) -> CreditEngineResult<()> {
    if expected.len() != supplied.len() {
        return Err(CreditEngineError::dimension_mismatch(
            "default curve marginal",
            expected.len(),
            supplied.len(),
        ));
    }
    if expected.iter().zip(supplied).any(|(e, s)| (*e - *s).abs() > MARGINAL_TOLERANCE) {
        return Err(CreditEngineError::invalid_input(
            "marginal",
            "must equal the differences of the cumulative PDs",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_reduced_form_pd() {
        let pd = reduced_form_default_probability(dec!(0.02), dec!(5)).unwrap();
        assert!(approx_eq(pd, dec!(0.0951625820), dec!(0.000000001)), "got {pd}");
    }

    #[test]
    fn test_forward_pd() {
        let fwd = forward_default_probability(dec!(0.1), dec!(0.19)).unwrap();
        assert!(approx_eq(fwd, dec!(0.1), dec!(0.0000000001)));
    }

    #[test]
    fn test_forward_pd_rejects_decreasing() {
        match forward_default_probability(dec!(0.2), dec!(0.1)).unwrap_err() {
            CreditEngineError::InvalidInput { field, .. } => assert_eq!(field, "pd2"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_hazard_round_trip() {
        let pd = reduced_form_default_probability(dec!(0.03), dec!(4)).unwrap();
        let h = hazard_rate_from_probability(pd, dec!(4)).unwrap();
        assert!(approx_eq(h, dec!(0.03), dec!(0.00000001)));
    }

    #[test]
    fn test_marginals_match_forward_identity() {
        let curve = DefaultCurve::from_hazard_rate(dec!(0.02), vec![dec!(1), dec!(2), dec!(3)]).unwrap();
        let total: Decimal = curve.marginal.iter().sum();
        assert!(approx_eq(total, curve.cumulative[2], dec!(0.0000000001)));
        for i in 1..3 {
            let fwd = forward_default_probability(curve.cumulative[i - 1], curve.cumulative[i]).unwrap();
            assert!(approx_eq(curve.marginal[i], curve.survival(i - 1) * fwd, dec!(0.0000000001)));
        }
    }

    #[test]
    fn test_piecewise_hazard() {
        let curve =
            DefaultCurve::from_hazard_rates(&[dec!(0.01), dec!(0.03)], vec![dec!(1), dec!(3)]).unwrap();
        let expected = Decimal::ONE - decimal_exp(dec!(-0.07));
        assert!(approx_eq(curve.cumulative[1], expected, dec!(0.0000000001)));
    }

    #[test]
    fn test_cumulative_interpolation() {
        let curve = DefaultCurve::from_hazard_rate(dec!(0.02), vec![dec!(1), dec!(5)]).unwrap();
        let at_three = curve.cumulative_at(dec!(3));
        let direct = reduced_form_default_probability(dec!(0.02), dec!(3)).unwrap();
        assert!(approx_eq(at_three, direct, dec!(0.00000001)));
        assert_eq!(curve.cumulative_at(Decimal::ZERO), Decimal::ZERO);
        // Flat hazard beyond the last tenor
        let at_seven = curve.cumulative_at(dec!(7));
        let direct = reduced_form_default_probability(dec!(0.02), dec!(7)).unwrap();
        assert!(approx_eq(at_seven, direct, dec!(0.00000001)));
    }

    #[test]
    fn test_decreasing_cumulative_rejected() {
        let err = DefaultCurve::from_cumulative(vec![dec!(1), dec!(2)], vec![dec!(0.1), dec!(0.05)]).unwrap_err();
        assert!(matches!(err, CreditEngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_deserialize_rejects_decreasing_cumulative() {
        let json = r#"{"tenors": ["1", "2"], "cumulative": ["0.5", "0.1"]}"#;
        let err = serde_json::from_str::<DefaultCurve>(json).unwrap_err();
        assert!(err.to_string().contains("cumulative"), "got {err}");
    }

    #[test]
    fn test_deserialize_rejects_duplicate_tenors() {
        let json = r#"{"tenors": ["1", "1"], "cumulative": ["0.01", "0.02"], "marginal": ["0.01", "0.01"]}"#;
        let err = serde_json::from_str::<DefaultCurve>(json).unwrap_err();
        assert!(err.to_string().contains("tenors"), "got {err}");
    }

    #[test]
    fn test_deserialize_derives_missing_marginals() {
        let json = r#"{"tenors": ["1", "2"], "cumulative": ["0.02", "0.05"]}"#;
        let curve: DefaultCurve = serde_json::from_str(json).unwrap();
        assert_eq!(curve.marginal, vec![dec!(0.02), dec!(0.03)]);
    }

    #[test]
    fn test_validate_rejects_inconsistent_marginals() {
        let mut curve = DefaultCurve::from_cumulative(vec![dec!(1), dec!(2)], vec![dec!(0.02), dec!(0.05)]).unwrap();
        assert!(curve.validate().is_ok());
        curve.marginal[1] = dec!(0.04);
        match curve.validate().unwrap_err() {
            CreditEngineError::InvalidInput { field, .. } => assert_eq!(field, "marginal"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
        curve.tenors[1] = dec!(1);
        match curve.validate().unwrap_err() {
            CreditEngineError::InvalidInput { field, .. } => assert_eq!(field, "tenors"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
