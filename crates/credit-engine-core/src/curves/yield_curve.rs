//! Zero-rate curves.
//!
//! Rates are annually compounded: `DF(t) = (1 + r(t))^-t`. A curve is an
//! immutable snapshot; bumping or shifting returns a new curve.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CreditEngineError;
use crate::math::decimal_pow;
use crate::types::{Rate, Years};
use crate::CreditEngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldCurvePoint {
    /// Time to maturity in years
    pub maturity: Years,
    pub rate: Rate,
}

/// How a curve was built; also selects its interpolator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveMethod {
    Bootstrap,
    NelsonSiegel,
    CubicSpline,
    #[default]
    Linear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldCurve {
    pub points: Vec<YieldCurvePoint>,
    #[serde(default)]
    pub method: CurveMethod,
}

// ---------------------------------------------------------------------------
// Curve
// ---------------------------------------------------------------------------

impl YieldCurve {
    pub fn new(points: Vec<YieldCurvePoint>, method: CurveMethod) -> CreditEngineResult<Self> {
        let curve = YieldCurve { points, method };
        curve.validate()?;
        Ok(curve)
    }

    /// At least one point, positive maturities, strictly increasing.
    pub fn validate(&self) -> CreditEngineResult<()> {
        check_points(&self.points)
    }

    /// Zero rate at `maturity`. Cubic-spline curves use Hermite
    /// interpolation, all others piecewise-linear.
    pub fn rate_at(&self, maturity: Years) -> Rate {
        match self.method {
            CurveMethod::CubicSpline => hermite(&self.points, maturity),
            _ => linear(&self.points, maturity),
        }
    }

    pub fn discount_factor(&self, maturity: Years) -> Decimal {
        if maturity <= Decimal::ZERO {
            return Decimal::ONE;
        }
        decimal_pow(Decimal::ONE + self.rate_at(maturity), -maturity)
    }

    /// Copy with a single node moved by `shift`.
    pub fn with_bumped_point(&self, index: usize, shift: Rate) -> CreditEngineResult<YieldCurve> {
        if index >= self.points.len() {
            return Err(CreditEngineError::invalid_input(
                "key_rate_index",
                format!("curve has {} points", self.points.len()),
            ));
        }
        let mut bumped = self.clone();
        bumped.points[index].rate += shift;
        Ok(bumped)
    }

    pub fn with_parallel_shift(&self, shift: Rate) -> YieldCurve {
        let mut shifted = self.clone();
        for p in &mut shifted.points {
            p.rate += shift;
        }
        shifted
    }

    pub fn maturities(&self) -> Vec<Years> {
        self.points.iter().map(|p| p.maturity).collect()
    }
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// Piecewise-linear interpolation, flat beyond the first and last points.
///
/// Returns the node rate exactly when `maturity` is a node.
pub fn linear_interpolation(points: &[YieldCurvePoint], maturity: Years) -> CreditEngineResult<Rate> {
    check_points(points)?;
    Ok(linear(points, maturity))
}

/// Cubic Hermite interpolation with finite-difference node slopes, flat
/// beyond the first and last points.
pub fn cubic_spline_interpolation(points: &[YieldCurvePoint], maturity: Years) -> CreditEngineResult<Rate> {
    check_points(points)?;
    Ok(hermite(points, maturity))
}

fn linear(points: &[YieldCurvePoint], t: Years) -> Rate {
    let Some((lo, hi)) = bracket(points, t) else {
        return flat_end(points, t);
    };
    let (a, b) = (points[lo], points[hi]);
    let w = (t - a.maturity) / (b.maturity - a.maturity);
    a.rate + (b.rate - a.rate) * w
}

fn hermite(points: &[YieldCurvePoint], t: Years) -> Rate {
    let Some((lo, hi)) = bracket(points, t) else {
        return flat_end(points, t);
    };
    let (a, b) = (points[lo], points[hi]);
    let h = b.maturity - a.maturity;
    let s = (t - a.maturity) / h;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = dec!(2) * s3 - dec!(3) * s2 + Decimal::ONE;
    let h10 = s3 - dec!(2) * s2 + s;
    let h01 = dec!(-2) * s3 + dec!(3) * s2;
    let h11 = s3 - s2;

    h00 * a.rate + h10 * h * slope(points, lo) + h01 * b.rate + h11 * h * slope(points, hi)
}

/// Central difference inside, one-sided at the ends.
fn slope(points: &[YieldCurvePoint], i: usize) -> Decimal {
    let n = points.len();
    if n < 2 {
        return Decimal::ZERO;
    }
    let (l, r) = if i == 0 {
        (0, 1)
    } else if i == n - 1 {
        (n - 2, n - 1)
    } else {
        (i - 1, i + 1)
    };
    (points[r].rate - points[l].rate) / (points[r].maturity - points[l].maturity)
}

/// Indices of the segment strictly containing `t`, or `None` when `t` is a
/// node or lies outside the curve.
fn bracket(points: &[YieldCurvePoint], t: Years) -> Option<(usize, usize)> {
    let hi = points.iter().position(|p| p.maturity >= t)?;
    if hi == 0 || points[hi].maturity == t {
        return None;
    }
    Some((hi - 1, hi))
}

/// Node rate, or the nearest end rate outside the curve.
fn flat_end(points: &[YieldCurvePoint], t: Years) -> Rate {
    if let Some(p) = points.iter().find(|p| p.maturity >= t) {
        return p.rate;
    }
    points.last().map(|p| p.rate).unwrap_or(Decimal::ZERO)
}

fn check_points(points: &[YieldCurvePoint]) -> CreditEngineResult<()> {
    if points.is_empty() {
        return Err(CreditEngineError::InsufficientData("yield curve has no points".into()));
    }
    if points[0].maturity <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("points[0].maturity", "must be positive"));
    }
    for (i, w) in points.windows(2).enumerate() {
        if w[1].maturity <= w[0].maturity {
            return Err(CreditEngineError::invalid_input(
                &format!("points[{}].maturity", i + 1),
                "maturities must be strictly increasing",
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(maturity: Decimal, rate: Decimal) -> YieldCurvePoint {
        YieldCurvePoint { maturity, rate }
    }

    fn curve_points() -> Vec<YieldCurvePoint> {
        vec![
            pt(dec!(0.5), dec!(0.030)),
            pt(dec!(1), dec!(0.032)),
            pt(dec!(2), dec!(0.035)),
            pt(dec!(5), dec!(0.040)),
            pt(dec!(10), dec!(0.043)),
        ]
    }

    #[test]
    fn test_linear_exact_at_nodes() {
        let points = curve_points();
        for p in &points {
            assert_eq!(linear_interpolation(&points, p.maturity).unwrap(), p.rate);
            assert_eq!(cubic_spline_interpolation(&points, p.maturity).unwrap(), p.rate);
        }
    }

    #[test]
    fn test_linear_midpoint_and_flat_extrapolation() {
        let points = curve_points();
        assert_eq!(linear_interpolation(&points, dec!(3.5)).unwrap(), dec!(0.0375));
        assert_eq!(linear_interpolation(&points, dec!(0.1)).unwrap(), dec!(0.030));
        assert_eq!(linear_interpolation(&points, dec!(30)).unwrap(), dec!(0.043));
        assert_eq!(cubic_spline_interpolation(&points, dec!(30)).unwrap(), dec!(0.043));
    }

    #[test]
    fn test_cubic_between_neighbours_on_monotone_curve() {
        let points = curve_points();
        let r = cubic_spline_interpolation(&points, dec!(3)).unwrap();
        assert!(r > dec!(0.035) && r < dec!(0.040), "got {r}");
    }

    #[test]
    fn test_cubic_reproduces_straight_line() {
        let points = vec![pt(dec!(1), dec!(0.01)), pt(dec!(2), dec!(0.02)), pt(dec!(3), dec!(0.03))];
        let r = cubic_spline_interpolation(&points, dec!(2.5)).unwrap();
        assert_eq!(r, dec!(0.025));
    }

    #[test]
    fn test_rejects_unsorted_points() {
        let points = vec![pt(dec!(2), dec!(0.03)), pt(dec!(1), dec!(0.02))];
        match YieldCurve::new(points, CurveMethod::Linear).unwrap_err() {
            CreditEngineError::InvalidInput { field, .. } => assert_eq!(field, "points[1].maturity"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
        assert!(matches!(linear_interpolation(&[], dec!(1)), Err(CreditEngineError::InsufficientData(_))));
    }

    #[test]
    fn test_discount_factor_and_bumps() {
        let curve = YieldCurve::new(curve_points(), CurveMethod::Linear).unwrap();
        assert_eq!(curve.discount_factor(dec!(2)), Decimal::ONE / (dec!(1.035) * dec!(1.035)));
        assert_eq!(curve.discount_factor(Decimal::ZERO), Decimal::ONE);

        let bumped = curve.with_bumped_point(2, dec!(0.001)).unwrap();
        assert_eq!(bumped.points[2].rate, dec!(0.036));
        assert_eq!(bumped.points[1].rate, dec!(0.032));
        assert_eq!(curve.points[2].rate, dec!(0.035));
        assert!(curve.with_bumped_point(9, dec!(0.001)).is_err());

        let shifted = curve.with_parallel_shift(dec!(-0.01));
        assert_eq!(shifted.rate_at(dec!(10)), dec!(0.033));
    }
}
