//! Zero-curve bootstrap from coupon bond prices.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::yield_curve::{CurveMethod, YieldCurve, YieldCurvePoint};
use crate::error::CreditEngineError;
use crate::math::{decimal_pow, newton_raphson, SolverConfig};
use crate::types::{Money, Rate, Years};
use crate::CreditEngineResult;

const FACE: Decimal = dec!(100);

/// A bond quoted for bootstrapping, per 100 face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapBond {
    pub maturity: Years,
    /// Annual coupon rate (0 for zero-coupon instruments)
    pub coupon_rate: Rate,
    /// Full (dirty) price per 100 face
    pub price: Money,
    #[serde(default = "default_frequency")]
    pub frequency: u8,
}

fn default_frequency() -> u8 {
    1
}

/// Bootstrap annually compounded zero rates, shortest maturity first.
///
/// All flows but the last are discounted on the curve built so far
/// (piecewise-linear, flat beyond its ends) and the final zero rate comes
/// from the residual: `r = (CF_last / residual)^(1/t) − 1`. The first bond
/// has no curve to lean on; if it pays intermediate coupons it is solved
/// as a flat rate by Newton-Raphson.
pub fn bootstrap_curve(bonds: &[BootstrapBond]) -> CreditEngineResult<YieldCurve> {
    validate_bonds(bonds)?;
    let mut sorted = bonds.to_vec();
    sorted.sort_by(|a, b| a.maturity.cmp(&b.maturity));
    for w in sorted.windows(2) {
        if w[0].maturity == w[1].maturity {
            return Err(CreditEngineError::invalid_input(
                "bonds",
                format!("duplicate maturity {}", w[0].maturity),
            ));
        }
    }

    let mut points: Vec<YieldCurvePoint> = Vec::with_capacity(sorted.len());
    for bond in &sorted {
        let flows = bond_flows(bond);
        let rate = if points.is_empty() {
            solve_first(bond, &flows)?
        } else {
            solve_from_residual(bond, &flows, &points)?
        };
        debug!(maturity = %bond.maturity, rate = %rate, "bootstrapped node");
        points.push(YieldCurvePoint {
            maturity: bond.maturity,
            rate,
        });
    }

    YieldCurve::new(points, CurveMethod::Bootstrap)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// (time, amount) flows stepping back from maturity in 1/frequency years.
fn bond_flows(bond: &BootstrapBond) -> Vec<(Years, Money)> {
    let freq = Decimal::from(bond.frequency);
    let coupon = FACE * bond.coupon_rate / freq;
    let mut flows = vec![(bond.maturity, coupon + FACE)];
    if !coupon.is_zero() {
        let mut k = 1u32;
        loop {
            let t = bond.maturity - Decimal::from(k) / freq;
            if t <= Decimal::ZERO {
                break;
            }
            flows.push((t, coupon));
            k += 1;
        }
    }
    flows.reverse();
    flows
}

fn solve_first(bond: &BootstrapBond, flows: &[(Years, Money)]) -> CreditEngineResult<Rate> {
    if flows.len() == 1 {
        return Ok(closed_form_rate(flows[0].1, bond.price, bond.maturity));
    }
    let pv = |r: Decimal| -> Decimal {
        flows.iter().map(|&(t, cf)| cf * decimal_pow(Decimal::ONE + r, -t)).sum()
    };
    let dpv = |r: Decimal| -> Decimal {
        flows
            .iter()
            .map(|&(t, cf)| -t * cf * decimal_pow(Decimal::ONE + r, -t - Decimal::ONE))
            .sum()
    };
    let config = SolverConfig::yield_solver();
    let result = newton_raphson("bootstrap_first_node", |r| pv(r) - bond.price, dpv, bond.coupon_rate, &config)?;
    Ok(result.root)
}

fn solve_from_residual(
    bond: &BootstrapBond,
    flows: &[(Years, Money)],
    points: &[YieldCurvePoint],
) -> CreditEngineResult<Rate> {
    let known = YieldCurve {
        points: points.to_vec(),
        method: CurveMethod::Linear,
    };
    let (last, earlier) = flows.split_last().ok_or_else(|| CreditEngineError::degenerate("bootstrap: bond has no cash flows"))?;
    let pv_earlier: Money = earlier.iter().map(|&(t, cf)| cf * known.discount_factor(t)).sum();
    let residual = bond.price - pv_earlier;
    if residual <= Decimal::ZERO {
        return Err(CreditEngineError::degenerate(format!(
            "bootstrap: non-positive residual {residual} at maturity {}",
            bond.maturity
        )));
    }
    Ok(closed_form_rate(last.1, residual, last.0))
}

fn closed_form_rate(cash_flow: Money, present_value: Money, t: Years) -> Rate {
    decimal_pow(cash_flow / present_value, Decimal::ONE / t) - Decimal::ONE
}

fn validate_bonds(bonds: &[BootstrapBond]) -> CreditEngineResult<()> {
    if bonds.is_empty() {
        return Err(CreditEngineError::InsufficientData(
            "bootstrap requires at least one bond".into(),
        ));
    }
    for (i, b) in bonds.iter().enumerate() {
        if b.maturity <= Decimal::ZERO {
            return Err(CreditEngineError::invalid_input(&format!("bonds[{i}].maturity"), "must be positive"));
        }
        if b.price <= Decimal::ZERO {
            return Err(CreditEngineError::invalid_input(&format!("bonds[{i}].price"), "must be positive"));
        }
        if b.coupon_rate < Decimal::ZERO || b.coupon_rate > Decimal::ONE {
            return Err(CreditEngineError::invalid_input(
                &format!("bonds[{i}].coupon_rate"),
                "must be between 0 and 1",
            ));
        }
        if !matches!(b.frequency, 1 | 2 | 4 | 12) {
            return Err(CreditEngineError::invalid_input(
                &format!("bonds[{i}].frequency"),
                "must be 1, 2, 4, or 12",
            ));
        }
    }
    Ok(())
}
