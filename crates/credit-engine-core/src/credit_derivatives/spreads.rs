//! Bond spread measures over a zero curve.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::bonds::pricing::curve_flows;
use crate::bonds::{dirty_price_from_yield, price_with_embedded_options, yield_from_price, Instrument};
use crate::curves::YieldCurve;
use crate::daycount::{accrued_interest, year_fraction, CouponBearing};
use crate::error::CreditEngineError;
use crate::math::{decimal_pow, newton_raphson, SolverConfig};
use crate::risk::modified_duration;
use crate::types::{BasisPoints, Money, Rate, Years};
use crate::CreditEngineResult;

/// Starting point for the Z-spread solve (100bp).
const Z_SPREAD_GUESS: Decimal = dec!(0.01);
const SPREAD_BUMP: Decimal = dec!(0.0001);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionAdjustedSpread {
    pub z_spread: Rate,
    /// Spread given up (callable) or gained (putable) through the option
    pub option_cost: Rate,
    pub oas: Rate,
}

/// Constant spread over the zero curve that reprices the bond:
/// `Σ CF · (1 + r(t) + s)^-t = dirty price`.
pub fn z_spread(
    bond: &Instrument,
    clean_price: Money,
    curve: &YieldCurve,
    settlement: NaiveDate,
) -> CreditEngineResult<Rate> {
    bond.validate(settlement)?;
    curve.validate()?;
    if clean_price <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("clean_price", "must be positive"));
    }
    let flows = curve_flows(bond, settlement)?;
    let target = clean_price + accrued_interest(bond, settlement)?;

    let pv = |s: Rate| spread_pv(&flows, curve, s);
    let f = |s: Rate| pv(s) - target;
    let df = |s: Rate| (pv(s + SPREAD_BUMP) - pv(s)) / SPREAD_BUMP;
    newton_raphson("z_spread", f, df, Z_SPREAD_GUESS, &SolverConfig::z_spread()).map(|r| r.root)
}

/// Z-spread less the option cost `option value / (dirty price × modified
/// duration)`. Option value comes from the embedded option heuristic at
/// the bond's own yield.
pub fn option_adjusted_spread(
    bond: &Instrument,
    clean_price: Money,
    curve: &YieldCurve,
    settlement: NaiveDate,
    option_factor: Option<Decimal>,
) -> CreditEngineResult<OptionAdjustedSpread> {
    let z = z_spread(bond, clean_price, curve, settlement)?;
    let sign = match bond {
        Instrument::Callable(_) => Decimal::ONE,
        Instrument::Putable(_) => -Decimal::ONE,
        _ => {
            return Ok(OptionAdjustedSpread {
                z_spread: z,
                option_cost: Decimal::ZERO,
                oas: z,
            })
        }
    };

    let ytm = yield_from_price(bond, clean_price, settlement, None)?;
    let valuation = price_with_embedded_options(bond, ytm, settlement, option_factor)?;
    let dirty = dirty_price_from_yield(bond, ytm, settlement)?;
    let duration = modified_duration(bond, ytm, settlement)?;
    let risk = dirty * duration;
    if risk.is_zero() {
        return Err(CreditEngineError::degenerate("option adjusted spread: zero price sensitivity"));
    }
    let option_cost = sign * valuation.option_value / risk;
    Ok(OptionAdjustedSpread {
        z_spread: z,
        option_cost,
        oas: z - option_cost,
    })
}

/// Yield less the interpolated zero rate at the bond's maturity.
pub fn i_spread(bond: &Instrument, yield_rate: Rate, curve: &YieldCurve, settlement: NaiveDate) -> CreditEngineResult<Rate> {
    curve.validate()?;
    let years: Years = year_fraction(settlement, bond.maturity(), bond.day_count())?;
    Ok(yield_rate - curve.rate_at(years))
}

/// Price fall for a +1bp move in the Z-spread.
pub fn cs01(bond: &Instrument, clean_price: Money, curve: &YieldCurve, settlement: NaiveDate) -> CreditEngineResult<Money> {
    let z = z_spread(bond, clean_price, curve, settlement)?;
    let flows = curve_flows(bond, settlement)?;
    Ok(spread_pv(&flows, curve, z) - spread_pv(&flows, curve, z + SPREAD_BUMP))
}

/// CDS spread minus the bond's Z-spread. Negative basis means protection
/// is cheap relative to the bond.
pub fn bond_cds_basis(cds_spread: BasisPoints, z_spread: Rate) -> BasisPoints {
    BasisPoints::new(cds_spread.value() - BasisPoints::from_rate(z_spread).value())
}

fn spread_pv(flows: &[(Years, Money)], curve: &YieldCurve, spread: Rate) -> Money {
    flows
        .iter()
        .map(|&(t, cf)| cf * decimal_pow(Decimal::ONE + curve.rate_at(t) + spread, -t))
        .sum()
}
