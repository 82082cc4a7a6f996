//! Interest-rate sensitivities of bonds.
//!
//! Analytic measures (Macaulay, modified, convexity) work on the discounted
//! cash flows at a single yield. Effective measures reprice at ±Δy and
//! are the ones to use for bonds with embedded options; for those the
//! repricing goes through the option-adjusted price.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::bonds::pricing::PricingSchedule;
use crate::bonds::{price_from_curve, price_with_embedded_options, Instrument};
use crate::curves::YieldCurve;
use crate::daycount::CouponBearing;
use crate::error::CreditEngineError;
use crate::math::decimal_pow;
use crate::types::{Money, Rate, Years};
use crate::CreditEngineResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default shift for effective measures (10bp).
pub const DEFAULT_SHIFT: Decimal = dec!(0.001);

const ONE_BP: Decimal = dec!(0.0001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyRateDuration {
    /// Curve node maturity
    pub maturity: Years,
    pub duration: Decimal,
    /// Share of the sum of key rate durations
    pub contribution_pct: Decimal,
}

// ---------------------------------------------------------------------------
// Analytic measures
// ---------------------------------------------------------------------------

/// PV-weighted average time to cash flow, in years.
pub fn macaulay_duration(bond: &Instrument, yield_rate: Rate, settlement: NaiveDate) -> CreditEngineResult<Years> {
    let schedule = schedule_at(bond, yield_rate, settlement)?;
    let freq = Decimal::from(schedule.frequency);
    let base = Decimal::ONE + yield_rate / freq;

    let mut weighted = Decimal::ZERO;
    let mut price = Decimal::ZERO;
    for (periods, cf) in schedule.period_times() {
        let pv = cf / decimal_pow(base, periods);
        weighted += pv * periods / freq;
        price += pv;
    }
    if price.is_zero() {
        return Err(CreditEngineError::degenerate("macaulay duration: zero price"));
    }
    Ok(weighted / price)
}

/// Macaulay duration divided by `1 + y/m`.
pub fn modified_duration(bond: &Instrument, yield_rate: Rate, settlement: NaiveDate) -> CreditEngineResult<Decimal> {
    let mac = macaulay_duration(bond, yield_rate, settlement)?;
    Ok(mac / (Decimal::ONE + yield_rate / Decimal::from(bond.frequency())))
}

/// `Σ CF·t(t+1) / (1+y/m)^(t+2)`, t in periods, over `P·m²`.
pub fn convexity(bond: &Instrument, yield_rate: Rate, settlement: NaiveDate) -> CreditEngineResult<Decimal> {
    let schedule = schedule_at(bond, yield_rate, settlement)?;
    let freq = Decimal::from(schedule.frequency);
    let base = Decimal::ONE + yield_rate / freq;

    let mut second_moment = Decimal::ZERO;
    for (t, cf) in schedule.period_times() {
        second_moment += cf * t * (t + Decimal::ONE) / decimal_pow(base, t + dec!(2));
    }
    let price = schedule.dirty_price(yield_rate);
    if price.is_zero() {
        return Err(CreditEngineError::degenerate("convexity: zero price"));
    }
    Ok(second_moment / (price * freq * freq))
}

/// Modified duration × dirty price × 1bp.
pub fn dv01(bond: &Instrument, yield_rate: Rate, settlement: NaiveDate) -> CreditEngineResult<Money> {
    let schedule = schedule_at(bond, yield_rate, settlement)?;
    let modified = modified_duration(bond, yield_rate, settlement)?;
    Ok(modified * schedule.dirty_price(yield_rate) * ONE_BP)
}

// ---------------------------------------------------------------------------
// Effective measures
// ---------------------------------------------------------------------------

/// `(P(y−Δ) − P(y+Δ)) / (2·P(y)·Δ)`, default Δ = 10bp.
pub fn effective_duration(
    bond: &Instrument,
    yield_rate: Rate,
    settlement: NaiveDate,
    shift: Option<Rate>,
) -> CreditEngineResult<Decimal> {
    let (down, base, up, dy) = shifted_prices(bond, yield_rate, settlement, shift)?;
    Ok((down - up) / (dec!(2) * base * dy))
}

/// `(P(y−Δ) + P(y+Δ) − 2·P(y)) / (P(y)·Δ²)`, default Δ = 10bp.
pub fn effective_convexity(
    bond: &Instrument,
    yield_rate: Rate,
    settlement: NaiveDate,
    shift: Option<Rate>,
) -> CreditEngineResult<Decimal> {
    let (down, base, up, dy) = shifted_prices(bond, yield_rate, settlement, shift)?;
    Ok((down + up - dec!(2) * base) / (base * dy * dy))
}

/// Sensitivity to a single curve node, all other nodes held fixed.
pub fn key_rate_duration(
    bond: &Instrument,
    curve: &YieldCurve,
    node: usize,
    shift: Option<Rate>,
    settlement: NaiveDate,
) -> CreditEngineResult<Decimal> {
    let dy = check_shift(shift)?;
    let base = price_from_curve(bond, curve, settlement)?;
    if base.is_zero() {
        return Err(CreditEngineError::degenerate("key rate duration: zero base price"));
    }
    let up = price_from_curve(bond, &curve.with_bumped_point(node, dy)?, settlement)?;
    let down = price_from_curve(bond, &curve.with_bumped_point(node, -dy)?, settlement)?;
    Ok((down - up) / (dec!(2) * base * dy))
}

/// Key rate durations at every curve node.
pub fn key_rate_durations(
    bond: &Instrument,
    curve: &YieldCurve,
    shift: Option<Rate>,
    settlement: NaiveDate,
) -> CreditEngineResult<Vec<KeyRateDuration>> {
    let mut results = Vec::with_capacity(curve.points.len());
    for (i, point) in curve.points.iter().enumerate() {
        results.push(KeyRateDuration {
            maturity: point.maturity,
            duration: key_rate_duration(bond, curve, i, shift, settlement)?,
            contribution_pct: Decimal::ZERO,
        });
    }
    let total: Decimal = results.iter().map(|k| k.duration).sum();
    if !total.is_zero() {
        for k in &mut results {
            k.contribution_pct = k.duration / total;
        }
    }
    Ok(results)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn schedule_at(bond: &Instrument, yield_rate: Rate, settlement: NaiveDate) -> CreditEngineResult<PricingSchedule> {
    bond.validate(settlement)?;
    let schedule = PricingSchedule::new(bond, settlement)?;
    schedule.check_yield(yield_rate)?;
    Ok(schedule)
}

fn check_shift(shift: Option<Rate>) -> CreditEngineResult<Rate> {
    let dy = shift.unwrap_or(DEFAULT_SHIFT);
    if dy <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("shift", "must be positive"));
    }
    Ok(dy)
}

/// Dirty prices at y−Δ, y, y+Δ, option-adjusted when the bond has a
/// call or put schedule.
fn shifted_prices(
    bond: &Instrument,
    yield_rate: Rate,
    settlement: NaiveDate,
    shift: Option<Rate>,
) -> CreditEngineResult<(Money, Money, Money, Rate)> {
    let dy = check_shift(shift)?;
    let schedule = schedule_at(bond, yield_rate - dy, settlement)?;
    let has_options = !bond.call_schedule().is_empty() || !bond.put_schedule().is_empty();

    let price = |y: Rate| -> CreditEngineResult<Money> {
        if has_options {
            let v = price_with_embedded_options(bond, y, settlement, None)?;
            Ok(v.adjusted_price + schedule.accrued)
        } else {
            Ok(schedule.dirty_price(y))
        }
    };

    let base = price(yield_rate)?;
    if base.is_zero() {
        return Err(CreditEngineError::degenerate("effective duration: zero base price"));
    }
    Ok((price(yield_rate - dy)?, base, price(yield_rate + dy)?, dy))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
