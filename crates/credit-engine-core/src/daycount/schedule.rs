use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::conventions::{day_count, is_leap_year, DayCountConvention};
use crate::error::CreditEngineError;
use crate::types::{Money, Rate};
use crate::CreditEngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowKind {
    Coupon,
    Principal,
    Prepayment,
}

/// A single dated cash flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: Money,
    pub kind: CashFlowKind,
    /// 1-based coupon period counted from settlement.
    pub period: u32,
}

/// Anything with a regular coupon schedule.
pub trait CouponBearing {
    fn face_value(&self) -> Money;
    /// Annual coupon rate as a decimal. Floaters report index + margin.
    fn annual_coupon_rate(&self) -> Rate;
    fn maturity(&self) -> NaiveDate;
    /// Payments (or compounding periods) per year.
    fn frequency(&self) -> u8;
    fn day_count(&self) -> DayCountConvention;

    fn coupon_per_period(&self) -> Money {
        self.face_value() * self.annual_coupon_rate() / Decimal::from(self.frequency())
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Future cash flows after `settlement`, in date order.
///
/// Coupon dates are found by stepping back from maturity in
/// `12 / frequency`-month steps. Maturity carries both the final coupon and
/// the principal as separate flows. Zero-amount coupons are omitted.
pub fn generate_cash_flows<B: CouponBearing + ?Sized>(
    bond: &B,
    settlement: NaiveDate,
) -> CreditEngineResult<Vec<CashFlow>> {
    check_schedule(bond, settlement)?;

    let dates = coupon_dates(bond.maturity(), settlement, bond.frequency());
    let coupon = bond.coupon_per_period();
    let mut flows = Vec::with_capacity(dates.len() + 1);

    for (i, &date) in dates.iter().enumerate() {
        let period = i as u32 + 1;
        if !coupon.is_zero() {
            flows.push(CashFlow {
                date,
                amount: coupon,
                kind: CashFlowKind::Coupon,
                period,
            });
        }
        if i + 1 == dates.len() {
            flows.push(CashFlow {
                date,
                amount: bond.face_value(),
                kind: CashFlowKind::Principal,
                period,
            });
        }
    }
    Ok(flows)
}

/// Accrued interest at `settlement` under the bond's own convention.
pub fn accrued_interest<B: CouponBearing + ?Sized>(
    bond: &B,
    settlement: NaiveDate,
) -> CreditEngineResult<Money> {
    accrued_interest_with(bond, settlement, bond.day_count())
}

/// Accrued interest at `settlement` under an explicit convention.
pub fn accrued_interest_with<B: CouponBearing + ?Sized>(
    bond: &B,
    settlement: NaiveDate,
    convention: DayCountConvention,
) -> CreditEngineResult<Money> {
    check_schedule(bond, settlement)?;
    let fraction = accrual_fraction(bond.maturity(), settlement, bond.frequency(), convention);
    Ok(bond.coupon_per_period() * fraction)
}

/// Elapsed fraction of the current coupon period, in [0, 1].
///
/// 30/360 and Act/Act measure against the actual period length; Act/360
/// and Act/365 measure against `basis / frequency` days.
pub fn accrual_fraction(
    maturity: NaiveDate,
    settlement: NaiveDate,
    frequency: u8,
    convention: DayCountConvention,
) -> Decimal {
    let (prev, next) = coupon_period(maturity, settlement, frequency);
    let elapsed = Decimal::from(day_count(prev, settlement, convention));

    let period = match convention {
        DayCountConvention::Thirty360 | DayCountConvention::ActualActual => {
            Decimal::from(day_count(prev, next, convention))
        }
        DayCountConvention::Actual360 | DayCountConvention::Actual365 => {
            convention.basis() / Decimal::from(frequency)
        }
    };
    if period.is_zero() {
        return Decimal::ZERO;
    }
    (elapsed / period).max(Decimal::ZERO).min(Decimal::ONE)
}

/// The coupon period containing `settlement`: (last coupon on or before,
/// next coupon after).
pub fn coupon_period(maturity: NaiveDate, settlement: NaiveDate, frequency: u8) -> (NaiveDate, NaiveDate) {
    let step = months_per_period(frequency);
    let mut next = maturity;
    let mut k = 1;
    loop {
        let prev = add_months(maturity, -step * k);
        if prev <= settlement {
            return (prev, next);
        }
        next = prev;
        k += 1;
    }
}

/// Shift a date by whole months, clamping the day to the target month.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month() as i32 - 1 + months;
    let year = total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u32;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn months_per_period(frequency: u8) -> i32 {
    12 / frequency.max(1) as i32
}

/// Coupon dates strictly after settlement, ascending.
fn coupon_dates(maturity: NaiveDate, settlement: NaiveDate, frequency: u8) -> Vec<NaiveDate> {
    let step = months_per_period(frequency);
    let mut dates = Vec::new();
    let mut k = 0;
    loop {
        let date = add_months(maturity, -step * k);
        if date <= settlement {
            break;
        }
        dates.push(date);
        k += 1;
    }
    dates.reverse();
    dates
}

fn check_schedule<B: CouponBearing + ?Sized>(bond: &B, settlement: NaiveDate) -> CreditEngineResult<()> {
    if bond.maturity() <= settlement {
        return Err(CreditEngineError::InvalidDateRange {
            start: settlement.to_string(),
            end: bond.maturity().to_string(),
        });
    }
    if !matches!(bond.frequency(), 1 | 2 | 4 | 12) {
        return Err(CreditEngineError::invalid_instrument(
            "frequency",
            "must be 1, 2, 4, or 12",
        ));
    }
    Ok(())
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 30,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
