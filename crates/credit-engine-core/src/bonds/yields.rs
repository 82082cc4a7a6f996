//! Yield measures other than yield to maturity.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::instrument::{ExerciseDate, Instrument};
use super::pricing::{solve_yield, PricingSchedule};
use crate::daycount::{year_fraction, CouponBearing};
use crate::error::CreditEngineError;
use crate::types::{Money, Rate};
use crate::CreditEngineResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workout {
    Maturity,
    Call,
    Put,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldToWorst {
    pub yield_rate: Rate,
    pub workout: Workout,
    pub workout_date: NaiveDate,
    pub workout_price: Money,
}

/// Yield to a call date, treating it as a synthetic maturity redeemed at
/// the call price.
pub fn yield_to_call(
    bond: &Instrument,
    clean_price: Money,
    settlement: NaiveDate,
    call: &ExerciseDate,
) -> CreditEngineResult<Rate> {
    yield_to_exercise("yield_to_call", bond, clean_price, settlement, call)
}

/// Yield to a put date, treating it as a synthetic maturity redeemed at
/// the put price.
pub fn yield_to_put(
    bond: &Instrument,
    clean_price: Money,
    settlement: NaiveDate,
    put: &ExerciseDate,
) -> CreditEngineResult<Rate> {
    yield_to_exercise("yield_to_put", bond, clean_price, settlement, put)
}

/// Minimum of YTM and the yield to every future call and put date.
///
/// Ties go to the earliest workout.
pub fn yield_to_worst(bond: &Instrument, clean_price: Money, settlement: NaiveDate) -> CreditEngineResult<YieldToWorst> {
    let ytm = super::pricing::yield_from_price(bond, clean_price, settlement, None)?;
    let mut worst = YieldToWorst {
        yield_rate: ytm,
        workout: Workout::Maturity,
        workout_date: bond.maturity(),
        workout_price: bond.face_value(),
    };

    let candidates = bond
        .call_schedule()
        .iter()
        .map(|e| (Workout::Call, e))
        .chain(bond.put_schedule().iter().map(|e| (Workout::Put, e)))
        .filter(|(_, e)| e.date > settlement);

    for (workout, exercise) in candidates {
        let y = match workout {
            Workout::Put => yield_to_put(bond, clean_price, settlement, exercise)?,
            _ => yield_to_call(bond, clean_price, settlement, exercise)?,
        };
        if y < worst.yield_rate || (y == worst.yield_rate && exercise.date < worst.workout_date) {
            worst = YieldToWorst {
                yield_rate: y,
                workout,
                workout_date: exercise.date,
                workout_price: exercise.price,
            };
        }
    }
    Ok(worst)
}

/// Annual coupon divided by clean price.
pub fn current_yield(bond: &Instrument, clean_price: Money) -> CreditEngineResult<Rate> {
    check_price(clean_price)?;
    Ok(bond.face_value() * bond.annual_coupon_rate() / clean_price)
}

/// `(annual coupon + (face − price) / years) / price`, no compounding.
pub fn simple_yield(bond: &Instrument, clean_price: Money, settlement: NaiveDate) -> CreditEngineResult<Rate> {
    check_price(clean_price)?;
    let years = year_fraction(settlement, bond.maturity(), bond.day_count())?;
    let annual_coupon = bond.face_value() * bond.annual_coupon_rate();
    Ok((annual_coupon + (bond.face_value() - clean_price) / years) / clean_price)
}

/// Simple discount margin of a floater:
/// `(margin × face + (face − price) / years) / price`.
pub fn discount_margin(bond: &Instrument, clean_price: Money, settlement: NaiveDate) -> CreditEngineResult<Rate> {
    let Instrument::FloatingRate(frn) = bond else {
        return Err(CreditEngineError::invalid_input(
            "instrument",
            "discount margin applies to floating rate notes only",
        ));
    };
    check_price(clean_price)?;
    let years = year_fraction(settlement, frn.maturity_date, frn.day_count)?;
    Ok((frn.quoted_margin * frn.face_value + (frn.face_value - clean_price) / years) / clean_price)
}

fn yield_to_exercise(
    function: &str,
    bond: &Instrument,
    clean_price: Money,
    settlement: NaiveDate,
    exercise: &ExerciseDate,
) -> CreditEngineResult<Rate> {
    bond.validate(settlement)?;
    if exercise.date <= settlement {
        return Err(CreditEngineError::InvalidDateRange {
            start: settlement.to_string(),
            end: exercise.date.to_string(),
        });
    }
    let schedule = PricingSchedule::to_redemption(bond, settlement, exercise.date, exercise.price)?;
    solve_yield(function, &schedule, clean_price, bond.annual_coupon_rate())
}

fn check_price(clean_price: Money) -> CreditEngineResult<()> {
    if clean_price <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("clean_price", "must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use crate::bonds::instrument::{BondTerms, FloatingRateTerms};
    use crate::bonds::pricing::price_from_yield;
    use crate::daycount::DayCountConvention;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    fn terms(coupon: Rate) -> BondTerms {
        BondTerms {
            face_value: dec!(1000),
            coupon_rate: coupon,
            maturity_date: d(2035, 1, 15),
            frequency: 2,
            day_count: DayCountConvention::Thirty360,
        }
    }

    #[test]
    fn test_ytc_recovers_yield_used_to_price_to_call() {
        let settle = d(2025, 1, 15);
        let call = ExerciseDate { date: d(2028, 1, 15), price: dec!(1020) };
        let bond = Instrument::callable(terms(dec!(0.06)), vec![call.clone()], settle).unwrap();

        // Price a 3-year bullet redeeming at 1020 at 5%
        let to_call = PricingSchedule::to_redemption(&bond, settle, call.date, call.price).unwrap();
        let clean = to_call.dirty_price(dec!(0.05)) - to_call.accrued;
        let ytc = yield_to_call(&bond, clean, settle, &call).unwrap();
        assert!(approx_eq(ytc, dec!(0.05), dec!(0.000001)), "got {ytc}");
    }

    #[test]
    fn test_ytw_picks_call_for_premium_callable() {
        let settle = d(2025, 1, 15);
        let bond = Instrument::callable(
            terms(dec!(0.07)),
            vec![ExerciseDate { date: d(2027, 1, 15), price: dec!(1000) }],
            settle,
        )
        .unwrap();
        let clean = price_from_yield(&bond, dec!(0.05), settle).unwrap();
        let ytw = yield_to_worst(&bond, clean, settle).unwrap();
        assert_eq!(ytw.workout, Workout::Call);
        assert!(ytw.yield_rate < dec!(0.05));
    }

    #[test]
    fn test_ytw_is_ytm_for_bullet() {
        let settle = d(2025, 1, 15);
        let bond = Instrument::fixed_rate(terms(dec!(0.05)), settle).unwrap();
        let ytw = yield_to_worst(&bond, dec!(980), settle).unwrap();
        assert_eq!(ytw.workout, Workout::Maturity);
        assert_eq!(ytw.workout_date, d(2035, 1, 15));
    }

    #[test]
    fn test_past_call_date_rejected() {
        let settle = d(2025, 1, 15);
        let call = ExerciseDate { date: d(2026, 1, 15), price: dec!(1000) };
        let bond = Instrument::callable(terms(dec!(0.05)), vec![call.clone()], d(2024, 1, 1)).unwrap();
        let err = yield_to_call(&bond, dec!(1000), d(2026, 6, 1), &call).unwrap_err();
        assert!(matches!(err, CreditEngineError::InvalidDateRange { .. }));
        assert!(yield_to_call(&bond, dec!(1000), settle, &call).is_ok());
    }

    #[test]
    fn test_current_and_simple_yield() {
        let settle = d(2025, 1, 15);
        let bond = Instrument::fixed_rate(terms(dec!(0.05)), settle).unwrap();
        assert_eq!(current_yield(&bond, dec!(1000)).unwrap(), dec!(0.05));
        // (50 + (1000 - 950)/10) / 950
        let sy = simple_yield(&bond, dec!(950), settle).unwrap();
        assert_eq!(sy, dec!(55) / dec!(950));
    }

    #[test]
    fn test_discount_margin_at_par_equals_quoted_margin() {
        let settle = d(2025, 3, 1);
        let frn = Instrument::floating_rate(
            FloatingRateTerms {
                face_value: dec!(100),
                index_rate: dec!(0.04),
                quoted_margin: dec!(0.015),
                maturity_date: d(2028, 3, 1),
                frequency: 4,
                day_count: DayCountConvention::Actual360,
            },
            settle,
        )
        .unwrap();
        assert_eq!(discount_margin(&frn, dec!(100), settle).unwrap(), dec!(0.015));
        // Below par the margin widens
        assert!(discount_margin(&frn, dec!(98), settle).unwrap() > dec!(0.015));

        let bullet = Instrument::fixed_rate(terms(dec!(0.05)), settle).unwrap();
        assert!(discount_margin(&bullet, dec!(100), settle).is_err());
    }

    #[test]
    fn test_off_cycle_call_keeps_coupon_dates() {
        let settle = d(2025, 3, 1);
        let call = ExerciseDate { date: d(2028, 4, 15), price: dec!(1010) };
        let bond = Instrument::callable(terms(dec!(0.06)), vec![call.clone()], settle).unwrap();

        let to_call = PricingSchedule::to_redemption(&bond, settle, call.date, call.price).unwrap();
        assert_eq!(to_call.accrued, crate::daycount::accrued_interest(&bond, settle).unwrap());
        assert!(to_call.flows.iter().all(|f| f.date.day() == 15 && matches!(f.date.month(), 1 | 7)));
        assert_eq!(to_call.flows.last().map(|f| f.date), Some(d(2028, 1, 15)));
        assert_eq!(to_call.flows.len(), 6);

        // Redemption sits half a period (90 of 180 days) after the Jan-2028 coupon
        let (periods, amount) = to_call.redemption.unwrap();
        assert_eq!(amount, dec!(1010));
        assert!(approx_eq(periods, dec!(5) + to_call.first_period + dec!(0.5), dec!(0.0000000001)));

        let clean = to_call.dirty_price(dec!(0.05)) - to_call.accrued;
        let ytc = yield_to_call(&bond, clean, settle, &call).unwrap();
        assert!(approx_eq(ytc, dec!(0.05), dec!(0.000001)), "got {ytc}");
    }
}
