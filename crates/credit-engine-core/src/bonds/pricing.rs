//! Price / yield conversion for bullet bonds.
//!
//! Cash flows are discounted at `y / f` per coupon period, with a
//! fractional first period `w = 1 − accrual fraction`, so the flow paid in
//! period `k` is discounted over `k − 1 + w` periods. Integer powers are
//! exact; only the fractional stub goes through `exp(w · ln(1 + y/f))`.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::instrument::Instrument;
use crate::curves::YieldCurve;
use crate::daycount::{
    accrual_fraction, accrued_interest, coupon_period, generate_cash_flows, year_fraction, CashFlow,
    CashFlowKind, CouponBearing,
};
use crate::error::CreditEngineError;
use crate::math::{decimal_pow, decimal_sqrt, newton_raphson, SolverConfig};
use crate::types::{Money, Rate, Years};
use crate::CreditEngineResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Yield bump for the numerical price derivative (1bp).
const YIELD_BUMP: Decimal = dec!(0.0001);

/// Default scaling for the embedded option heuristic.
pub const DEFAULT_OPTION_FACTOR: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Callable / putable price from the straight price and a heuristic
/// option value. Not a lattice valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedOptionValuation {
    pub straight_price: Money,
    pub option_value: Money,
    /// Straight price minus (callable) or plus (putable) the option value
    pub adjusted_price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_date: Option<NaiveDate>,
}

/// Future flows of one bond, ready for repeated discounting.
#[derive(Debug, Clone)]
pub(crate) struct PricingSchedule {
    pub flows: Vec<CashFlow>,
    pub frequency: u8,
    /// Fraction of the current period still to run
    pub first_period: Decimal,
    pub accrued: Money,
    /// Redemption off the coupon cycle: (periods from settlement, amount)
    pub redemption: Option<(Decimal, Money)>,
}

impl PricingSchedule {
    pub fn new<B: CouponBearing + ?Sized>(bond: &B, settlement: NaiveDate) -> CreditEngineResult<Self> {
        let flows = generate_cash_flows(bond, settlement)?;
        let fraction = accrual_fraction(bond.maturity(), settlement, bond.frequency(), bond.day_count());
        Ok(PricingSchedule {
            flows,
            frequency: bond.frequency(),
            first_period: Decimal::ONE - fraction,
            accrued: accrued_interest(bond, settlement)?,
            redemption: None,
        })
    }

    /// The bond's own schedule cut off at an exercise date and redeemed
    /// there at `price`. Coupons keep their real dates and the accrued
    /// interest is the bond's; an off-cycle exercise date puts the
    /// redemption a fraction of a period after the last coupon before it.
    pub fn to_redemption(
        bond: &Instrument,
        settlement: NaiveDate,
        date: NaiveDate,
        price: Money,
    ) -> CreditEngineResult<Self> {
        let mut schedule = PricingSchedule::new(bond, settlement)?;
        schedule
            .flows
            .retain(|f| f.kind == CashFlowKind::Coupon && f.date <= date);

        let coupons = coupon_dates_between(bond.maturity(), settlement, date, bond.frequency());
        let stub = accrual_fraction(bond.maturity(), date, bond.frequency(), bond.day_count());
        let periods = Decimal::from(coupons) - Decimal::ONE + schedule.first_period + stub;
        schedule.redemption = Some((periods, price));
        Ok(schedule)
    }

    /// Periods from settlement to each flow, paired with the flow amount.
    pub fn period_times(&self) -> impl Iterator<Item = (Decimal, Money)> + '_ {
        self.flows
            .iter()
            .map(move |f| (Decimal::from(f.period - 1) + self.first_period, f.amount))
            .chain(self.redemption)
    }

    /// Dirty price at `yield_rate`. Caller keeps `1 + y/f` positive.
    pub fn dirty_price(&self, yield_rate: Rate) -> Money {
        let base = Decimal::ONE + yield_rate / Decimal::from(self.frequency);
        if base <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let stub = decimal_pow(base, self.first_period);
        let mut pv = Decimal::ZERO;
        let mut whole_periods = 0u32;
        let mut growth = Decimal::ONE;
        for flow in &self.flows {
            while whole_periods + 1 < flow.period {
                growth *= base;
                whole_periods += 1;
            }
            pv += flow.amount / (stub * growth);
        }
        if let Some((periods, amount)) = self.redemption {
            pv += amount * decimal_pow(base, -periods);
        }
        pv
    }

    pub fn check_yield(&self, yield_rate: Rate) -> CreditEngineResult<()> {
        if Decimal::ONE + yield_rate / Decimal::from(self.frequency) <= Decimal::ZERO {
            return Err(CreditEngineError::invalid_input(
                "yield",
                "periodic yield must be greater than -100%",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Clean price from yield. Embedded options are ignored; see
/// [`price_with_embedded_options`].
pub fn price_from_yield(bond: &Instrument, yield_rate: Rate, settlement: NaiveDate) -> CreditEngineResult<Money> {
    bond.validate(settlement)?;
    let schedule = PricingSchedule::new(bond, settlement)?;
    schedule.check_yield(yield_rate)?;
    Ok(schedule.dirty_price(yield_rate) - schedule.accrued)
}

/// Dirty (full) price from yield.
pub fn dirty_price_from_yield(
    bond: &Instrument,
    yield_rate: Rate,
    settlement: NaiveDate,
) -> CreditEngineResult<Money> {
    bond.validate(settlement)?;
    let schedule = PricingSchedule::new(bond, settlement)?;
    schedule.check_yield(yield_rate)?;
    Ok(schedule.dirty_price(yield_rate))
}

pub fn dirty_price(clean_price: Money, accrued: Money) -> Money {
    clean_price + accrued
}

/// Yield implied by a clean price.
///
/// Newton-Raphson on the price function with a 1bp forward-difference
/// derivative, starting from the coupon rate unless a guess is given. The
/// root must lie in [-10%, 100%].
pub fn yield_from_price(
    bond: &Instrument,
    clean_price: Money,
    settlement: NaiveDate,
    initial_guess: Option<Rate>,
) -> CreditEngineResult<Rate> {
    bond.validate(settlement)?;
    let schedule = PricingSchedule::new(bond, settlement)?;
    let guess = initial_guess.unwrap_or_else(|| bond.annual_coupon_rate());
    solve_yield("yield_from_price", &schedule, clean_price, guess)
}

/// Dirty price from curve discounting, `DF(t) = (1 + r(t))^-t`.
pub fn price_from_curve(bond: &Instrument, curve: &YieldCurve, settlement: NaiveDate) -> CreditEngineResult<Money> {
    bond.validate(settlement)?;
    curve.validate()?;
    let flows = curve_flows(bond, settlement)?;
    Ok(flows.iter().map(|&(t, cf)| cf * curve.discount_factor(t)).sum())
}

/// Straight price adjusted by `price × factor × √(years to first exercise)`.
///
/// Callables subtract the estimate and putables add it. Plain bonds, and
/// bonds whose exercise dates have all passed, carry no option value.
pub fn price_with_embedded_options(
    bond: &Instrument,
    yield_rate: Rate,
    settlement: NaiveDate,
    factor: Option<Decimal>,
) -> CreditEngineResult<EmbeddedOptionValuation> {
    let factor = factor.unwrap_or(DEFAULT_OPTION_FACTOR);
    if factor < Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("option_factor", "must be non-negative"));
    }
    let straight = price_from_yield(bond, yield_rate, settlement)?;

    let (schedule, sign) = match bond {
        Instrument::Callable(c) => (c.call_schedule.as_slice(), -Decimal::ONE),
        Instrument::Putable(p) => (p.put_schedule.as_slice(), Decimal::ONE),
        _ => (&[][..], Decimal::ZERO),
    };

    let exercise = schedule.iter().find(|e| e.date > settlement);
    let option_value = match exercise {
        Some(e) => {
            let t = year_fraction(settlement, e.date, bond.day_count())?;
            straight * factor * decimal_sqrt(t)
        }
        None => Decimal::ZERO,
    };

    Ok(EmbeddedOptionValuation {
        straight_price: straight,
        option_value,
        adjusted_price: straight + sign * option_value,
        exercise_date: exercise.map(|e| e.date),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn solve_yield(
    function: &str,
    schedule: &PricingSchedule,
    clean_price: Money,
    guess: Rate,
) -> CreditEngineResult<Rate> {
    if clean_price <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("clean_price", "must be positive"));
    }
    let config = SolverConfig::yield_solver();
    if guess < dec!(-0.10) || guess > Decimal::ONE {
        return Err(CreditEngineError::invalid_input(
            "initial_guess",
            "must lie within [-10%, 100%]",
        ));
    }

    let target = clean_price + schedule.accrued;
    let f = |y: Decimal| schedule.dirty_price(y) - target;
    let df = |y: Decimal| (schedule.dirty_price(y + YIELD_BUMP) - schedule.dirty_price(y)) / YIELD_BUMP;
    newton_raphson(function, f, df, guess, &config).map(|r| r.root)
}

/// (year fraction, amount) for every future flow, timed with the bond's
/// own day count.
pub(crate) fn curve_flows(bond: &Instrument, settlement: NaiveDate) -> CreditEngineResult<Vec<(Years, Money)>> {
    let convention = bond.day_count();
    generate_cash_flows(bond, settlement)?
        .into_iter()
        .map(|f| Ok((year_fraction(settlement, f.date, convention)?, f.amount)))
        .collect()
}

/// Coupon dates of the bond's cycle falling in `(from, to]`.
fn coupon_dates_between(maturity: NaiveDate, from: NaiveDate, to: NaiveDate, frequency: u8) -> u32 {
    let (start, _) = coupon_period(maturity, from, frequency);
    let (end, _) = coupon_period(maturity, to, frequency);
    let months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    (months / (12 / frequency.max(1) as i32)).max(0) as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonds::instrument::{BondTerms, ExerciseDate, ZeroCouponTerms};
    use crate::curves::{CurveMethod, YieldCurvePoint};
    use crate::daycount::DayCountConvention;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    fn five_year_bond() -> Instrument {
        Instrument::fixed_rate(
            BondTerms {
                face_value: dec!(1000),
                coupon_rate: dec!(0.05),
                maturity_date: d(2030, 1, 15),
                frequency: 2,
                day_count: DayCountConvention::Thirty360,
            },
            d(2025, 1, 15),
        )
        .unwrap()
    }

    #[test]
    fn test_par_bond_prices_at_par_on_coupon_date() {
        let price = price_from_yield(&five_year_bond(), dec!(0.05), d(2025, 1, 15)).unwrap();
        assert!(approx_eq(price, dec!(1000), dec!(0.000001)), "got {price}");
    }

    #[test]
    fn test_premium_bond_and_round_trip() {
        let bond = five_year_bond();
        let settle = d(2025, 1, 15);
        let price = price_from_yield(&bond, dec!(0.045), settle).unwrap();
        assert!(price > dec!(1000));
        // Closed form: 25 * a(10, 2.25%) + 1000 * v^10
        assert!(approx_eq(price, dec!(1022.16554), dec!(0.0001)), "got {price}");
        let y = yield_from_price(&bond, price, settle, None).unwrap();
        assert!(approx_eq(y, dec!(0.045), dec!(0.000001)), "got {y}");
    }

    #[test]
    fn test_mid_period_clean_dirty() {
        let bond = five_year_bond();
        let settle = d(2025, 4, 15);
        let clean = price_from_yield(&bond, dec!(0.05), settle).unwrap();
        let dirty = dirty_price_from_yield(&bond, dec!(0.05), settle).unwrap();
        let accrued = accrued_interest(&bond, settle).unwrap();
        assert_eq!(accrued, dec!(12.5));
        assert_eq!(dirty_price(clean, accrued), dirty);
        // A par bond between coupons trades marginally below par clean
        assert!(clean < dec!(1000) && clean > dec!(999));
    }

    #[test]
    fn test_zero_coupon_discounting() {
        let zero = Instrument::zero_coupon(
            ZeroCouponTerms {
                face_value: dec!(1000),
                maturity_date: d(2027, 1, 15),
                compounding_frequency: 2,
                day_count: DayCountConvention::Thirty360,
            },
            d(2025, 1, 15),
        )
        .unwrap();
        let price = price_from_yield(&zero, dec!(0.04), d(2025, 1, 15)).unwrap();
        let expected = dec!(1000) / decimal_pow(dec!(1.02), dec!(4));
        assert!(approx_eq(price, expected, dec!(0.0000001)));
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = yield_from_price(&five_year_bond(), dec!(-5), d(2025, 1, 15), None).unwrap_err();
        match err {
            CreditEngineError::InvalidInput { field, .. } => assert_eq!(field, "clean_price"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_absurd_price_fails_to_solve() {
        // A yield far above 100% is needed; the solver must not return it.
        let err = yield_from_price(&five_year_bond(), dec!(5), d(2025, 1, 15), None).unwrap_err();
        assert!(matches!(
            err,
            CreditEngineError::ConvergenceFailure { .. } | CreditEngineError::OutOfRangeResult { .. }
        ));
    }

    #[test]
    fn test_flat_curve_matches_annual_yield() {
        let bond = Instrument::fixed_rate(
            BondTerms {
                face_value: dec!(100),
                coupon_rate: dec!(0.04),
                maturity_date: d(2028, 1, 15),
                frequency: 1,
                day_count: DayCountConvention::Thirty360,
            },
            d(2025, 1, 15),
        )
        .unwrap();
        let curve = YieldCurve {
            points: vec![
                YieldCurvePoint { maturity: dec!(1), rate: dec!(0.04) },
                YieldCurvePoint { maturity: dec!(5), rate: dec!(0.04) },
            ],
            method: CurveMethod::Linear,
        };
        let from_curve = price_from_curve(&bond, &curve, d(2025, 1, 15)).unwrap();
        assert!(approx_eq(from_curve, dec!(100), dec!(0.0000001)), "got {from_curve}");
    }

    #[test]
    fn test_callable_heuristic_below_straight() {
        let bond = Instrument::callable(
            BondTerms {
                face_value: dec!(1000),
                coupon_rate: dec!(0.06),
                maturity_date: d(2035, 1, 15),
                frequency: 2,
                day_count: DayCountConvention::Thirty360,
            },
            vec![ExerciseDate { date: d(2029, 1, 15), price: dec!(1000) }],
            d(2025, 1, 15),
        )
        .unwrap();
        let val = price_with_embedded_options(&bond, dec!(0.05), d(2025, 1, 15), None).unwrap();
        // 4 years to call: factor 1% * sqrt(4) = 2% of straight
        assert!(approx_eq(val.option_value, val.straight_price * dec!(0.02), dec!(0.000001)));
        assert!(val.adjusted_price < val.straight_price);
        assert_eq!(val.exercise_date, Some(d(2029, 1, 15)));
    }

    #[test]
    fn test_plain_bond_has_no_option_value() {
        let val = price_with_embedded_options(&five_year_bond(), dec!(0.05), d(2025, 1, 15), None).unwrap();
        assert_eq!(val.option_value, Decimal::ZERO);
        assert_eq!(val.adjusted_price, val.straight_price);
    }
}
