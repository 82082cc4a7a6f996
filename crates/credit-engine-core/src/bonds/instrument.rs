//! Bond instruments.
//!
//! Coupon rates are decimals (0.05 = 5%); the valid range [0, 1] is the
//! 0–100% coupon range. Instruments are immutable once built: construct
//! them through the validating constructors on [`Instrument`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::daycount::{CouponBearing, DayCountConvention};
use crate::error::CreditEngineError;
use crate::types::{Money, Rate};
use crate::CreditEngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Terms of a plain fixed-rate bullet bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondTerms {
    /// Par / face value (typically 1000)
    pub face_value: Money,
    /// Annual coupon rate as a decimal
    pub coupon_rate: Rate,
    pub maturity_date: NaiveDate,
    /// Coupons per year: 1, 2, 4 or 12
    pub frequency: u8,
    #[serde(default)]
    pub day_count: DayCountConvention,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroCouponTerms {
    pub face_value: Money,
    pub maturity_date: NaiveDate,
    /// Compounding periods per year used when quoting yield
    #[serde(default = "default_zero_compounding")]
    pub compounding_frequency: u8,
    #[serde(default)]
    pub day_count: DayCountConvention,
}

/// Floating rate note projected at the current index fixing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingRateTerms {
    pub face_value: Money,
    /// Current reference index fixing (e.g. 3M SOFR)
    pub index_rate: Rate,
    /// Quoted margin over the index
    pub quoted_margin: Rate,
    pub maturity_date: NaiveDate,
    pub frequency: u8,
    #[serde(default = "default_frn_day_count")]
    pub day_count: DayCountConvention,
}

/// A call or put date with its exercise price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDate {
    pub date: NaiveDate,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallableBond {
    pub bond: BondTerms,
    pub call_schedule: Vec<ExerciseDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutableBond {
    pub bond: BondTerms,
    pub put_schedule: Vec<ExerciseDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instrument {
    FixedRate(BondTerms),
    ZeroCoupon(ZeroCouponTerms),
    FloatingRate(FloatingRateTerms),
    Callable(CallableBond),
    Putable(PutableBond),
}

fn default_zero_compounding() -> u8 {
    2
}

fn default_frn_day_count() -> DayCountConvention {
    DayCountConvention::Actual360
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Instrument {
    pub fn fixed_rate(terms: BondTerms, as_of: NaiveDate) -> CreditEngineResult<Self> {
        let instrument = Instrument::FixedRate(terms);
        instrument.validate(as_of)?;
        Ok(instrument)
    }

    pub fn zero_coupon(terms: ZeroCouponTerms, as_of: NaiveDate) -> CreditEngineResult<Self> {
        let instrument = Instrument::ZeroCoupon(terms);
        instrument.validate(as_of)?;
        Ok(instrument)
    }

    pub fn floating_rate(terms: FloatingRateTerms, as_of: NaiveDate) -> CreditEngineResult<Self> {
        let instrument = Instrument::FloatingRate(terms);
        instrument.validate(as_of)?;
        Ok(instrument)
    }

    /// Callable bond. The schedule is stored sorted by date.
    pub fn callable(
        bond: BondTerms,
        mut call_schedule: Vec<ExerciseDate>,
        as_of: NaiveDate,
    ) -> CreditEngineResult<Self> {
        call_schedule.sort_by_key(|e| e.date);
        let instrument = Instrument::Callable(CallableBond { bond, call_schedule });
        instrument.validate(as_of)?;
        Ok(instrument)
    }

    /// Putable bond. The schedule is stored sorted by date.
    pub fn putable(
        bond: BondTerms,
        mut put_schedule: Vec<ExerciseDate>,
        as_of: NaiveDate,
    ) -> CreditEngineResult<Self> {
        put_schedule.sort_by_key(|e| e.date);
        let instrument = Instrument::Putable(PutableBond { bond, put_schedule });
        instrument.validate(as_of)?;
        Ok(instrument)
    }

    /// Check construction invariants against `as_of`.
    ///
    /// Pricing functions call this with the settlement date, so instruments
    /// deserialized from JSON are held to the same rules.
    pub fn validate(&self, as_of: NaiveDate) -> CreditEngineResult<()> {
        check_face_value(self.face_value())?;
        if self.maturity() <= as_of {
            return Err(CreditEngineError::invalid_instrument(
                "maturity_date",
                format!("must be after {as_of}"),
            ));
        }
        if !matches!(self.frequency(), 1 | 2 | 4 | 12) {
            return Err(CreditEngineError::invalid_instrument(
                "frequency",
                "must be 1, 2, 4, or 12",
            ));
        }

        match self {
            Instrument::FixedRate(terms) => check_coupon("coupon_rate", terms.coupon_rate),
            Instrument::ZeroCoupon(_) => Ok(()),
            Instrument::FloatingRate(terms) => {
                check_coupon("index_rate", terms.index_rate)?;
                if terms.quoted_margin.abs() > Decimal::ONE {
                    return Err(CreditEngineError::invalid_instrument(
                        "quoted_margin",
                        "must be between -100% and 100%",
                    ));
                }
                check_coupon("coupon_rate", terms.index_rate + terms.quoted_margin)
            }
            Instrument::Callable(c) => {
                check_coupon("coupon_rate", c.bond.coupon_rate)?;
                check_schedule("call_schedule", &c.call_schedule, c.bond.maturity_date)
            }
            Instrument::Putable(p) => {
                check_coupon("coupon_rate", p.bond.coupon_rate)?;
                check_schedule("put_schedule", &p.put_schedule, p.bond.maturity_date)
            }
        }
    }

    pub fn call_schedule(&self) -> &[ExerciseDate] {
        match self {
            Instrument::Callable(c) => &c.call_schedule,
            _ => &[],
        }
    }

    pub fn put_schedule(&self) -> &[ExerciseDate] {
        match self {
            Instrument::Putable(p) => &p.put_schedule,
            _ => &[],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Instrument::FixedRate(_) => "fixed_rate",
            Instrument::ZeroCoupon(_) => "zero_coupon",
            Instrument::FloatingRate(_) => "floating_rate",
            Instrument::Callable(_) => "callable",
            Instrument::Putable(_) => "putable",
        }
    }
}

impl CouponBearing for Instrument {
    fn face_value(&self) -> Money {
        match self {
            Instrument::FixedRate(t) => t.face_value,
            Instrument::ZeroCoupon(t) => t.face_value,
            Instrument::FloatingRate(t) => t.face_value,
            Instrument::Callable(c) => c.bond.face_value,
            Instrument::Putable(p) => p.bond.face_value,
        }
    }

    fn annual_coupon_rate(&self) -> Rate {
        match self {
            Instrument::FixedRate(t) => t.coupon_rate,
            Instrument::ZeroCoupon(_) => Decimal::ZERO,
            Instrument::FloatingRate(t) => t.index_rate + t.quoted_margin,
            Instrument::Callable(c) => c.bond.coupon_rate,
            Instrument::Putable(p) => p.bond.coupon_rate,
        }
    }

    fn maturity(&self) -> NaiveDate {
        match self {
            Instrument::FixedRate(t) => t.maturity_date,
            Instrument::ZeroCoupon(t) => t.maturity_date,
            Instrument::FloatingRate(t) => t.maturity_date,
            Instrument::Callable(c) => c.bond.maturity_date,
            Instrument::Putable(p) => p.bond.maturity_date,
        }
    }

    fn frequency(&self) -> u8 {
        match self {
            Instrument::FixedRate(t) => t.frequency,
            Instrument::ZeroCoupon(t) => t.compounding_frequency,
            Instrument::FloatingRate(t) => t.frequency,
            Instrument::Callable(c) => c.bond.frequency,
            Instrument::Putable(p) => p.bond.frequency,
        }
    }

    fn day_count(&self) -> DayCountConvention {
        match self {
            Instrument::FixedRate(t) => t.day_count,
            Instrument::ZeroCoupon(t) => t.day_count,
            Instrument::FloatingRate(t) => t.day_count,
            Instrument::Callable(c) => c.bond.day_count,
            Instrument::Putable(p) => p.bond.day_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn check_face_value(face: Money) -> CreditEngineResult<()> {
    if face <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_instrument("face_value", "must be positive"));
    }
    Ok(())
}

fn check_coupon(field: &str, rate: Rate) -> CreditEngineResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(CreditEngineError::invalid_instrument(field, "must be between 0 and 1 (0-100%)"));
    }
    Ok(())
}

fn check_schedule(field: &str, schedule: &[ExerciseDate], maturity: NaiveDate) -> CreditEngineResult<()> {
    if schedule.is_empty() {
        return Err(CreditEngineError::invalid_instrument(field, "must contain at least one date"));
    }
    for exercise in schedule {
        if exercise.date >= maturity {
            return Err(CreditEngineError::invalid_instrument(field, "exercise dates must precede maturity"));
        }
        if exercise.price <= Decimal::ZERO {
            return Err(CreditEngineError::invalid_instrument(field, "exercise price must be positive"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
