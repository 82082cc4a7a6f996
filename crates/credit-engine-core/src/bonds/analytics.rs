use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::instrument::Instrument;
use super::pricing::{
    dirty_price, price_from_yield, price_with_embedded_options, yield_from_price, EmbeddedOptionValuation,
};
use super::yields::{current_yield, discount_margin, simple_yield, yield_to_worst, YieldToWorst};
use crate::daycount::{accrued_interest, generate_cash_flows, year_fraction, CashFlow, CouponBearing};
use crate::error::CreditEngineError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Years};
use crate::CreditEngineResult;

/// Price a bond from either a yield or a clean price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPricingInput {
    pub instrument: Instrument,
    pub settlement_date: NaiveDate,
    /// Yield to maturity; give this or `clean_price`
    #[serde(default)]
    pub yield_rate: Option<Rate>,
    #[serde(default)]
    pub clean_price: Option<Money>,
    /// Scaling for the callable/putable option heuristic
    #[serde(default)]
    pub option_factor: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPricingOutput {
    pub clean_price: Money,
    pub dirty_price: Money,
    pub accrued_interest: Money,
    pub yield_to_maturity: Rate,
    pub current_yield: Rate,
    pub simple_yield: Rate,
    pub years_to_maturity: Years,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yield_to_worst: Option<YieldToWorst>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_margin: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded_option: Option<EmbeddedOptionValuation>,
    pub cash_flows: Vec<CashFlow>,
}

pub fn price_bond(input: &BondPricingInput) -> CreditEngineResult<ComputationOutput<BondPricingOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let bond = &input.instrument;
    let settle = input.settlement_date;
    bond.validate(settle)?;

    let (clean, ytm) = match (input.yield_rate, input.clean_price) {
        (Some(y), None) => (price_from_yield(bond, y, settle)?, y),
        (None, Some(p)) => (p, yield_from_price(bond, p, settle, None)?),
        _ => {
            return Err(CreditEngineError::invalid_input(
                "yield_rate",
                "exactly one of yield_rate or clean_price is required",
            ))
        }
    };

    let accrued = accrued_interest(bond, settle)?;
    let has_options = !bond.call_schedule().is_empty() || !bond.put_schedule().is_empty();

    let ytw = if has_options {
        let worst = yield_to_worst(bond, clean, settle)?;
        if worst.workout_date != bond.maturity() {
            warnings.push(format!(
                "Yield to worst is a {:?} yield to {}",
                worst.workout, worst.workout_date
            ));
        }
        Some(worst)
    } else {
        None
    };

    let embedded_option = if has_options {
        warnings.push("Embedded option value is a heuristic estimate, not a lattice valuation".into());
        Some(price_with_embedded_options(bond, ytm, settle, input.option_factor)?)
    } else {
        None
    };

    let dm = match bond {
        Instrument::FloatingRate(_) => Some(discount_margin(bond, clean, settle)?),
        _ => None,
    };

    if ytm < Decimal::ZERO {
        warnings.push(format!("Negative yield to maturity: {ytm}"));
    }

    let output = BondPricingOutput {
        clean_price: clean,
        dirty_price: dirty_price(clean, accrued),
        accrued_interest: accrued,
        yield_to_maturity: ytm,
        current_yield: current_yield(bond, clean)?,
        simple_yield: simple_yield(bond, clean, settle)?,
        years_to_maturity: year_fraction(settle, bond.maturity(), bond.day_count())?,
        yield_to_worst: ytw,
        discount_margin: dm,
        embedded_option,
        cash_flows: generate_cash_flows(bond, settle)?,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Discounted cash flow bond pricing with Newton-Raphson yield inversion",
        &serde_json::json!({
            "instrument": bond.kind(),
            "day_count": format!("{:?}", bond.day_count()),
            "frequency": bond.frequency(),
            "settlement_date": settle.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
