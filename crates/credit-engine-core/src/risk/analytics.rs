use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::duration::{
    convexity, dv01, effective_convexity, effective_duration, key_rate_durations, macaulay_duration,
    modified_duration, KeyRateDuration, DEFAULT_SHIFT,
};
use crate::bonds::{dirty_price_from_yield, Instrument};
use crate::curves::YieldCurve;
use crate::daycount::CouponBearing;
use crate::error::CreditEngineError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::CreditEngineResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondRiskInput {
    pub instrument: Instrument,
    pub settlement_date: NaiveDate,
    pub yield_rate: Rate,
    /// Effective measure shift in basis points; defaults to 10
    #[serde(default)]
    pub shift_bp: Option<Decimal>,
    /// Curve for key rate durations
    #[serde(default)]
    pub curve: Option<YieldCurve>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondRiskOutput {
    pub dirty_price: Money,
    pub macaulay_duration: Decimal,
    pub modified_duration: Decimal,
    pub effective_duration: Decimal,
    pub convexity: Decimal,
    pub effective_convexity: Decimal,
    pub dv01: Money,
    /// First-order plus convexity price change for a +100bp move
    pub price_change_up_100bp: Money,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_rate_durations: Vec<KeyRateDuration>,
}

pub fn calculate_bond_risk(input: &BondRiskInput) -> CreditEngineResult<ComputationOutput<BondRiskOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let bond = &input.instrument;
    let settle = input.settlement_date;
    let y = input.yield_rate;

    let shift = match input.shift_bp {
        Some(bp) if bp <= Decimal::ZERO => {
            return Err(CreditEngineError::invalid_input("shift_bp", "must be positive"));
        }
        Some(bp) => bp / dec!(10000),
        None => DEFAULT_SHIFT,
    };

    let dirty = dirty_price_from_yield(bond, y, settle)?;
    let modified = modified_duration(bond, y, settle)?;
    let cvx = convexity(bond, y, settle)?;
    let eff_dur = effective_duration(bond, y, settle, Some(shift))?;

    let has_options = !bond.call_schedule().is_empty() || !bond.put_schedule().is_empty();
    if has_options {
        warnings.push("Effective measures use the heuristic option-adjusted price".into());
    }
    if !has_options && ((eff_dur - modified) / modified).abs() > dec!(0.01) {
        warnings.push(format!(
            "Effective duration {eff_dur} deviates from modified duration {modified} by more than 1%"
        ));
    }

    let krds = match &input.curve {
        Some(curve) => key_rate_durations(bond, curve, Some(shift), settle)?,
        None => Vec::new(),
    };

    let dy = dec!(0.01);
    let price_change = dirty * (-modified * dy + dec!(0.5) * cvx * dy * dy);

    let output = BondRiskOutput {
        dirty_price: dirty,
        macaulay_duration: macaulay_duration(bond, y, settle)?,
        modified_duration: modified,
        effective_duration: eff_dur,
        convexity: cvx,
        effective_convexity: effective_convexity(bond, y, settle, Some(shift))?,
        dv01: dv01(bond, y, settle)?,
        price_change_up_100bp: price_change,
        key_rate_durations: krds,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Analytic and effective duration/convexity with key rate decomposition",
        &serde_json::json!({
            "instrument": bond.kind(),
            "frequency": bond.frequency(),
            "yield_rate": y.to_string(),
            "shift": shift.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
