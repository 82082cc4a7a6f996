//! Single-name CDS valuation on a default curve.
//!
//! Both legs are discounted on the payment grid `i/f` (last period cut at
//! maturity). Protection pays LGD at the end of the period in which
//! default occurs; premium accrues on surviving notional only.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::credit_scoring::DefaultCurve;
use crate::curves::YieldCurve;
use crate::error::CreditEngineError;
use crate::math::decimal_exp;
use crate::types::{BasisPoints, Money, Rate, Years};
use crate::CreditEngineResult;

const ONE_BP: Decimal = dec!(0.0001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdsContract {
    pub notional: Money,
    /// Contractual running spread
    pub spread: BasisPoints,
    pub maturity_years: Years,
    pub recovery_rate: Rate,
    /// Premium payments per year (1, 2, 4 or 12)
    #[serde(default = "default_payment_frequency")]
    pub payment_frequency: u8,
}

fn default_payment_frequency() -> u8 {
    4
}

impl CdsContract {
    pub fn validate(&self) -> CreditEngineResult<()> {
        if self.notional <= Decimal::ZERO {
            return Err(CreditEngineError::invalid_instrument("notional", "must be positive"));
        }
        if self.spread.value() < Decimal::ZERO {
            return Err(CreditEngineError::invalid_instrument("spread", "must be non-negative"));
        }
        if self.maturity_years <= Decimal::ZERO {
            return Err(CreditEngineError::invalid_instrument("maturity_years", "must be positive"));
        }
        if self.recovery_rate < Decimal::ZERO || self.recovery_rate >= Decimal::ONE {
            return Err(CreditEngineError::invalid_instrument("recovery_rate", "must lie within [0, 1)"));
        }
        if ![1, 2, 4, 12].contains(&self.payment_frequency) {
            return Err(CreditEngineError::invalid_instrument(
                "payment_frequency",
                "must be 1, 2, 4 or 12",
            ));
        }
        Ok(())
    }

    pub fn loss_given_default(&self) -> Rate {
        Decimal::ONE - self.recovery_rate
    }

    /// Premium dates as year fractions.
    pub fn payment_times(&self) -> Vec<Years> {
        let step = Decimal::ONE / Decimal::from(self.payment_frequency);
        let mut times = Vec::new();
        let mut k = 1u32;
        loop {
            let t = step * Decimal::from(k);
            if t >= self.maturity_years {
                times.push(self.maturity_years);
                break;
            }
            times.push(t);
            k += 1;
        }
        times
    }
}

/// Market CDS quote used for curve bootstrapping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CdsQuote {
    pub tenor: Years,
    pub spread: BasisPoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdsValuation {
    pub protection_leg: Money,
    /// Premium leg at the contract spread
    pub premium_leg: Money,
    /// Survival-weighted discounted annuity per unit notional
    pub risky_annuity: Decimal,
    pub fair_spread: BasisPoints,
    /// Value to the protection buyer
    pub mark_to_market: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdsRisk {
    /// Buyer value change for +1bp of spread
    pub spread_dv01: Money,
    /// Risky annuity, in years
    pub risky_duration: Decimal,
    /// Second-order value change per (1bp)², per unit notional
    pub spread_convexity: Decimal,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// `Σ ΔPD × LGD × DF / Σ S × DF × Δt`, in basis points.
pub fn cds_fair_spread(
    contract: &CdsContract,
    default_curve: &DefaultCurve,
    discount_curve: &YieldCurve,
) -> CreditEngineResult<BasisPoints> {
    contract.validate()?;
    let (protection, annuity) = legs_per_unit(contract, default_curve, discount_curve)?;
    if annuity <= Decimal::ZERO {
        return Err(CreditEngineError::degenerate("cds fair spread: zero premium leg"));
    }
    Ok(BasisPoints::from_rate(protection / annuity))
}

pub fn cds_present_value(
    contract: &CdsContract,
    default_curve: &DefaultCurve,
    discount_curve: &YieldCurve,
) -> CreditEngineResult<CdsValuation> {
    contract.validate()?;
    let (protection, annuity) = legs_per_unit(contract, default_curve, discount_curve)?;
    if annuity <= Decimal::ZERO {
        return Err(CreditEngineError::degenerate("cds present value: zero premium leg"));
    }
    let protection_leg = protection * contract.notional;
    let premium_leg = contract.spread.to_rate() * annuity * contract.notional;
    Ok(CdsValuation {
        protection_leg,
        premium_leg,
        risky_annuity: annuity,
        fair_spread: BasisPoints::from_rate(protection / annuity),
        mark_to_market: protection_leg - premium_leg,
    })
}

/// Upfront the protection buyer pays when trading at `running_spread`
/// instead of the fair spread.
pub fn cds_upfront(
    contract: &CdsContract,
    default_curve: &DefaultCurve,
    discount_curve: &YieldCurve,
    running_spread: BasisPoints,
) -> CreditEngineResult<Money> {
    contract.validate()?;
    let (protection, annuity) = legs_per_unit(contract, default_curve, discount_curve)?;
    Ok((protection - running_spread.to_rate() * annuity) * contract.notional)
}

/// Sensitivities to a ±1bp parallel move in the credit spread, applied as
/// a hazard shift of `1bp / LGD`.
pub fn cds_risk(
    contract: &CdsContract,
    default_curve: &DefaultCurve,
    discount_curve: &YieldCurve,
) -> CreditEngineResult<CdsRisk> {
    let base = cds_present_value(contract, default_curve, discount_curve)?;
    let dh = ONE_BP / contract.loss_given_default();
    let up = cds_present_value(contract, &shift_hazard(default_curve, dh)?, discount_curve)?;
    let down = cds_present_value(contract, &shift_hazard(default_curve, -dh)?, discount_curve)?;

    Ok(CdsRisk {
        spread_dv01: (up.mark_to_market - down.mark_to_market) / dec!(2),
        risky_duration: base.risky_annuity,
        spread_convexity: (up.mark_to_market + down.mark_to_market - dec!(2) * base.mark_to_market)
            / contract.notional,
    })
}

/// Default curve from par spreads via the credit triangle:
/// `PD(T) = 1 − exp(−(s/LGD)·T)`.
pub fn bootstrap_cds_curve(quotes: &[CdsQuote], recovery_rate: Rate) -> CreditEngineResult<DefaultCurve> {
    if quotes.is_empty() {
        return Err(CreditEngineError::InsufficientData("no CDS quotes".into()));
    }
    if recovery_rate < Decimal::ZERO || recovery_rate >= Decimal::ONE {
        return Err(CreditEngineError::invalid_input("recovery_rate", "must lie within [0, 1)"));
    }
    let lgd = Decimal::ONE - recovery_rate;

    let mut sorted = quotes.to_vec();
    sorted.sort_by(|a, b| a.tenor.cmp(&b.tenor));

    let mut tenors = Vec::with_capacity(sorted.len());
    let mut cumulative = Vec::with_capacity(sorted.len());
    for q in &sorted {
        if q.spread.value() < Decimal::ZERO {
            return Err(CreditEngineError::invalid_input("spread", "must be non-negative"));
        }
        tenors.push(q.tenor);
        cumulative.push(Decimal::ONE - decimal_exp(-(q.spread.to_rate() / lgd) * q.tenor));
    }
    DefaultCurve::from_cumulative(tenors, cumulative)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// (protection leg, risky annuity) per unit notional.
fn legs_per_unit(
    contract: &CdsContract,
    default_curve: &DefaultCurve,
    discount_curve: &YieldCurve,
) -> CreditEngineResult<(Decimal, Decimal)> {
    discount_curve.validate()?;
    let lgd = contract.loss_given_default();
    let mut protection = Decimal::ZERO;
    let mut annuity = Decimal::ZERO;
    let mut prev_t = Decimal::ZERO;
    let mut prev_pd = Decimal::ZERO;
    for t in contract.payment_times() {
        let pd = default_curve.cumulative_at(t);
        let df = discount_curve.discount_factor(t);
        protection += (pd - prev_pd) * lgd * df;
        annuity += (Decimal::ONE - pd) * df * (t - prev_t);
        prev_t = t;
        prev_pd = pd;
    }
    Ok((protection, annuity))
}

/// Scale survival by `exp(−dh·t)` at every tenor.
fn shift_hazard(curve: &DefaultCurve, dh: Rate) -> CreditEngineResult<DefaultCurve> {
    let cumulative = curve
        .tenors
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let shifted = Decimal::ONE - curve.survival(i) * decimal_exp(-dh * t);
            shifted.max(Decimal::ZERO).min(Decimal::ONE)
        })
        .collect();
    DefaultCurve::from_cumulative(curve.tenors.clone(), cumulative)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
