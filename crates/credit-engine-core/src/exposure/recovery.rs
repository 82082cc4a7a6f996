//! Recovery rate estimators.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CreditEngineError;
use crate::types::{BasisPoints, Money, Rate};
use crate::CreditEngineResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    SeniorSecured,
    SeniorUnsecured,
    SeniorSubordinated,
    Subordinated,
    JuniorSubordinated,
    PreferredEquity,
}

impl Seniority {
    /// Long-run average recovery by seniority (Moody's-style table).
    pub fn average_recovery(&self) -> Rate {
        match self {
            Self::SeniorSecured => dec!(0.65),
            Self::SeniorUnsecured => dec!(0.40),
            Self::SeniorSubordinated => dec!(0.30),
            Self::Subordinated => dec!(0.25),
            Self::JuniorSubordinated => dec!(0.15),
            Self::PreferredEquity => dec!(0.05),
        }
    }
}

/// A resolved default: what was owed and what came back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecoveryObservation {
    pub exposure: Money,
    pub recovered: Money,
}

/// Exposure-weighted realized recovery `Σ recovered / Σ exposure`.
pub fn historical_recovery_rate(observations: &[RecoveryObservation]) -> CreditEngineResult<Rate> {
    if observations.is_empty() {
        return Err(CreditEngineError::InsufficientData("no recovery observations".into()));
    }
    let mut exposure = Decimal::ZERO;
    let mut recovered = Decimal::ZERO;
    for obs in observations {
        if obs.exposure < Decimal::ZERO || obs.recovered < Decimal::ZERO {
            return Err(CreditEngineError::invalid_input("observations", "amounts must be non-negative"));
        }
        exposure += obs.exposure;
        recovered += obs.recovered;
    }
    if exposure.is_zero() {
        return Err(CreditEngineError::degenerate("historical recovery: zero total exposure"));
    }
    Ok(recovered / exposure)
}

pub fn industry_average_recovery(seniority: Seniority) -> Rate {
    seniority.average_recovery()
}

/// Table recovery, lifted to the collateral coverage `min(C/EAD, 1)` for
/// senior secured claims.
pub fn seniority_adjusted_recovery(
    seniority: Seniority,
    collateral_value: Money,
    exposure_at_default: Money,
) -> CreditEngineResult<Rate> {
    if exposure_at_default <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("exposure_at_default", "must be positive"));
    }
    if collateral_value < Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("collateral_value", "must be non-negative"));
    }
    let base = seniority.average_recovery();
    if seniority != Seniority::SeniorSecured {
        return Ok(base);
    }
    let coverage = (collateral_value / exposure_at_default).min(Decimal::ONE);
    Ok(base.max(coverage))
}

/// `1 − CDS spread / bond spread`, clamped to [0, 1].
pub fn market_implied_recovery(cds_spread: BasisPoints, bond_spread: BasisPoints) -> CreditEngineResult<Rate> {
    if bond_spread.value() <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("bond_spread", "must be positive"));
    }
    let implied = Decimal::ONE - cds_spread.value() / bond_spread.value();
    Ok(implied.max(Decimal::ZERO).min(Decimal::ONE))
}
