//! Closed-form loss distribution of a portfolio of independent obligors.
//!
//! Each obligor loses `EAD × LGD` with probability PD. Means and variances
//! add; tail losses use the normal approximation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CreditEngineError;
use crate::math::distribution::{Z_95, Z_99};
use crate::math::decimal_sqrt;
use crate::types::{Money, Probability, Rate};
use crate::CreditEngineResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obligor {
    pub name: String,
    pub exposure_at_default: Money,
    pub default_probability: Probability,
    pub loss_given_default: Rate,
}

impl Obligor {
    fn validate(&self) -> CreditEngineResult<()> {
        if self.exposure_at_default < Decimal::ZERO {
            return Err(CreditEngineError::invalid_input(
                "exposure_at_default",
                format!("{}: must be non-negative", self.name),
            ));
        }
        for (field, value) in [
            ("default_probability", self.default_probability),
            ("loss_given_default", self.loss_given_default),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(CreditEngineError::invalid_input(
                    field,
                    format!("{}: must lie within [0, 1]", self.name),
                ));
            }
        }
        Ok(())
    }

    pub fn expected_loss(&self) -> Money {
        self.exposure_at_default * self.default_probability * self.loss_given_default
    }

    pub fn loss_variance(&self) -> Decimal {
        let severity = self.exposure_at_default * self.loss_given_default;
        severity * severity * self.default_probability * (Decimal::ONE - self.default_probability)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossDistribution {
    pub expected_loss: Money,
    pub loss_variance: Decimal,
    pub loss_std_dev: Money,
    pub loss_95: Money,
    pub loss_99: Money,
    /// 99th percentile loss less expected loss
    pub unexpected_loss: Money,
    pub total_exposure: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalAllocation {
    pub name: String,
    pub expected_loss: Money,
    pub capital: Money,
    /// Share of total capital
    pub share: Decimal,
}

pub fn portfolio_loss_distribution(obligors: &[Obligor]) -> CreditEngineResult<LossDistribution> {
    if obligors.is_empty() {
        return Err(CreditEngineError::InsufficientData("no obligors".into()));
    }
    let mut el = Decimal::ZERO;
    let mut variance = Decimal::ZERO;
    let mut exposure = Decimal::ZERO;
    for o in obligors {
        o.validate()?;
        el += o.expected_loss();
        variance += o.loss_variance();
        exposure += o.exposure_at_default;
    }
    let sd = decimal_sqrt(variance);
    let loss_99 = el + Z_99 * sd;
    Ok(LossDistribution {
        expected_loss: el,
        loss_variance: variance,
        loss_std_dev: sd,
        loss_95: el + Z_95 * sd,
        loss_99,
        unexpected_loss: loss_99 - el,
        total_exposure: exposure,
    })
}

/// Euler allocation of `capital` (default: the unexpected loss). Under
/// independence each obligor's contribution to σ is `Var_i / σ`, so the
/// shares are `Var_i / Σ Var`.
pub fn allocate_economic_capital(
    obligors: &[Obligor],
    capital: Option<Money>,
) -> CreditEngineResult<Vec<CapitalAllocation>> {
    let dist = portfolio_loss_distribution(obligors)?;
    let total_capital = capital.unwrap_or(dist.unexpected_loss);
    if total_capital < Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("capital", "must be non-negative"));
    }
    if dist.loss_variance.is_zero() {
        return Err(CreditEngineError::degenerate("capital allocation: zero portfolio loss variance"));
    }

    Ok(obligors
        .iter()
        .map(|o| {
            let share = o.loss_variance() / dist.loss_variance;
            CapitalAllocation {
                name: o.name.clone(),
                expected_loss: o.expected_loss(),
                capital: total_capital * share,
                share,
            }
        })
        .collect())
}
