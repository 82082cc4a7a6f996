//! Credit and debit valuation adjustments, wrong-way risk and collateral.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::curves::YieldCurve;
use crate::error::CreditEngineError;
use crate::types::{Money, Probability, Rate, Years};
use crate::CreditEngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// CSA terms for one netting set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CollateralAgreement {
    /// Offset positive and negative trade values
    #[serde(default)]
    pub netting: bool,
    /// Uncollateralised exposure allowed before a call
    #[serde(default)]
    pub threshold: Money,
    /// Calls smaller than this are not made
    #[serde(default)]
    pub minimum_transfer_amount: Money,
    /// Initial margin held regardless of exposure
    #[serde(default)]
    pub independent_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollateralizedExposure {
    pub gross_exposure: Money,
    pub net_exposure: Money,
    pub collateral_held: Money,
    pub residual_exposure: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// `LGD × Σ EE_i × marginal PD_i × DF(t_i)`.
pub fn calculate_cva(
    time_grid: &[Years],
    expected_exposure: &[Money],
    marginal_pd: &[Probability],
    recovery_rate: Rate,
    discount_curve: &YieldCurve,
) -> CreditEngineResult<Money> {
    discounted_loss("cva", time_grid, expected_exposure, marginal_pd, recovery_rate, discount_curve)
}

/// CVA mirrored onto our own default: the amounts we owe (ENE) weighted by
/// our marginal PDs.
pub fn calculate_dva(
    time_grid: &[Years],
    expected_negative_exposure: &[Money],
    own_marginal_pd: &[Probability],
    own_recovery_rate: Rate,
    discount_curve: &YieldCurve,
) -> CreditEngineResult<Money> {
    discounted_loss(
        "dva",
        time_grid,
        expected_negative_exposure,
        own_marginal_pd,
        own_recovery_rate,
        discount_curve,
    )
}

pub fn calculate_bilateral_cva(cva: Money, dva: Money) -> Money {
    cva - dva
}

/// Scale expected exposure by a wrong-way multiplier (Basel's α = 1.4 is
/// a common choice). Multipliers below 1 model right-way risk.
pub fn apply_wrong_way_risk(expected_exposure: &[Money], multiplier: Decimal) -> CreditEngineResult<Vec<Money>> {
    if multiplier < Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("wrong_way_multiplier", "must be non-negative"));
    }
    Ok(expected_exposure.iter().map(|e| *e * multiplier).collect())
}

/// Exposure left after netting and the collateral the agreement calls for.
pub fn collateralize_exposure(
    trade_values: &[Money],
    agreement: &CollateralAgreement,
) -> CreditEngineResult<CollateralizedExposure> {
    if agreement.threshold < Decimal::ZERO
        || agreement.minimum_transfer_amount < Decimal::ZERO
        || agreement.independent_amount < Decimal::ZERO
    {
        return Err(CreditEngineError::invalid_input(
            "collateral",
            "threshold, minimum transfer and independent amount must be non-negative",
        ));
    }

    let gross: Money = trade_values.iter().map(|&v| v.max(Decimal::ZERO)).sum();
    let net = if agreement.netting {
        trade_values.iter().copied().sum::<Money>().max(Decimal::ZERO)
    } else {
        gross
    };

    let mut call = (net - agreement.threshold).max(Decimal::ZERO);
    if call < agreement.minimum_transfer_amount {
        call = Decimal::ZERO;
    }
    let collateral = call + agreement.independent_amount;

    Ok(CollateralizedExposure {
        gross_exposure: gross,
        net_exposure: net,
        collateral_held: collateral,
        residual_exposure: (net - collateral).max(Decimal::ZERO),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn discounted_loss(
    context: &str,
    time_grid: &[Years],
    exposure: &[Money],
    marginal_pd: &[Probability],
    recovery_rate: Rate,
    discount_curve: &YieldCurve,
) -> CreditEngineResult<Money> {
    if exposure.len() != time_grid.len() {
        return Err(CreditEngineError::dimension_mismatch(context, time_grid.len(), exposure.len()));
    }
    if marginal_pd.len() != time_grid.len() {
        return Err(CreditEngineError::dimension_mismatch(context, time_grid.len(), marginal_pd.len()));
    }
    if recovery_rate < Decimal::ZERO || recovery_rate > Decimal::ONE {
        return Err(CreditEngineError::invalid_input("recovery_rate", "must lie within [0, 1]"));
    }
    discount_curve.validate()?;

    let lgd = Decimal::ONE - recovery_rate;
    let total: Money = time_grid
        .iter()
        .zip(exposure)
        .zip(marginal_pd)
        .map(|((t, e), pd)| *e * *pd * discount_curve.discount_factor(*t))
        .sum();
    Ok(lgd * total)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
