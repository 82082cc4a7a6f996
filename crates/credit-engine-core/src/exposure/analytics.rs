use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::cva::{
    apply_wrong_way_risk, calculate_bilateral_cva, calculate_cva, calculate_dva, collateralize_exposure,
    CollateralAgreement,
};
use super::portfolio_loss::{
    allocate_economic_capital, portfolio_loss_distribution, CapitalAllocation, LossDistribution, Obligor,
};
use super::profile::{build_exposure_profile, exposure_at_default, ExposureProfile};
use crate::credit_scoring::DefaultCurve;
use crate::curves::YieldCurve;
use crate::error::CreditEngineError;
use crate::types::{with_metadata, ComputationOutput, Money, Probability, Rate, Years};
use crate::CreditEngineResult;

// ---------------------------------------------------------------------------
// Counterparty risk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterpartyRiskInput {
    pub time_grid: Vec<Years>,
    /// `scenarios[s][t]`: netting set value per scenario and grid point
    #[serde(default)]
    pub scenarios: Vec<Vec<Money>>,
    #[cfg(feature = "simulation")]
    #[serde(default)]
    pub simulation: Option<super::simulation::ExposureSimulationConfig>,
    #[serde(default)]
    pub pfe_percentile: Option<Decimal>,
    pub counterparty_default_curve: DefaultCurve,
    pub counterparty_recovery_rate: Rate,
    #[serde(default)]
    pub own_default_curve: Option<DefaultCurve>,
    #[serde(default)]
    pub own_recovery_rate: Option<Rate>,
    pub discount_curve: YieldCurve,
    #[serde(default)]
    pub wrong_way_multiplier: Option<Decimal>,
    #[serde(default)]
    pub collateral: Option<CollateralAgreement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterpartyRiskOutput {
    pub profile: ExposureProfile,
    pub marginal_default_probabilities: Vec<Probability>,
    /// EE after wrong-way scaling, as used for CVA
    pub cva_exposure: Vec<Money>,
    pub cva: Money,
    pub dva: Money,
    pub bilateral_cva: Money,
    pub exposure_at_default: Money,
}

pub fn calculate_counterparty_risk(
    input: &CounterpartyRiskInput,
) -> CreditEngineResult<ComputationOutput<CounterpartyRiskOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.counterparty_default_curve.validate()?;
    if let Some(own) = &input.own_default_curve {
        own.validate()?;
    }

    let raw = scenario_matrix(input, &mut warnings)?;
    let scenarios = match &input.collateral {
        Some(agreement) => {
            let mut collateralized = Vec::with_capacity(raw.len());
            for path in &raw {
                let mut out = Vec::with_capacity(path.len());
                for &v in path {
                    out.push(if v > Decimal::ZERO {
                        collateralize_exposure(&[v], agreement)?.residual_exposure
                    } else {
                        v
                    });
                }
                collateralized.push(out);
            }
            collateralized
        }
        None => raw,
    };

    let profile = build_exposure_profile(&input.time_grid, &scenarios, input.pfe_percentile)?;
    let marginal = marginal_on_grid(&input.counterparty_default_curve, &input.time_grid);

    let cva_exposure = match input.wrong_way_multiplier {
        Some(m) => apply_wrong_way_risk(&profile.expected_exposure, m)?,
        None => profile.expected_exposure.clone(),
    };
    let cva = calculate_cva(
        &input.time_grid,
        &cva_exposure,
        &marginal,
        input.counterparty_recovery_rate,
        &input.discount_curve,
    )?;

    let dva = match (&input.own_default_curve, input.own_recovery_rate) {
        (Some(curve), Some(recovery)) => calculate_dva(
            &input.time_grid,
            &profile.expected_negative_exposure,
            &marginal_on_grid(curve, &input.time_grid),
            recovery,
            &input.discount_curve,
        )?,
        (Some(_), None) | (None, Some(_)) => {
            warnings.push("DVA needs both own default curve and own recovery rate; set to zero".into());
            Decimal::ZERO
        }
        (None, None) => Decimal::ZERO,
    };

    if let Some(last) = input.counterparty_default_curve.tenors.last() {
        if input.time_grid.last().is_some_and(|t| t > last) {
            warnings.push("Time grid extends past the counterparty default curve".into());
        }
    }

    let output = CounterpartyRiskOutput {
        exposure_at_default: exposure_at_default(&cva_exposure, &marginal)?,
        bilateral_cva: calculate_bilateral_cva(cva, dva),
        cva,
        dva,
        cva_exposure,
        marginal_default_probabilities: marginal,
        profile,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Scenario exposure profile with unilateral and bilateral CVA",
        &serde_json::json!({
            "grid_points": input.time_grid.len(),
            "scenarios": scenarios.len(),
            "counterparty_recovery_rate": input.counterparty_recovery_rate.to_string(),
            "collateralized": input.collateral.is_some(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Marginal PD in each `(t_{i−1}, t_i]` interval of the grid.
fn marginal_on_grid(curve: &DefaultCurve, time_grid: &[Years]) -> Vec<Probability> {
    let mut prev = Decimal::ZERO;
    time_grid
        .iter()
        .map(|&t| {
            let cum = curve.cumulative_at(t);
            let marginal = cum - prev;
            prev = cum;
            marginal
        })
        .collect()
}

#[cfg(feature = "simulation")]
fn scenario_matrix(input: &CounterpartyRiskInput, warnings: &mut Vec<String>) -> CreditEngineResult<Vec<Vec<Money>>> {
    match &input.simulation {
        Some(config) => {
            if !input.scenarios.is_empty() {
                warnings.push("Supplied scenarios ignored in favour of simulation".into());
            }
            super::simulation::simulate_exposure_scenarios(&input.time_grid, config)
        }
        None => supplied_scenarios(input),
    }
}

#[cfg(not(feature = "simulation"))]
fn scenario_matrix(input: &CounterpartyRiskInput, _warnings: &mut Vec<String>) -> CreditEngineResult<Vec<Vec<Money>>> {
    supplied_scenarios(input)
}

fn supplied_scenarios(input: &CounterpartyRiskInput) -> CreditEngineResult<Vec<Vec<Money>>> {
    if input.scenarios.is_empty() {
        return Err(CreditEngineError::InsufficientData("no exposure scenarios supplied".into()));
    }
    Ok(input.scenarios.clone())
}

// ---------------------------------------------------------------------------
// Portfolio loss
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioLossInput {
    pub obligors: Vec<Obligor>,
    /// Capital to allocate; defaults to the unexpected loss
    #[serde(default)]
    pub capital: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioLossOutput {
    pub distribution: LossDistribution,
    pub allocations: Vec<CapitalAllocation>,
}

pub fn analyze_portfolio_loss(
    input: &PortfolioLossInput,
) -> CreditEngineResult<ComputationOutput<PortfolioLossOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let distribution = portfolio_loss_distribution(&input.obligors)?;
    let allocations = allocate_economic_capital(&input.obligors, input.capital)?;

    if input.obligors.len() < 10 {
        warnings.push("Normal approximation is crude for fewer than 10 obligors".into());
    }

    let output = PortfolioLossOutput {
        distribution,
        allocations,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Independent-obligor loss moments, normal-approximation tail, Euler capital allocation",
        &serde_json::json!({
            "obligors": input.obligors.len(),
            "capital": input.capital.map(|c| c.to_string()),
        }),
        warnings,
        elapsed,
        output,
    ))
}
