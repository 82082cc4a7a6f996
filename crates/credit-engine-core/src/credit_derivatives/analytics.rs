use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::cds::{
    bootstrap_cds_curve, cds_present_value, cds_risk, cds_upfront, CdsContract, CdsQuote, CdsRisk, CdsValuation,
};
use super::spreads::{bond_cds_basis, cs01, i_spread, option_adjusted_spread, z_spread, OptionAdjustedSpread};
use crate::bonds::{yield_from_price, Instrument};
use crate::credit_scoring::DefaultCurve;
use crate::curves::YieldCurve;
use crate::error::CreditEngineError;
use crate::types::{with_metadata, BasisPoints, ComputationOutput, Money, Rate, Years};
use crate::CreditEngineResult;

// ---------------------------------------------------------------------------
// CDS
// ---------------------------------------------------------------------------

/// The default curve comes from, in order of preference: an explicit
/// curve, a flat hazard rate, bootstrapped quotes, or the contract spread
/// itself through the credit triangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdsAnalysisInput {
    pub contract: CdsContract,
    pub discount_curve: YieldCurve,
    #[serde(default)]
    pub default_curve: Option<DefaultCurve>,
    #[serde(default)]
    pub hazard_rate: Option<Rate>,
    #[serde(default)]
    pub quotes: Vec<CdsQuote>,
    /// Standard running coupon for an upfront quote, e.g. 100 or 500
    #[serde(default)]
    pub running_spread: Option<BasisPoints>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdsAnalysisOutput {
    pub valuation: CdsValuation,
    pub risk: CdsRisk,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upfront: Option<Money>,
    pub default_curve: DefaultCurve,
    /// `spread / LGD`
    pub implied_hazard_rate: Rate,
}

pub fn analyze_cds(input: &CdsAnalysisInput) -> CreditEngineResult<ComputationOutput<CdsAnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let contract = &input.contract;
    contract.validate()?;
    let lgd = contract.loss_given_default();

    let (default_curve, source) = match (&input.default_curve, input.hazard_rate, input.quotes.is_empty()) {
        (Some(curve), _, _) => {
            curve.validate()?;
            (curve.clone(), "default_curve")
        }
        (None, Some(h), _) => (DefaultCurve::from_hazard_rate(h, annual_tenors(contract.maturity_years))?, "hazard_rate"),
        (None, None, false) => (bootstrap_cds_curve(&input.quotes, contract.recovery_rate)?, "quotes"),
        (None, None, true) => {
            warnings.push("Default curve implied from the contract spread".into());
            let quote = CdsQuote {
                tenor: contract.maturity_years,
                spread: contract.spread,
            };
            (bootstrap_cds_curve(&[quote], contract.recovery_rate)?, "contract_spread")
        }
    };
    if input.default_curve.is_some() && (input.hazard_rate.is_some() || !input.quotes.is_empty()) {
        warnings.push("Explicit default curve takes precedence; hazard rate and quotes ignored".into());
    }
    if let Some(last) = default_curve.tenors.last() {
        if *last < contract.maturity_years {
            warnings.push(format!(
                "Default curve ends at {last}y; extrapolated flat hazard to {}y",
                contract.maturity_years
            ));
        }
    }

    let valuation = cds_present_value(contract, &default_curve, &input.discount_curve)?;
    let risk = cds_risk(contract, &default_curve, &input.discount_curve)?;
    let upfront = match input.running_spread {
        Some(running) => Some(cds_upfront(contract, &default_curve, &input.discount_curve, running)?),
        None => None,
    };

    let output = CdsAnalysisOutput {
        implied_hazard_rate: valuation.fair_spread.to_rate() / lgd,
        valuation,
        risk,
        upfront,
        default_curve,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Discrete-grid CDS valuation: protection and premium legs on a default curve",
        &serde_json::json!({
            "default_curve_source": source,
            "recovery_rate": contract.recovery_rate.to_string(),
            "payment_frequency": contract.payment_frequency,
            "maturity_years": contract.maturity_years.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn annual_tenors(maturity: Years) -> Vec<Years> {
    let mut tenors = Vec::new();
    let mut t = Decimal::ONE;
    while t < maturity {
        tenors.push(t);
        t += Decimal::ONE;
    }
    tenors.push(maturity);
    tenors
}

// ---------------------------------------------------------------------------
// Bond spreads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadAnalysisInput {
    pub instrument: Instrument,
    pub settlement_date: NaiveDate,
    pub clean_price: Money,
    pub curve: YieldCurve,
    /// Same-name CDS spread for the basis
    #[serde(default)]
    pub cds_spread: Option<BasisPoints>,
    #[serde(default)]
    pub option_factor: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadAnalysisOutput {
    pub yield_to_maturity: Rate,
    pub z_spread: BasisPoints,
    pub i_spread: BasisPoints,
    pub option_adjusted: OptionAdjustedSpread,
    pub cs01: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cds_basis: Option<BasisPoints>,
}

pub fn analyze_bond_spreads(
    input: &SpreadAnalysisInput,
) -> CreditEngineResult<ComputationOutput<SpreadAnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let bond = &input.instrument;
    let settle = input.settlement_date;
    if let Instrument::FloatingRate(_) = bond {
        return Err(CreditEngineError::invalid_input(
            "instrument",
            "use discount margin for floating rate notes",
        ));
    }

    let ytm = yield_from_price(bond, input.clean_price, settle, None)?;
    let z = z_spread(bond, input.clean_price, &input.curve, settle)?;
    let oas = option_adjusted_spread(bond, input.clean_price, &input.curve, settle, input.option_factor)?;
    if !oas.option_cost.is_zero() {
        warnings.push("Option cost uses the heuristic embedded option value".into());
    }
    if z < Decimal::ZERO {
        warnings.push("Negative Z-spread: bond trades rich to the curve".into());
    }

    let output = SpreadAnalysisOutput {
        yield_to_maturity: ytm,
        z_spread: BasisPoints::from_rate(z),
        i_spread: BasisPoints::from_rate(i_spread(bond, ytm, &input.curve, settle)?),
        option_adjusted: oas,
        cs01: cs01(bond, input.clean_price, &input.curve, settle)?,
        cds_basis: input.cds_spread.map(|s| bond_cds_basis(s, z)),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Z-spread by Newton-Raphson over the zero curve, with I-spread, OAS and CS01",
        &serde_json::json!({
            "instrument": bond.kind(),
            "settlement_date": settle.to_string(),
            "curve_method": format!("{:?}", input.curve.method),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonds::BondTerms;
    use crate::curves::{CurveMethod, YieldCurvePoint};
    use crate::daycount::DayCountConvention;
    use rust_decimal_macros::dec;

    fn curve() -> YieldCurve {
        YieldCurve::new(
            vec![
                YieldCurvePoint { maturity: dec!(1), rate: dec!(0.03) },
                YieldCurvePoint { maturity: dec!(10), rate: dec!(0.03) },
            ],
            CurveMethod::Linear,
        )
        .unwrap()
    }

    fn contract() -> CdsContract {
        CdsContract {
            notional: dec!(1000000),
            spread: BasisPoints::new(dec!(120)),
            maturity_years: dec!(5),
            recovery_rate: dec!(0.4),
            payment_frequency: 4,
        }
    }

    #[test]
    fn test_cds_from_contract_spread() {
        let result = analyze_cds(&CdsAnalysisInput {
            contract: contract(),
            discount_curve: curve(),
            default_curve: None,
            hazard_rate: None,
            quotes: vec![],
            running_spread: Some(BasisPoints::new(dec!(100))),
        })
        .unwrap();
        let out = &result.result;
        // Implied from its own spread the contract is close to fair
        assert!((out.valuation.fair_spread.value() - dec!(120)).abs() < dec!(1));
        assert!(out.upfront.unwrap() > Decimal::ZERO);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_cds_from_hazard_rate() {
        let out = analyze_cds(&CdsAnalysisInput {
            contract: contract(),
            discount_curve: curve(),
            default_curve: None,
            hazard_rate: Some(dec!(0.02)),
            quotes: vec![],
            running_spread: None,
        })
        .unwrap()
        .result;
        assert_eq!(out.default_curve.tenors.len(), 5);
        assert!((out.implied_hazard_rate - dec!(0.02)).abs() < dec!(0.0002));
    }

    #[test]
    fn test_bond_spreads_envelope() {
        let input = SpreadAnalysisInput {
            instrument: Instrument::FixedRate(BondTerms {
                face_value: dec!(100),
                coupon_rate: dec!(0.05),
                maturity_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                frequency: 1,
                day_count: DayCountConvention::Thirty360,
            }),
            settlement_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            clean_price: dec!(100),
            curve: curve(),
            cds_spread: Some(BasisPoints::new(dec!(150))),
            option_factor: None,
        };
        let out = analyze_bond_spreads(&input).unwrap().result;
        // Par 5% bond over a flat 3% curve: 200bp on every measure
        assert!((out.z_spread.value() - dec!(200)).abs() < dec!(0.01));
        assert!((out.i_spread.value() - dec!(200)).abs() < dec!(0.01));
        assert!((out.cds_basis.unwrap().value() - dec!(-50)).abs() < dec!(0.01));
    }

    #[test]
    fn test_cds_rejects_duplicate_tenors() {
        let result = analyze_cds(&CdsAnalysisInput {
            contract: contract(),
            discount_curve: curve(),
            default_curve: Some(DefaultCurve {
                tenors: vec![dec!(1), dec!(1)],
                cumulative: vec![dec!(0.01), dec!(0.02)],
                marginal: vec![dec!(0.01), dec!(0.01)],
            }),
            hazard_rate: None,
            quotes: vec![],
            running_spread: None,
        });
        match result.unwrap_err() {
            CreditEngineError::InvalidInput { field, .. } => assert_eq!(field, "tenors"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
