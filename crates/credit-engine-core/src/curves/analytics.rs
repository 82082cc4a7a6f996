use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::bootstrap::{bootstrap_curve, BootstrapBond};
use super::forward::{forward_curve, ForwardSegment};
use super::parametric::{fit_nelson_siegel, nelson_siegel_curve, NelsonSiegelParameters, ParametricFit};
use super::yield_curve::{CurveMethod, YieldCurve, YieldCurvePoint};
use crate::error::CreditEngineError;
use crate::types::{with_metadata, ComputationOutput, Years};
use crate::CreditEngineResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveBuildInput {
    pub method: CurveMethod,
    /// Observed zero rates (linear, cubic spline, Nelson-Siegel)
    #[serde(default)]
    pub points: Vec<YieldCurvePoint>,
    /// Bond quotes (bootstrap)
    #[serde(default)]
    pub bonds: Vec<BootstrapBond>,
    /// Nelson-Siegel decay; defaults to 2.0
    #[serde(default)]
    pub lambda: Option<Decimal>,
    /// Maturities to report; defaults to the curve nodes
    #[serde(default)]
    pub output_maturities: Vec<Years>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveSample {
    pub maturity: Years,
    pub zero_rate: Decimal,
    pub discount_factor: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveBuildOutput {
    pub curve: YieldCurve,
    pub samples: Vec<CurveSample>,
    pub forwards: Vec<ForwardSegment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nelson_siegel: Option<ParametricFit<NelsonSiegelParameters>>,
}

pub fn build_yield_curve(input: &CurveBuildInput) -> CreditEngineResult<ComputationOutput<CurveBuildOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut nelson_siegel = None;
    let curve = match input.method {
        CurveMethod::Bootstrap => bootstrap_curve(&input.bonds)?,
        CurveMethod::NelsonSiegel => {
            let fit = fit_nelson_siegel(&input.points, input.lambda)?;
            let maturities: Vec<Years> = input.points.iter().map(|p| p.maturity).collect();
            let curve = nelson_siegel_curve(&fit.parameters, &maturities)?;
            nelson_siegel = Some(fit);
            curve
        }
        CurveMethod::Linear | CurveMethod::CubicSpline => YieldCurve::new(input.points.clone(), input.method)?,
    };

    if input.method != CurveMethod::Bootstrap && !input.bonds.is_empty() {
        warnings.push("Bond quotes are only used by the bootstrap method; ignored".into());
    }
    if curve.points.iter().any(|p| p.rate < Decimal::ZERO) {
        warnings.push("Curve contains negative zero rates".into());
    }

    let maturities = if input.output_maturities.is_empty() {
        curve.maturities()
    } else {
        input.output_maturities.clone()
    };
    if let Some(m) = maturities.iter().find(|m| **m <= Decimal::ZERO) {
        return Err(CreditEngineError::invalid_input(
            "output_maturities",
            format!("maturity {m} must be positive"),
        ));
    }
    let samples = maturities
        .iter()
        .map(|&m| CurveSample {
            maturity: m,
            zero_rate: curve.rate_at(m),
            discount_factor: curve.discount_factor(m),
        })
        .collect();

    let output = CurveBuildOutput {
        forwards: forward_curve(&curve)?,
        curve,
        samples,
        nelson_siegel,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Zero curve construction (annual compounding)",
        &serde_json::json!({
            "method": input.method,
            "lambda": input.lambda,
        }),
        warnings,
        elapsed,
        output,
    ))
}
