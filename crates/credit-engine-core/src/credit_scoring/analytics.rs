use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::migration::MigrationMatrix;
use super::reduced_form::{forward_default_probability, hazard_rate_from_probability, DefaultCurve};
use super::structural::{
    black_cox_default_probability, kmv_distance_to_default, merton_distance_to_default, BlackCoxInput,
    DistanceToDefault, KmvInput, MertonInput,
};
use super::zscore::{
    altman_z_score, composite_credit_score, rating_from_score, AltmanInput, AltmanResult, CompositeScore,
    CompositeScoreInput, CreditRating,
};
use crate::error::CreditEngineError;
use crate::types::{with_metadata, ComputationOutput, Probability, Rate, Years};
use crate::CreditEngineResult;

// ---------------------------------------------------------------------------
// Credit assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationQuery {
    pub matrix: MigrationMatrix,
    pub current_rating: String,
    /// Periods for the cumulative default probability
    #[serde(default = "default_periods")]
    pub periods: u32,
}

fn default_periods() -> u32 {
    1
}

/// Any subset of the scoring models; each section present is evaluated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditAssessmentInput {
    #[serde(default)]
    pub altman: Option<AltmanInput>,
    #[serde(default)]
    pub composite: Option<CompositeScoreInput>,
    #[serde(default)]
    pub merton: Option<MertonInput>,
    #[serde(default)]
    pub kmv: Option<KmvInput>,
    #[serde(default)]
    pub black_cox: Option<BlackCoxInput>,
    #[serde(default)]
    pub migration: Option<MigrationQuery>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSummary {
    pub upgrade_probability: Probability,
    pub downgrade_probability: Probability,
    pub rating_drift: Decimal,
    pub cumulative_default_probability: Probability,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditAssessmentOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altman: Option<AltmanResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implied_rating: Option<CreditRating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merton: Option<DistanceToDefault>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kmv: Option<DistanceToDefault>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub black_cox_default_probability: Option<Probability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration: Option<MigrationSummary>,
}

pub fn assess_credit(input: &CreditAssessmentInput) -> CreditEngineResult<ComputationOutput<CreditAssessmentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let mut models: Vec<&str> = Vec::new();

    let altman = input.altman.as_ref().map(altman_z_score).transpose()?;
    if altman.is_some() {
        models.push("altman_z");
    }

    let composite = match &input.composite {
        Some(c) => {
            let mut c = c.clone();
            if let Some(a) = &altman {
                if c.z_score != a.z_score {
                    warnings.push(format!(
                        "Composite z_score {} replaced by computed Altman Z {}",
                        c.z_score, a.z_score
                    ));
                    c.z_score = a.z_score;
                }
            }
            models.push("composite_score");
            Some(composite_credit_score(&c)?)
        }
        None => None,
    };
    let implied_rating = composite.as_ref().map(|c| rating_from_score(c.total));

    let merton = input.merton.as_ref().map(merton_distance_to_default).transpose()?;
    let kmv = input.kmv.as_ref().map(kmv_distance_to_default).transpose()?;
    let black_cox = input.black_cox.as_ref().map(black_cox_default_probability).transpose()?;
    for (present, name) in [
        (merton.is_some(), "merton"),
        (kmv.is_some(), "kmv"),
        (black_cox.is_some(), "black_cox"),
    ] {
        if present {
            models.push(name);
        }
    }
    if let Some(dd) = merton.as_ref().or(kmv.as_ref()) {
        if dd.distance_to_default < Decimal::ZERO {
            warnings.push("Asset value is below the default point".into());
        }
    }

    let migration = match &input.migration {
        Some(q) => {
            q.matrix.validate()?;
            models.push("migration");
            Some(MigrationSummary {
                upgrade_probability: q.matrix.upgrade_probability(&q.current_rating)?,
                downgrade_probability: q.matrix.downgrade_probability(&q.current_rating)?,
                rating_drift: q.matrix.rating_drift(&q.current_rating)?,
                cumulative_default_probability: q
                    .matrix
                    .cumulative_default_probability(&q.current_rating, q.periods)?,
            })
        }
        None => None,
    };

    if models.is_empty() {
        return Err(CreditEngineError::InsufficientData(
            "at least one credit model section is required".into(),
        ));
    }

    let output = CreditAssessmentOutput {
        altman,
        composite,
        implied_rating,
        merton,
        kmv,
        black_cox_default_probability: black_cox,
        migration,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Balance-sheet scoring, structural distance to default and rating migration",
        &serde_json::json!({ "models": models }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Default probability term structure
// ---------------------------------------------------------------------------

/// Build a default curve from a flat hazard rate, piecewise hazards, or
/// observed cumulative PDs (exactly one).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultProbabilityInput {
    pub tenors: Vec<Years>,
    #[serde(default)]
    pub hazard_rate: Option<Rate>,
    #[serde(default)]
    pub hazard_rates: Vec<Rate>,
    #[serde(default)]
    pub cumulative: Vec<Probability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultProbabilityOutput {
    pub curve: DefaultCurve,
    /// Conditional PD for each interval given survival to its start
    pub forward_probabilities: Vec<Probability>,
    /// Flat hazard equivalent to each cumulative PD, aligned with
    /// `curve.tenors`; `None` once default is certain
    pub implied_hazard_rates: Vec<Option<Rate>>,
}

pub fn default_probability_curve(
    input: &DefaultProbabilityInput,
) -> CreditEngineResult<ComputationOutput<DefaultProbabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let tenors = input.tenors.clone();
    let (curve, source) = match (input.hazard_rate, input.hazard_rates.is_empty(), input.cumulative.is_empty()) {
        (Some(h), true, true) => (DefaultCurve::from_hazard_rate(h, tenors)?, "flat_hazard"),
        (None, false, true) => (DefaultCurve::from_hazard_rates(&input.hazard_rates, tenors)?, "piecewise_hazard"),
        (None, true, false) => (DefaultCurve::from_cumulative(tenors, input.cumulative.clone())?, "cumulative"),
        _ => {
            return Err(CreditEngineError::invalid_input(
                "hazard_rate",
                "give exactly one of hazard_rate, hazard_rates or cumulative",
            ))
        }
    };

    let mut prev = Decimal::ZERO;
    let mut forward_probabilities = Vec::with_capacity(curve.tenors.len());
    let mut implied_hazard_rates = Vec::with_capacity(curve.tenors.len());
    for (&t, &pd) in curve.tenors.iter().zip(&curve.cumulative) {
        forward_probabilities.push(forward_default_probability(prev, pd)?);
        if pd < Decimal::ONE {
            implied_hazard_rates.push(Some(hazard_rate_from_probability(pd, t)?));
        } else {
            warnings.push(format!("Certain default by {t}y; implied hazard undefined"));
            implied_hazard_rates.push(None);
        }
        prev = pd;
    }

    let output = DefaultProbabilityOutput {
        curve,
        forward_probabilities,
        implied_hazard_rates,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reduced-form default probability term structure",
        &serde_json::json!({ "source": source }),
        warnings,
        elapsed,
        output,
    ))
}
