//! Exposure profiles from scenario matrices.
//!
//! `scenarios[s][t]` is the mark-to-market of the netting set in scenario
//! `s` at grid point `t`. Positive values are owed to us.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CreditEngineError;
use crate::math::percentile;
use crate::types::{Money, Probability, Years};
use crate::CreditEngineResult;

/// PFE confidence when none is given.
pub const DEFAULT_PFE_PERCENTILE: Decimal = dec!(0.95);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureProfile {
    pub time_grid: Vec<Years>,
    /// Mean of max(V, 0) per grid point
    pub expected_exposure: Vec<Money>,
    /// Mean of max(−V, 0) per grid point, as a positive amount
    pub expected_negative_exposure: Vec<Money>,
    pub potential_future_exposure: Vec<Money>,
    pub percentile: Decimal,
    /// Time-weighted average of EE over the grid
    pub expected_positive_exposure: Money,
    pub max_pfe: Money,
}

pub fn build_exposure_profile(
    time_grid: &[Years],
    scenarios: &[Vec<Money>],
    pfe_percentile: Option<Decimal>,
) -> CreditEngineResult<ExposureProfile> {
    check_time_grid(time_grid)?;
    if scenarios.is_empty() {
        return Err(CreditEngineError::InsufficientData("no exposure scenarios".into()));
    }
    for path in scenarios {
        if path.len() != time_grid.len() {
            return Err(CreditEngineError::dimension_mismatch(
                "exposure scenario",
                time_grid.len(),
                path.len(),
            ));
        }
    }
    let pct = pfe_percentile.unwrap_or(DEFAULT_PFE_PERCENTILE);
    let n = Decimal::from(scenarios.len());

    let mut ee = Vec::with_capacity(time_grid.len());
    let mut ene = Vec::with_capacity(time_grid.len());
    let mut pfe = Vec::with_capacity(time_grid.len());
    for t in 0..time_grid.len() {
        let positive: Vec<Money> = scenarios.iter().map(|s| s[t].max(Decimal::ZERO)).collect();
        let negative: Money = scenarios.iter().map(|s| (-s[t]).max(Decimal::ZERO)).sum();
        ee.push(positive.iter().sum::<Money>() / n);
        ene.push(negative / n);
        pfe.push(percentile(&positive, pct)?);
    }

    let epe = time_weighted_average(time_grid, &ee);
    let max_pfe = pfe.iter().copied().fold(Decimal::ZERO, Decimal::max);

    Ok(ExposureProfile {
        time_grid: time_grid.to_vec(),
        expected_exposure: ee,
        expected_negative_exposure: ene,
        potential_future_exposure: pfe,
        percentile: pct,
        expected_positive_exposure: epe,
        max_pfe,
    })
}

/// `Σ EE_i × marginal PD_i`.
pub fn exposure_at_default(expected_exposure: &[Money], marginal_pd: &[Probability]) -> CreditEngineResult<Money> {
    if expected_exposure.len() != marginal_pd.len() {
        return Err(CreditEngineError::dimension_mismatch(
            "exposure at default",
            expected_exposure.len(),
            marginal_pd.len(),
        ));
    }
    Ok(expected_exposure.iter().zip(marginal_pd).map(|(e, p)| *e * *p).sum())
}

pub(crate) fn check_time_grid(time_grid: &[Years]) -> CreditEngineResult<()> {
    if time_grid.is_empty() {
        return Err(CreditEngineError::InsufficientData("empty time grid".into()));
    }
    if time_grid[0] <= Decimal::ZERO || time_grid.windows(2).any(|w| w[1] <= w[0]) {
        return Err(CreditEngineError::invalid_input(
            "time_grid",
            "must be positive and strictly increasing",
        ));
    }
    Ok(())
}

fn time_weighted_average(time_grid: &[Years], values: &[Money]) -> Money {
    let mut prev = Decimal::ZERO;
    let mut area = Decimal::ZERO;
    for (t, v) in time_grid.iter().zip(values) {
        area += *v * (*t - prev);
        prev = *t;
    }
    area / prev
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<Years> {
        vec![dec!(0.5), dec!(1), dec!(2)]
    }

    fn paths() -> Vec<Vec<Money>> {
        vec![
            vec![dec!(10), dec!(20), dec!(-5)],
            vec![dec!(-10), dec!(0), dec!(15)],
            vec![dec!(30), dec!(40), dec!(25)],
            vec![dec!(0), dec!(-20), dec!(5)],
        ]
    }

    #[test]
    fn test_expected_exposures() {
        let profile = build_exposure_profile(&grid(), &paths(), None).unwrap();
        assert_eq!(profile.expected_exposure, vec![dec!(10), dec!(15), dec!(11.25)]);
        assert_eq!(profile.expected_negative_exposure, vec![dec!(2.5), dec!(5), dec!(1.25)]);
        // (10*0.5 + 15*0.5 + 11.25*1) / 2
        assert_eq!(profile.expected_positive_exposure, dec!(11.875));
        assert_eq!(profile.percentile, dec!(0.95));
    }

    #[test]
    fn test_pfe_percentile() {
        let profile = build_exposure_profile(&grid(), &paths(), Some(dec!(1))).unwrap();
        assert_eq!(profile.potential_future_exposure, vec![dec!(30), dec!(40), dec!(25)]);
        assert_eq!(profile.max_pfe, dec!(40));
        let median = build_exposure_profile(&grid(), &paths(), Some(dec!(0.5))).unwrap();
        // Positive parts at t=1: 0, 0, 20, 40 -> median 10
        assert_eq!(median.potential_future_exposure[1], dec!(10));
    }

    #[test]
    fn test_ragged_scenarios_rejected() {
        let mut p = paths();
        p[2].pop();
        match build_exposure_profile(&grid(), &p, None).unwrap_err() {
            CreditEngineError::DimensionMismatch { expected, actual, .. } => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("Expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_exposure_at_default() {
        let ead = exposure_at_default(&[dec!(100), dec!(200)], &[dec!(0.01), dec!(0.02)]).unwrap();
        assert_eq!(ead, dec!(5));
        assert!(exposure_at_default(&[dec!(100)], &[]).is_err());
    }
}
