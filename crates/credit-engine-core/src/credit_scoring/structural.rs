//! Structural (firm-value) default models.
//!
//! Merton treats equity as a call on the firm's assets; default happens if
//! assets end below the debt at the horizon. KMV keeps the same distance
//! measure against a blended default point. Black-Cox adds a barrier that
//! can be hit at any time before the horizon.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CreditEngineError;
use crate::math::{cumulative_normal, decimal_ln, decimal_pow, decimal_sqrt};
use crate::types::{Money, Probability, Rate, Years};
use crate::CreditEngineResult;

/// Share of long-term debt in the KMV default point.
const KMV_LONG_TERM_WEIGHT: Decimal = dec!(0.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MertonInput {
    pub asset_value: Money,
    pub debt: Money,
    pub asset_volatility: Rate,
    /// Expected asset return (drift)
    pub asset_return: Rate,
    pub time_horizon: Years,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KmvInput {
    pub asset_value: Money,
    pub short_term_debt: Money,
    pub long_term_debt: Money,
    pub asset_volatility: Rate,
    pub asset_return: Rate,
    pub time_horizon: Years,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackCoxInput {
    pub asset_value: Money,
    pub barrier: Money,
    pub asset_volatility: Rate,
    pub asset_return: Rate,
    pub time_horizon: Years,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceToDefault {
    pub distance_to_default: Decimal,
    pub default_probability: Probability,
    /// Debt level the distance is measured against
    pub default_point: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// `DD = (ln(V/D) + (μ − σ²/2)T) / (σ√T)`, `PD = Φ(−DD)`.
pub fn merton_distance_to_default(input: &MertonInput) -> CreditEngineResult<DistanceToDefault> {
    check_dynamics(input.asset_value, input.asset_volatility, input.time_horizon)?;
    if input.debt <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("debt", "must be positive"));
    }
    let dd = distance(
        input.asset_value,
        input.debt,
        input.asset_return,
        input.asset_volatility,
        input.time_horizon,
    );
    Ok(DistanceToDefault {
        distance_to_default: dd,
        default_probability: cumulative_normal(-dd),
        default_point: input.debt,
    })
}

/// Merton distance against `short-term debt + 0.5 × long-term debt`.
pub fn kmv_distance_to_default(input: &KmvInput) -> CreditEngineResult<DistanceToDefault> {
    check_dynamics(input.asset_value, input.asset_volatility, input.time_horizon)?;
    if input.short_term_debt < Decimal::ZERO || input.long_term_debt < Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("short_term_debt", "debt must be non-negative"));
    }
    let default_point = input.short_term_debt + KMV_LONG_TERM_WEIGHT * input.long_term_debt;
    if default_point <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("default_point", "total debt must be positive"));
    }
    let dd = distance(
        input.asset_value,
        default_point,
        input.asset_return,
        input.asset_volatility,
        input.time_horizon,
    );
    Ok(DistanceToDefault {
        distance_to_default: dd,
        default_probability: cumulative_normal(-dd),
        default_point,
    })
}

/// First-passage probability of hitting the barrier before `T`.
///
/// `PD = Φ(h₁) + (B/V)^(2ν/σ²) Φ(h₂)` with `ν = μ − σ²/2`,
/// `h₁ = (ln(B/V) − νT)/(σ√T)` and `h₂ = (ln(B/V) + νT)/(σ√T)`.
/// A firm already at or below the barrier has PD 1.
pub fn black_cox_default_probability(input: &BlackCoxInput) -> CreditEngineResult<Probability> {
    check_dynamics(input.asset_value, input.asset_volatility, input.time_horizon)?;
    if input.barrier <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("barrier", "must be positive"));
    }
    if input.asset_value <= input.barrier {
        return Ok(Decimal::ONE);
    }

    let sigma = input.asset_volatility;
    let t = input.time_horizon;
    let nu = input.asset_return - sigma * sigma / dec!(2);
    let sig_sqrt_t = sigma * decimal_sqrt(t);
    let log_ratio = decimal_ln(input.barrier / input.asset_value);

    let h1 = (log_ratio - nu * t) / sig_sqrt_t;
    let h2 = (log_ratio + nu * t) / sig_sqrt_t;
    let reflection = decimal_pow(input.barrier / input.asset_value, dec!(2) * nu / (sigma * sigma));

    let pd = cumulative_normal(h1) + reflection * cumulative_normal(h2);
    Ok(pd.max(Decimal::ZERO).min(Decimal::ONE))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn distance(value: Money, debt: Money, drift: Rate, sigma: Rate, t: Years) -> Decimal {
    let numerator = decimal_ln(value / debt) + (drift - sigma * sigma / dec!(2)) * t;
    numerator / (sigma * decimal_sqrt(t))
}

fn check_dynamics(asset_value: Money, sigma: Rate, t: Years) -> CreditEngineResult<()> {
    if asset_value <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("asset_value", "must be positive"));
    }
    if sigma <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("asset_volatility", "must be positive"));
    }
    if t <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("time_horizon", "must be positive"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    fn merton() -> MertonInput {
        MertonInput {
            asset_value: dec!(100),
            debt: dec!(80),
            asset_volatility: dec!(0.25),
            asset_return: dec!(0.05),
            time_horizon: dec!(1),
        }
    }

    #[test]
    fn test_merton_distance() {
        let result = merton_distance_to_default(&merton()).unwrap();
        // (ln 1.25 + 0.05 - 0.03125) / 0.25 = 0.9675743
        assert!(approx_eq(result.distance_to_default, dec!(0.9675743), dec!(0.000001)));
        assert!(approx_eq(result.default_probability, dec!(0.166627), dec!(0.00001)));
    }

    #[test]
    fn test_more_leverage_raises_pd() {
        let base = merton_distance_to_default(&merton()).unwrap();
        let mut levered = merton();
        levered.debt = dec!(95);
        let worse = merton_distance_to_default(&levered).unwrap();
        assert!(worse.default_probability > base.default_probability);
    }

    #[test]
    fn test_kmv_default_point() {
        let result = kmv_distance_to_default(&KmvInput {
            asset_value: dec!(100),
            short_term_debt: dec!(60),
            long_term_debt: dec!(40),
            asset_volatility: dec!(0.25),
            asset_return: dec!(0.05),
            time_horizon: dec!(1),
        })
        .unwrap();
        assert_eq!(result.default_point, dec!(80));
        let m = merton_distance_to_default(&merton()).unwrap();
        assert_eq!(result.distance_to_default, m.distance_to_default);
    }

    #[test]
    fn test_black_cox_at_barrier_is_certain() {
        let pd = black_cox_default_probability(&BlackCoxInput {
            asset_value: dec!(70),
            barrier: dec!(70),
            asset_volatility: dec!(0.3),
            asset_return: dec!(0.05),
            time_horizon: dec!(1),
        })
        .unwrap();
        assert_eq!(pd, Decimal::ONE);
    }

    #[test]
    fn test_black_cox_exceeds_merton_terminal_pd() {
        // Hitting the barrier at any time is likelier than ending below it
        let input = BlackCoxInput {
            asset_value: dec!(100),
            barrier: dec!(80),
            asset_volatility: dec!(0.25),
            asset_return: dec!(0.05),
            time_horizon: dec!(1),
        };
        let first_passage = black_cox_default_probability(&input).unwrap();
        let terminal = merton_distance_to_default(&merton()).unwrap().default_probability;
        assert!(first_passage > terminal);
        assert!(first_passage <= Decimal::ONE);
    }

    #[test]
    fn test_zero_volatility_rejected() {
        let mut input = merton();
        input.asset_volatility = Decimal::ZERO;
        match merton_distance_to_default(&input).unwrap_err() {
            CreditEngineError::InvalidInput { field, .. } => assert_eq!(field, "asset_volatility"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
