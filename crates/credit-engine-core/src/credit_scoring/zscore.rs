//! Balance-sheet credit scoring: Altman Z, a 0-1000 composite score and
//! the score-to-rating ladder.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CreditEngineError;
use crate::types::Money;
use crate::CreditEngineResult;

// ---------------------------------------------------------------------------
// Coefficients
// ---------------------------------------------------------------------------

const Z_COEFF_X1: Decimal = dec!(1.2);
const Z_COEFF_X2: Decimal = dec!(1.4);
const Z_COEFF_X3: Decimal = dec!(3.3);
const Z_COEFF_X4: Decimal = dec!(0.6);
const Z_COEFF_X5: Decimal = dec!(1.0);

const Z_SAFE: Decimal = dec!(2.99);
const Z_DISTRESS: Decimal = dec!(1.81);

/// Cap of each composite sub-score.
const SUB_SCORE_CAP: Decimal = dec!(250);

/// Current ratio that earns the full liquidity score.
const FULL_LIQUIDITY_RATIO: Decimal = dec!(2);
/// Debt/equity at which the leverage score reaches zero.
const MAX_LEVERAGE: Decimal = dec!(4);
/// Return on assets that earns the full profitability score.
const FULL_ROA: Decimal = dec!(0.15);
/// Z-score that earns the full Z sub-score.
const FULL_Z: Decimal = dec!(3);

/// Width of each rating bucket on the 0-1000 scale.
const RATING_STEP: Decimal = dec!(45);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltmanInput {
    pub working_capital: Money,
    pub retained_earnings: Money,
    pub ebit: Money,
    pub market_value_equity: Money,
    pub revenue: Money,
    pub total_assets: Money,
    pub total_liabilities: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZScoreZone {
    Safe,
    Grey,
    Distress,
}

impl std::fmt::Display for ZScoreZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Grey => write!(f, "Grey Zone"),
            Self::Distress => write!(f, "Distress"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltmanResult {
    pub z_score: Decimal,
    pub zone: ZScoreZone,
    /// X1..X5 ratios before weighting
    pub ratios: [Decimal; 5],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeScoreInput {
    pub current_assets: Money,
    pub current_liabilities: Money,
    pub total_debt: Money,
    pub total_equity: Money,
    pub net_income: Money,
    pub total_assets: Money,
    pub z_score: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeScore {
    pub liquidity: Decimal,
    pub leverage: Decimal,
    pub profitability: Decimal,
    pub z_score: Decimal,
    /// Sum of the four sub-scores, 0-1000
    pub total: Decimal,
}

/// Letter ratings from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CreditRating {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA+")]
    AaPlus,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AA-")]
    AaMinus,
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "BBB+")]
    BbbPlus,
    #[serde(rename = "BBB")]
    Bbb,
    #[serde(rename = "BBB-")]
    BbbMinus,
    #[serde(rename = "BB+")]
    BbPlus,
    #[serde(rename = "BB")]
    Bb,
    #[serde(rename = "BB-")]
    BbMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "CCC+")]
    CccPlus,
    #[serde(rename = "CCC")]
    Ccc,
    #[serde(rename = "CCC-")]
    CccMinus,
    #[serde(rename = "CC")]
    Cc,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
}

impl CreditRating {
    pub const ALL: [CreditRating; 22] = [
        Self::Aaa,
        Self::AaPlus,
        Self::Aa,
        Self::AaMinus,
        Self::APlus,
        Self::A,
        Self::AMinus,
        Self::BbbPlus,
        Self::Bbb,
        Self::BbbMinus,
        Self::BbPlus,
        Self::Bb,
        Self::BbMinus,
        Self::BPlus,
        Self::B,
        Self::BMinus,
        Self::CccPlus,
        Self::Ccc,
        Self::CccMinus,
        Self::Cc,
        Self::C,
        Self::D,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Aaa => "AAA",
            Self::AaPlus => "AA+",
            Self::Aa => "AA",
            Self::AaMinus => "AA-",
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BbbPlus => "BBB+",
            Self::Bbb => "BBB",
            Self::BbbMinus => "BBB-",
            Self::BbPlus => "BB+",
            Self::Bb => "BB",
            Self::BbMinus => "BB-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CccPlus => "CCC+",
            Self::Ccc => "CCC",
            Self::CccMinus => "CCC-",
            Self::Cc => "CC",
            Self::C => "C",
            Self::D => "D",
        }
    }

    pub fn is_investment_grade(&self) -> bool {
        *self <= Self::BbbMinus
    }
}

impl std::fmt::Display for CreditRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Original Altman Z for public manufacturers.
pub fn altman_z_score(input: &AltmanInput) -> CreditEngineResult<AltmanResult> {
    if input.total_assets <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("total_assets", "must be positive"));
    }
    if input.total_liabilities <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input(
            "total_liabilities",
            "must be positive for the market value of equity ratio",
        ));
    }

    let ta = input.total_assets;
    let ratios = [
        input.working_capital / ta,
        input.retained_earnings / ta,
        input.ebit / ta,
        input.market_value_equity / input.total_liabilities,
        input.revenue / ta,
    ];
    let z = Z_COEFF_X1 * ratios[0]
        + Z_COEFF_X2 * ratios[1]
        + Z_COEFF_X3 * ratios[2]
        + Z_COEFF_X4 * ratios[3]
        + Z_COEFF_X5 * ratios[4];

    Ok(AltmanResult { z_score: z, zone: zone_for(z), ratios })
}

pub fn zone_for(z: Decimal) -> ZScoreZone {
    if z >= Z_SAFE {
        ZScoreZone::Safe
    } else if z < Z_DISTRESS {
        ZScoreZone::Distress
    } else {
        ZScoreZone::Grey
    }
}

/// Four sub-scores, each clamped to [0, 250], summed to 0-1000.
///
/// No current liabilities earns full liquidity; non-positive equity
/// earns zero leverage score.
pub fn composite_credit_score(input: &CompositeScoreInput) -> CreditEngineResult<CompositeScore> {
    if input.total_assets <= Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("total_assets", "must be positive"));
    }
    if input.current_assets < Decimal::ZERO || input.current_liabilities < Decimal::ZERO {
        return Err(CreditEngineError::invalid_input(
            "current_assets",
            "current assets and liabilities must be non-negative",
        ));
    }
    if input.total_debt < Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("total_debt", "must be non-negative"));
    }

    let liquidity = if input.current_liabilities.is_zero() {
        SUB_SCORE_CAP
    } else {
        cap(input.current_assets / input.current_liabilities / FULL_LIQUIDITY_RATIO * SUB_SCORE_CAP)
    };

    let leverage = if input.total_equity <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        let de = input.total_debt / input.total_equity;
        cap(SUB_SCORE_CAP * (Decimal::ONE - de / MAX_LEVERAGE))
    };

    let roa = input.net_income / input.total_assets;
    let profitability = cap(roa / FULL_ROA * SUB_SCORE_CAP);
    let z_score = cap(input.z_score / FULL_Z * SUB_SCORE_CAP);

    Ok(CompositeScore {
        liquidity,
        leverage,
        profitability,
        z_score,
        total: liquidity + leverage + profitability + z_score,
    })
}

/// 22 buckets of width 45: AAA from 945, down to C from 45; D below.
pub fn rating_from_score(score: Decimal) -> CreditRating {
    let mut threshold = dec!(945);
    for rating in CreditRating::ALL.iter().take(21) {
        if score >= threshold {
            return *rating;
        }
        threshold -= RATING_STEP;
    }
    CreditRating::D
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn cap(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(SUB_SCORE_CAP)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> AltmanInput {
        AltmanInput {
            working_capital: dec!(250),
            retained_earnings: dec!(300),
            ebit: dec!(150),
            market_value_equity: dec!(1200),
            revenue: dec!(1100),
            total_assets: dec!(1000),
            total_liabilities: dec!(400),
        }
    }

    #[test]
    fn test_z_score_weights() {
        let result = altman_z_score(&healthy()).unwrap();
        // 1.2*0.25 + 1.4*0.3 + 3.3*0.15 + 0.6*3 + 1.0*1.1
        assert_eq!(result.z_score, dec!(4.115));
        assert_eq!(result.zone, ZScoreZone::Safe);
    }

    #[test]
    fn test_zone_boundaries() {
        assert_eq!(zone_for(dec!(2.99)), ZScoreZone::Safe);
        assert_eq!(zone_for(dec!(2.98)), ZScoreZone::Grey);
        assert_eq!(zone_for(dec!(1.81)), ZScoreZone::Grey);
        assert_eq!(zone_for(dec!(1.80)), ZScoreZone::Distress);
    }

    #[test]
    fn test_zero_assets_rejected() {
        let mut input = healthy();
        input.total_assets = Decimal::ZERO;
        match altman_z_score(&input).unwrap_err() {
            CreditEngineError::InvalidInput { field, .. } => assert_eq!(field, "total_assets"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_composite_sub_scores_capped() {
        let score = composite_credit_score(&CompositeScoreInput {
            current_assets: dec!(500),
            current_liabilities: dec!(100),
            total_debt: dec!(900),
            total_equity: dec!(100),
            net_income: dec!(-50),
            total_assets: dec!(1000),
            z_score: dec!(6),
        })
        .unwrap();
        assert_eq!(score.liquidity, dec!(250));
        assert_eq!(score.leverage, Decimal::ZERO);
        assert_eq!(score.profitability, Decimal::ZERO);
        assert_eq!(score.z_score, dec!(250));
        assert_eq!(score.total, dec!(500));
    }

    #[test]
    fn test_composite_midrange() {
        let score = composite_credit_score(&CompositeScoreInput {
            current_assets: dec!(150),
            current_liabilities: dec!(100),
            total_debt: dec!(200),
            total_equity: dec!(200),
            net_income: dec!(75),
            total_assets: dec!(1000),
            z_score: dec!(1.5),
        })
        .unwrap();
        assert_eq!(score.liquidity, dec!(187.5));
        assert_eq!(score.leverage, dec!(187.5));
        assert_eq!(score.profitability, dec!(125));
        assert_eq!(score.z_score, dec!(125));
        assert_eq!(score.total, dec!(625));
    }

    #[test]
    fn test_rating_ladder() {
        assert_eq!(rating_from_score(dec!(1000)), CreditRating::Aaa);
        assert_eq!(rating_from_score(dec!(945)), CreditRating::Aaa);
        assert_eq!(rating_from_score(dec!(944.99)), CreditRating::AaPlus);
        assert_eq!(rating_from_score(dec!(625)), CreditRating::Bbb);
        assert_eq!(rating_from_score(dec!(540)), CreditRating::BbbMinus);
        assert_eq!(rating_from_score(dec!(539)), CreditRating::BbPlus);
        assert_eq!(rating_from_score(dec!(45)), CreditRating::C);
        assert_eq!(rating_from_score(dec!(44)), CreditRating::D);
        assert_eq!(rating_from_score(Decimal::ZERO), CreditRating::D);
    }

    #[test]
    fn test_rating_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&CreditRating::BbbMinus).unwrap();
        assert_eq!(json, "\"BBB-\"");
        let back: CreditRating = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CreditRating::BbbMinus);
        assert!(CreditRating::BbbMinus.is_investment_grade());
        assert!(!CreditRating::BbPlus.is_investment_grade());
    }
}
