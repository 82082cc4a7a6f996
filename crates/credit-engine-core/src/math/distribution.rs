use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::functions::decimal_exp;
use crate::error::CreditEngineError;
use crate::CreditEngineResult;

const INV_SQRT_2PI: Decimal = dec!(0.3989422804014327);

/// One-sided 95% standard normal quantile.
pub const Z_95: Decimal = dec!(1.6448536270);
/// One-sided 99% standard normal quantile.
pub const Z_99: Decimal = dec!(2.3263478740);

/// Standard normal density.
pub fn normal_pdf(x: Decimal) -> Decimal {
    INV_SQRT_2PI * decimal_exp(-(x * x) / dec!(2))
}

/// Standard normal CDF, Zelen & Severo polynomial (A&S 26.2.17).
///
/// Absolute error below 7.5e-8. Negative arguments use `Φ(x) = 1 − Φ(−x)`.
pub fn cumulative_normal(x: Decimal) -> Decimal {
    if x <= dec!(-10) {
        return Decimal::ZERO;
    }
    if x >= dec!(10) {
        return Decimal::ONE;
    }

    let abs_x = x.abs();
    let t = Decimal::ONE / (Decimal::ONE + dec!(0.2316419) * abs_x);
    let poly = t
        * (dec!(0.319381530)
            + t * (dec!(-0.356563782)
                + t * (dec!(1.781477937) + t * (dec!(-1.821255978) + t * dec!(1.330274429)))));
    let upper = Decimal::ONE - normal_pdf(abs_x) * poly;

    if x < Decimal::ZERO {
        Decimal::ONE - upper
    } else {
        upper
    }
}

/// Percentile of a sample with linear interpolation between order statistics.
pub fn percentile(values: &[Decimal], pct: Decimal) -> CreditEngineResult<Decimal> {
    if values.is_empty() {
        return Err(CreditEngineError::InsufficientData("percentile of an empty sample".into()));
    }
    if pct < Decimal::ZERO || pct > Decimal::ONE {
        return Err(CreditEngineError::invalid_input("percentile", "must be between 0 and 1"));
    }
    let mut sorted = values.to_vec();
    sorted.sort();

    let rank = pct * Decimal::from(sorted.len() - 1);
    let lower = rank.floor();
    let frac = rank - lower;
    let lo = lower.to_usize().unwrap_or(0);
    let hi = (lo + 1).min(sorted.len() - 1);
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
