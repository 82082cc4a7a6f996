use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::yield_curve::YieldCurve;
use crate::error::CreditEngineError;
use crate::math::decimal_pow;
use crate::types::{Rate, Years};
use crate::CreditEngineResult;

/// An annually compounded forward rate over `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForwardSegment {
    pub start: Years,
    pub end: Years,
    pub rate: Rate,
}

/// Forward rate between `t1` and `t2` implied by spot rates `s1`, `s2`:
/// `((1+s2)^t2 / (1+s1)^t1)^(1/(t2−t1)) − 1`.
pub fn forward_rate(s1: Rate, t1: Years, s2: Rate, t2: Years) -> CreditEngineResult<Rate> {
    if t1 < Decimal::ZERO {
        return Err(CreditEngineError::invalid_input("t1", "must be non-negative"));
    }
    if t2 <= t1 {
        return Err(CreditEngineError::invalid_input("t2", "must be greater than t1"));
    }
    check_rate("s1", s1)?;
    check_rate("s2", s2)?;

    let growth = decimal_pow(Decimal::ONE + s2, t2) / decimal_pow(Decimal::ONE + s1, t1);
    Ok(decimal_pow(growth, Decimal::ONE / (t2 - t1)) - Decimal::ONE)
}

/// Spot rate to the end of a contiguous forward path starting at zero.
pub fn spot_rate_from_forward(path: &[ForwardSegment]) -> CreditEngineResult<Rate> {
    let first = path
        .first()
        .ok_or_else(|| CreditEngineError::InsufficientData("forward path is empty".into()))?;
    if !first.start.is_zero() {
        return Err(CreditEngineError::invalid_input("path[0].start", "must start at zero"));
    }

    let mut growth = Decimal::ONE;
    let mut cursor = Decimal::ZERO;
    for (i, seg) in path.iter().enumerate() {
        if seg.start != cursor {
            return Err(CreditEngineError::invalid_input(
                &format!("path[{i}].start"),
                "segments must be contiguous",
            ));
        }
        if seg.end <= seg.start {
            return Err(CreditEngineError::invalid_input(&format!("path[{i}].end"), "must exceed start"));
        }
        check_rate(&format!("path[{i}].rate"), seg.rate)?;
        growth *= decimal_pow(Decimal::ONE + seg.rate, seg.end - seg.start);
        cursor = seg.end;
    }
    Ok(decimal_pow(growth, Decimal::ONE / cursor) - Decimal::ONE)
}

/// Forwards between consecutive curve nodes, the first running from zero.
pub fn forward_curve(curve: &YieldCurve) -> CreditEngineResult<Vec<ForwardSegment>> {
    curve.validate()?;
    let mut segments = Vec::with_capacity(curve.points.len());
    let mut prev_t = Decimal::ZERO;
    let mut prev_r = curve.points[0].rate;
    for p in &curve.points {
        let rate = if prev_t.is_zero() {
            p.rate
        } else {
            forward_rate(prev_r, prev_t, p.rate, p.maturity)?
        };
        segments.push(ForwardSegment {
            start: prev_t,
            end: p.maturity,
            rate,
        });
        prev_t = p.maturity;
        prev_r = p.rate;
    }
    Ok(segments)
}

fn check_rate(field: &str, rate: Rate) -> CreditEngineResult<()> {
    if rate <= -Decimal::ONE {
        return Err(CreditEngineError::invalid_input(field, "must be greater than -100%"));
    }
    Ok(())
}
