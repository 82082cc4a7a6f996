//! Transcendental functions on `Decimal`.
//!
//! `exp` and `ln` use range reduction by powers of two followed by a
//! Taylor / atanh series, which keeps every intermediate well inside the
//! 28-digit mantissa.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const LN_2: Decimal = dec!(0.6931471805599453094172321215);
const SERIES_TERMS: u32 = 40;

/// Inputs beyond this magnitude would overflow (or underflow to zero) the
/// 96-bit mantissa.
const EXP_LIMIT: Decimal = dec!(60);

/// Natural logarithm. Returns zero for non-positive input; callers validate
/// the domain before calling.
pub fn decimal_ln(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if x == Decimal::ONE {
        return Decimal::ZERO;
    }

    let mut val = x;
    let mut adjust = Decimal::ZERO;
    while val > dec!(2) {
        val /= dec!(2);
        adjust += LN_2;
    }
    while val < dec!(0.5) {
        val *= dec!(2);
        adjust -= LN_2;
    }

    // ln(v) = 2 * atanh((v - 1) / (v + 1))
    let z = (val - Decimal::ONE) / (val + Decimal::ONE);
    let z2 = z * z;
    let mut term = z;
    let mut sum = z;
    for k in 1..SERIES_TERMS {
        term *= z2;
        sum += term / Decimal::from(2 * k + 1);
    }
    dec!(2) * sum + adjust
}

/// Exponential, clamped to `[-60, 60]`.
pub fn decimal_exp(x: Decimal) -> Decimal {
    let x = x.max(-EXP_LIMIT).min(EXP_LIMIT);
    if x.is_zero() {
        return Decimal::ONE;
    }

    // exp(x) = 2^n * exp(r), 0 <= r < ln2
    let n = (x / LN_2).floor();
    let r = x - n * LN_2;

    let mut term = Decimal::ONE;
    let mut sum = Decimal::ONE;
    for i in 1..SERIES_TERMS {
        term = term * r / Decimal::from(i);
        sum += term;
        if term.is_zero() {
            break;
        }
    }

    let n = n.to_i64().unwrap_or(0);
    let mut pow2 = Decimal::ONE;
    for _ in 0..n.unsigned_abs() {
        pow2 *= dec!(2);
    }
    if n >= 0 {
        sum * pow2
    } else {
        sum / pow2
    }
}

/// Square root via Newton's method. Returns zero for non-positive input.
pub fn decimal_sqrt(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let mut guess = if x > Decimal::ONE { x / dec!(2) } else { Decimal::ONE };
    for _ in 0..100 {
        let next = (guess + x / guess) / dec!(2);
        if (next - guess).abs() < dec!(0.0000000000000001) {
            return next;
        }
        guess = next;
    }
    guess
}

/// `base^exponent` for a positive base and arbitrary real exponent.
///
/// Integer exponents are computed by repeated squaring so that ordinary
/// compounding (e.g. `(1 + y/m)^n`) is exact to the last digit.
pub fn decimal_pow(base: Decimal, exponent: Decimal) -> Decimal {
    if exponent.is_zero() {
        return Decimal::ONE;
    }
    if base == Decimal::ONE {
        return Decimal::ONE;
    }
    if base <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    if exponent.fract().is_zero() && exponent.abs() <= dec!(1000) {
        let n = exponent.abs().to_u32().unwrap_or(0);
        let positive = integer_pow(base, n);
        return if exponent > Decimal::ZERO {
            positive
        } else if positive.is_zero() {
            Decimal::ZERO
        } else {
            Decimal::ONE / positive
        };
    }

    decimal_exp(exponent * decimal_ln(base))
}

fn integer_pow(base: Decimal, mut n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let mut b = base;
    while n > 0 {
        if n & 1 == 1 {
            result = result.checked_mul(b).unwrap_or(Decimal::MAX);
        }
        n >>= 1;
        if n > 0 {
            b = b.checked_mul(b).unwrap_or(Decimal::MAX);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_exp_known_values() {
        assert_eq!(decimal_exp(Decimal::ZERO), Decimal::ONE);
        assert!(approx_eq(decimal_exp(Decimal::ONE), dec!(2.718281828459045), dec!(0.000000000001)));
        assert!(approx_eq(decimal_exp(dec!(-0.1)), dec!(0.904837418035960), dec!(0.000000000001)));
    }

    #[test]
    fn test_ln_inverts_exp() {
        for x in [dec!(0.001), dec!(0.5), dec!(1.7), dec!(42), dec!(12345.678)] {
            let back = decimal_exp(decimal_ln(x));
            assert!(approx_eq(back, x, x * dec!(0.0000000001)), "x={x} back={back}");
        }
    }

    #[test]
    fn test_ln_non_positive_is_zero() {
        assert_eq!(decimal_ln(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(decimal_ln(dec!(-3)), Decimal::ZERO);
    }

    #[test]
    fn test_sqrt() {
        assert!(approx_eq(decimal_sqrt(dec!(2)), dec!(1.414213562373095), dec!(0.000000000001)));
        assert!(approx_eq(decimal_sqrt(dec!(0.25)), dec!(0.5), dec!(0.000000000001)));
        assert!(approx_eq(decimal_sqrt(dec!(1000000)), dec!(1000), dec!(0.000000001)));
        assert_eq!(decimal_sqrt(dec!(-1)), Decimal::ZERO);
    }

    #[test]
    fn test_pow_integer_exponent_is_exact() {
        assert_eq!(decimal_pow(dec!(1.025), dec!(2)), dec!(1.050625));
        assert_eq!(decimal_pow(dec!(2), dec!(-2)), dec!(0.25));
    }

    #[test]
    fn test_pow_fractional_exponent() {
        // 1.05^2.5
        let v = decimal_pow(dec!(1.05), dec!(2.5));
        assert!(approx_eq(v, dec!(1.129726), dec!(0.000001)), "got {v}");
        // nth root
        let root = decimal_pow(dec!(27), Decimal::ONE / dec!(3));
        assert!(approx_eq(root, dec!(3), dec!(0.0000000001)));
    }
}
