use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Probabilities in [0, 1]
pub type Probability = Decimal;

/// A quantity quoted in basis points (100bp = 1%).
///
/// Kept distinct from [`Rate`] and [`Percentage`] so a spread in bps can
/// never be added to a decimal rate without an explicit conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasisPoints(pub Decimal);

impl BasisPoints {
    pub fn new(value: Decimal) -> Self {
        BasisPoints(value)
    }

    pub fn from_rate(rate: Rate) -> Self {
        BasisPoints(rate * dec!(10000))
    }

    pub fn to_rate(self) -> Rate {
        self.0 / dec!(10000)
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}

/// A quantity quoted in percent (5 = 5%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(pub Decimal);

impl Percentage {
    pub fn new(value: Decimal) -> Self {
        Percentage(value)
    }

    pub fn from_rate(rate: Rate) -> Self {
        Percentage(rate * dec!(100))
    }

    pub fn to_rate(self) -> Rate {
        self.0 / dec!(100)
    }

    pub fn to_basis_points(self) -> BasisPoints {
        BasisPoints(self.0 * dec!(100))
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_points_round_trip_to_rate() {
        let bp = BasisPoints::new(dec!(125));
        assert_eq!(bp.to_rate(), dec!(0.0125));
        assert_eq!(BasisPoints::from_rate(dec!(0.0125)), bp);
    }

    #[test]
    fn test_percentage_conversions() {
        let pct = Percentage::new(dec!(4.5));
        assert_eq!(pct.to_rate(), dec!(0.045));
        assert_eq!(pct.to_basis_points(), BasisPoints::new(dec!(450)));
        assert_eq!(Percentage::from_rate(dec!(0.045)), pct);
    }

    #[test]
    fn test_basis_points_serialize_transparently() {
        let json = serde_json::to_string(&BasisPoints::new(dec!(100))).unwrap();
        assert_eq!(json, "\"100\"");
    }
}
