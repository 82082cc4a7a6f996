//! Duration, convexity, DV01 and key rate sensitivities.

pub mod analytics;
pub mod duration;

pub use analytics::{calculate_bond_risk, BondRiskInput, BondRiskOutput};
pub use duration::{
    convexity, dv01, effective_convexity, effective_duration, key_rate_duration, key_rate_durations,
    macaulay_duration, modified_duration, KeyRateDuration, DEFAULT_SHIFT,
};
