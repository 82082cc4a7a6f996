//! Bond instruments, price/yield conversion and yield measures.

pub mod analytics;
pub mod instrument;
pub mod pricing;
pub mod yields;

pub use analytics::{price_bond, BondPricingInput, BondPricingOutput};
pub use instrument::{
    BondTerms, CallableBond, ExerciseDate, FloatingRateTerms, Instrument, PutableBond, ZeroCouponTerms,
};
pub use pricing::{
    dirty_price, dirty_price_from_yield, price_from_curve, price_from_yield, price_with_embedded_options,
    yield_from_price, EmbeddedOptionValuation,
};
pub use yields::{
    current_yield, discount_margin, simple_yield, yield_to_call, yield_to_put, yield_to_worst, Workout,
    YieldToWorst,
};
