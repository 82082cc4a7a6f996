pub mod daycount;
pub mod error;
pub mod math;
pub mod types;

#[cfg(feature = "fixed_income")]
pub mod bonds;

#[cfg(feature = "fixed_income")]
pub mod curves;

#[cfg(feature = "fixed_income")]
pub mod risk;

#[cfg(feature = "credit_scoring")]
pub mod credit_scoring;

#[cfg(feature = "credit_derivatives")]
pub mod credit_derivatives;

#[cfg(feature = "counterparty")]
pub mod exposure;

pub use error::CreditEngineError;
pub use types::*;

/// Standard result type for all credit-engine operations
pub use error::CreditEngineResult;
