//! Numeric kernel shared by every analytics module.
//!
//! Everything here operates on `rust_decimal::Decimal`; there is no `f64`
//! on any pricing path.

pub mod distribution;
pub mod functions;
pub mod linalg;
pub mod solver;

pub use distribution::{cumulative_normal, normal_pdf, percentile};
pub use functions::{decimal_exp, decimal_ln, decimal_pow, decimal_sqrt};
pub use linalg::{gaussian_elimination, linear_regression};
pub use solver::{newton_raphson, SolverConfig, SolverResult};
