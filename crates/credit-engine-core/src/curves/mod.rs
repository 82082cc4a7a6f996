//! Yield curve construction: bootstrap, Nelson-Siegel/Svensson fits,
//! interpolation and forward rates.

pub mod analytics;
pub mod bootstrap;
pub mod forward;
pub mod parametric;
pub mod yield_curve;

pub use analytics::{build_yield_curve, CurveBuildInput, CurveBuildOutput, CurveSample};
pub use bootstrap::{bootstrap_curve, BootstrapBond};
pub use forward::{forward_curve, forward_rate, spot_rate_from_forward, ForwardSegment};
pub use parametric::{
    evaluate_nelson_siegel, evaluate_svensson, fit_nelson_siegel, fit_svensson, nelson_siegel_curve,
    NelsonSiegelParameters, ParametricFit, SvenssonParameters,
};
pub use yield_curve::{cubic_spline_interpolation, linear_interpolation, CurveMethod, YieldCurve, YieldCurvePoint};
