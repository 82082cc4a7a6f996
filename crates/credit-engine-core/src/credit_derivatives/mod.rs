//! Credit default swaps and bond credit spreads.

pub mod analytics;
pub mod cds;
pub mod spreads;

pub use analytics::{
    analyze_bond_spreads, analyze_cds, CdsAnalysisInput, CdsAnalysisOutput, SpreadAnalysisInput,
    SpreadAnalysisOutput,
};
pub use cds::{
    bootstrap_cds_curve, cds_fair_spread, cds_present_value, cds_risk, cds_upfront, CdsContract, CdsQuote, CdsRisk,
    CdsValuation,
};
pub use spreads::{bond_cds_basis, cs01, i_spread, option_adjusted_spread, z_spread, OptionAdjustedSpread};
