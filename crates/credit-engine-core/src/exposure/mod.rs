//! Recovery rates, exposure profiles, CVA/DVA and portfolio credit loss.

pub mod analytics;
pub mod cva;
pub mod portfolio_loss;
pub mod profile;
pub mod recovery;
#[cfg(feature = "simulation")]
pub mod simulation;

pub use analytics::{
    analyze_portfolio_loss, calculate_counterparty_risk, CounterpartyRiskInput, CounterpartyRiskOutput,
    PortfolioLossInput, PortfolioLossOutput,
};
pub use cva::{
    apply_wrong_way_risk, calculate_bilateral_cva, calculate_cva, calculate_dva, collateralize_exposure,
    CollateralAgreement, CollateralizedExposure,
};
pub use portfolio_loss::{
    allocate_economic_capital, portfolio_loss_distribution, CapitalAllocation, LossDistribution, Obligor,
};
pub use profile::{build_exposure_profile, exposure_at_default, ExposureProfile, DEFAULT_PFE_PERCENTILE};
pub use recovery::{
    historical_recovery_rate, industry_average_recovery, market_implied_recovery, seniority_adjusted_recovery,
    RecoveryObservation, Seniority,
};
#[cfg(feature = "simulation")]
pub use simulation::{simulate_exposure_scenarios, ExposureSimulationConfig};
