use clap::Args;
use serde_json::Value;

use credit_engine_core::exposure::{self, CounterpartyRiskInput, PortfolioLossInput};

use crate::input;

/// Arguments for counterparty credit risk
#[derive(Args)]
pub struct CounterpartyRiskArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_counterparty_risk(args: CounterpartyRiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cpty_input: CounterpartyRiskInput = input::load(args.input.as_deref(), "counterparty risk")?;
    let result = exposure::calculate_counterparty_risk(&cpty_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for portfolio credit loss
#[derive(Args)]
pub struct PortfolioLossArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_portfolio_loss(args: PortfolioLossArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loss_input: PortfolioLossInput = input::load(args.input.as_deref(), "portfolio loss")?;
    let result = exposure::analyze_portfolio_loss(&loss_input)?;
    Ok(serde_json::to_value(result)?)
}
