use clap::Args;
use serde_json::Value;

use credit_engine_core::bonds::{self, BondPricingInput};
use credit_engine_core::risk::{self, BondRiskInput};

use crate::input;

/// Arguments for bond pricing
#[derive(Args)]
pub struct PriceBondArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_price_bond(args: PriceBondArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pricing_input: BondPricingInput = input::load(args.input.as_deref(), "bond pricing")?;
    let result = bonds::price_bond(&pricing_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for bond risk sensitivities
#[derive(Args)]
pub struct BondRiskArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_bond_risk(args: BondRiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let risk_input: BondRiskInput = input::load(args.input.as_deref(), "bond risk")?;
    let result = risk::calculate_bond_risk(&risk_input)?;
    Ok(serde_json::to_value(result)?)
}
