use clap::Args;
use serde_json::Value;

use credit_engine_core::credit_derivatives::{self, CdsAnalysisInput, SpreadAnalysisInput};

use crate::input;

/// Arguments for CDS valuation
#[derive(Args)]
pub struct CdsArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_cds(args: CdsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cds_input: CdsAnalysisInput = input::load(args.input.as_deref(), "CDS valuation")?;
    let result = credit_derivatives::analyze_cds(&cds_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for bond spread analysis
#[derive(Args)]
pub struct BondSpreadsArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_bond_spreads(args: BondSpreadsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let spread_input: SpreadAnalysisInput = input::load(args.input.as_deref(), "bond spreads")?;
    let result = credit_derivatives::analyze_bond_spreads(&spread_input)?;
    Ok(serde_json::to_value(result)?)
}
