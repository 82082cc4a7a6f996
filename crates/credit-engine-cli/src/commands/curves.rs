use clap::Args;
use serde_json::Value;

use credit_engine_core::curves::{self, CurveBuildInput};

use crate::input;

/// Arguments for yield curve construction
#[derive(Args)]
pub struct BuildCurveArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_build_curve(args: BuildCurveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let curve_input: CurveBuildInput = input::load(args.input.as_deref(), "curve construction")?;
    let result = curves::build_yield_curve(&curve_input)?;
    Ok(serde_json::to_value(result)?)
}
