use clap::Args;
use serde_json::Value;

use credit_engine_core::credit_scoring::{self, CreditAssessmentInput, DefaultProbabilityInput};

use crate::input;

/// Arguments for a credit assessment
#[derive(Args)]
pub struct CreditAssessmentArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_credit_assessment(args: CreditAssessmentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assessment_input: CreditAssessmentInput = input::load(args.input.as_deref(), "credit assessment")?;
    let result = credit_scoring::assess_credit(&assessment_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a default probability term structure
#[derive(Args)]
pub struct DefaultProbabilityArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_default_probability(args: DefaultProbabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pd_input: DefaultProbabilityInput = input::load(args.input.as_deref(), "default probability")?;
    let result = credit_scoring::default_probability_curve(&pd_input)?;
    Ok(serde_json::to_value(result)?)
}
