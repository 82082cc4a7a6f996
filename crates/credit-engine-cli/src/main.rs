mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::bonds::{BondRiskArgs, PriceBondArgs};
use commands::cds::{BondSpreadsArgs, CdsArgs};
use commands::credit::{CreditAssessmentArgs, DefaultProbabilityArgs};
use commands::curves::BuildCurveArgs;
use commands::exposure::{CounterpartyRiskArgs, PortfolioLossArgs};

/// Fixed-income and credit-risk analytics
#[derive(Parser)]
#[command(
    name = "cre",
    version,
    about = "Fixed-income and credit-risk analytics",
    long_about = "A CLI for bond pricing, yield curve construction, interest rate risk, \
                  credit scoring, CDS valuation and counterparty exposure with decimal \
                  precision. Inputs are JSON documents passed with --input or piped on stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver and bootstrap diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a bond from its yield (clean/dirty price, accrued, YTM/YTC/YTW)
    PriceBond(PriceBondArgs),
    /// Duration, convexity, DV01 and key rate durations for a bond
    BondRisk(BondRiskArgs),
    /// Build a yield curve by interpolation, bootstrapping or parametric fit
    BuildCurve(BuildCurveArgs),
    /// Z-score, composite score, structural models and rating migration
    CreditAssessment(CreditAssessmentArgs),
    /// Cumulative, marginal and forward default probability term structure
    DefaultProbability(DefaultProbabilityArgs),
    /// Value a credit default swap (fair spread, MTM, upfront, spread risk)
    Cds(CdsArgs),
    /// Z-spread, I-spread, OAS, CS01 and bond-CDS basis
    BondSpreads(BondSpreadsArgs),
    /// Exposure profile, CVA, DVA and bilateral CVA for a counterparty
    CounterpartyRisk(CounterpartyRiskArgs),
    /// Portfolio loss distribution and economic capital allocation
    PortfolioLoss(PortfolioLossArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::PriceBond(args) => commands::bonds::run_price_bond(args),
        Commands::BondRisk(args) => commands::bonds::run_bond_risk(args),
        Commands::BuildCurve(args) => commands::curves::run_build_curve(args),
        Commands::CreditAssessment(args) => commands::credit::run_credit_assessment(args),
        Commands::DefaultProbability(args) => commands::credit::run_default_probability(args),
        Commands::Cds(args) => commands::cds::run_cds(args),
        Commands::BondSpreads(args) => commands::cds::run_bond_spreads(args),
        Commands::CounterpartyRisk(args) => commands::exposure::run_counterparty_risk(args),
        Commands::PortfolioLoss(args) => commands::exposure::run_portfolio_loss(args),
        Commands::Version => {
            println!("cre {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
