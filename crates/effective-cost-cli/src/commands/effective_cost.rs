use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use effective_cost_core::effective_cost::{self, EffectiveCostInput, LoanInput};
use effective_cost_core::solver::{self, SolverConfig};
use effective_cost_core::types::ScheduleTiming;

use crate::input;

/// Loan amounts shared by every subcommand
#[derive(Args)]
pub struct LoanArgs {
    /// Principal released to the borrower, net of upfront fees
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Fixed installment amount
    #[arg(long, alias = "pmt")]
    pub installment: Option<Decimal>,

    /// Number of installments
    #[arg(long)]
    pub count: Option<u32>,
}

/// Solver overrides
#[derive(Args)]
pub struct SolverArgs {
    /// Rate increment per iteration (default 0.0000001)
    #[arg(long)]
    pub step: Option<f64>,

    /// Periodic rate at which the search gives up (default 10000)
    #[arg(long)]
    pub max_rate: Option<f64>,
}

/// Arguments for the monthly effective cost
#[derive(Args)]
pub struct MonthlyArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    #[command(flatten)]
    pub solver: SolverArgs,
}

/// Arguments for the annual (ACT/365) effective cost
#[derive(Args)]
pub struct AnnualArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Contract date (YYYY-MM-DD)
    #[arg(long)]
    pub contract_date: Option<NaiveDate>,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub first_installment_date: Option<NaiveDate>,

    #[command(flatten)]
    pub solver: SolverArgs,
}

/// Arguments for the full effective cost report
#[derive(Args)]
pub struct ComputeArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Contract date (YYYY-MM-DD); enables the annual rate
    #[arg(long, requires = "first_installment_date")]
    pub contract_date: Option<NaiveDate>,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long, requires = "contract_date")]
    pub first_installment_date: Option<NaiveDate>,

    #[command(flatten)]
    pub solver: SolverArgs,
}

pub fn run_monthly(args: MonthlyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_from_args(&args.loan)?;
    let config = solver_config(&args.solver)?;
    let (principal, installment) = loan.amounts_f64()?;

    let solution = solver::solve_monthly_with(&config, principal, installment, loan.installment_count);
    Ok(json!({
        "result": solution.result,
        "search": solution.search,
    }))
}

pub fn run_annual(args: AnnualArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_from_args(&args.loan)?;
    let config = solver_config(&args.solver)?;
    let timing = ScheduleTiming {
        contract_date: args
            .contract_date
            .ok_or("--contract-date is required")?,
        first_installment_date: args
            .first_installment_date
            .ok_or("--first-installment-date is required")?,
    };
    let (principal, installment) = loan.amounts_f64()?;

    let solution =
        solver::solve_annual_with(&config, principal, installment, loan.installment_count, &timing)?;
    Ok(json!({
        "result": solution.result,
        "search": solution.search,
    }))
}

pub fn run_compute(args: ComputeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cost_input: EffectiveCostInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let timing = match (args.contract_date, args.first_installment_date) {
            (Some(contract_date), Some(first_installment_date)) => Some(ScheduleTiming {
                contract_date,
                first_installment_date,
            }),
            _ => None,
        };
        EffectiveCostInput {
            loan: loan_from_args(&args.loan)?,
            timing,
            solver: solver_override(&args.solver),
        }
    };

    let result = effective_cost::compute_effective_cost(&cost_input)?;
    Ok(serde_json::to_value(result)?)
}

fn loan_from_args(args: &LoanArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    let loan = LoanInput {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        installment_amount: args
            .installment
            .ok_or("--installment is required (or provide --input)")?,
        installment_count: args
            .count
            .ok_or("--count is required (or provide --input)")?,
    };
    loan.validate()?;
    Ok(loan)
}

fn solver_override(args: &SolverArgs) -> Option<SolverConfig> {
    if args.step.is_none() && args.max_rate.is_none() {
        return None;
    }
    let defaults = SolverConfig::default();
    Some(SolverConfig {
        step: args.step.unwrap_or(defaults.step),
        max_rate: args.max_rate.unwrap_or(defaults.max_rate),
    })
}

fn solver_config(args: &SolverArgs) -> Result<SolverConfig, Box<dyn std::error::Error>> {
    let config = solver_override(args).unwrap_or_default();
    config.validate()?;
    Ok(config)
}
