use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use effective_cost_core::effective_cost::{self, EffectiveCostInput, LoanInput};
use effective_cost_core::solver::{self, SolverConfig};
use effective_cost_core::types::ScheduleTiming;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct MonthlyRequest {
    loan: LoanInput,
    #[serde(default)]
    solver: Option<SolverConfig>,
}

#[derive(Deserialize)]
struct AnnualRequest {
    loan: LoanInput,
    contract_date: NaiveDate,
    first_installment_date: NaiveDate,
    #[serde(default)]
    solver: Option<SolverConfig>,
}

fn validated(
    loan: &LoanInput,
    solver: Option<SolverConfig>,
) -> NapiResult<(f64, f64, SolverConfig)> {
    loan.validate().map_err(to_napi_error)?;
    let config = solver.unwrap_or_default();
    config.validate().map_err(to_napi_error)?;
    let (principal, installment) = loan.amounts_f64().map_err(to_napi_error)?;
    Ok((principal, installment, config))
}

// ---------------------------------------------------------------------------
// Rate solver
// ---------------------------------------------------------------------------

#[napi]
pub fn solve_monthly(input_json: String) -> NapiResult<String> {
    let request: MonthlyRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let (principal, installment, config) = validated(&request.loan, request.solver)?;
    let solution =
        solver::solve_monthly_with(&config, principal, installment, request.loan.installment_count);
    serde_json::to_string(&solution).map_err(to_napi_error)
}

#[napi]
pub fn solve_annual(input_json: String) -> NapiResult<String> {
    let request: AnnualRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let (principal, installment, config) = validated(&request.loan, request.solver)?;
    let timing = ScheduleTiming {
        contract_date: request.contract_date,
        first_installment_date: request.first_installment_date,
    };
    let solution = solver::solve_annual_with(
        &config,
        principal,
        installment,
        request.loan.installment_count,
        &timing,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&solution).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Full report
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_effective_cost(input_json: String) -> NapiResult<String> {
    let input: EffectiveCostInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = effective_cost::compute_effective_cost(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
