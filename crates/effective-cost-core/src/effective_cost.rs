//! Validated effective total cost computation.
//!
//! Wraps the rate solver with input validation, warnings, the dated
//! installment schedule, and the standard computation envelope.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::EffectiveCostError;
use crate::solver::{
    self, DiscountSchedule, RateResult, ScheduleEntry, SearchOutcome, SolverConfig,
};
use crate::types::{with_metadata, ComputationOutput, Money, ScheduleTiming};
use crate::EffectiveCostResult;

/// Schedules longer than this (50 years of monthly installments) get a warning.
const LONG_SCHEDULE_INSTALLMENTS: u32 = 600;

/// Upper limit on installments accepted for a loan (100 years of monthly payments).
pub const MAX_INSTALLMENT_COUNT: u32 = 1_200;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Amounts of a fixed-installment loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    /// Amount actually released to the borrower, net of upfront fees.
    pub principal: Money,
    /// Fixed amount of each installment.
    pub installment_amount: Money,
    /// Number of installments.
    pub installment_count: u32,
}

impl LoanInput {
    pub fn validate(&self) -> EffectiveCostResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(EffectiveCostError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if self.installment_amount <= Decimal::ZERO {
            return Err(EffectiveCostError::InvalidInput {
                field: "installment_amount".into(),
                reason: "Installment amount must be positive".into(),
            });
        }
        if self.installment_count == 0 {
            return Err(EffectiveCostError::InvalidInput {
                field: "installment_count".into(),
                reason: "At least one installment is required".into(),
            });
        }
        if self.installment_count > MAX_INSTALLMENT_COUNT {
            return Err(EffectiveCostError::InvalidInput {
                field: "installment_count".into(),
                reason: format!("At most {MAX_INSTALLMENT_COUNT} installments are supported"),
            });
        }
        Ok(())
    }

    /// Principal and installment amount as solver inputs.
    pub fn amounts_f64(&self) -> EffectiveCostResult<(f64, f64)> {
        Ok((
            to_f64("principal", self.principal)?,
            to_f64("installment_amount", self.installment_amount)?,
        ))
    }

    /// Sum of all installments, undiscounted.
    pub fn total_installments(&self) -> Money {
        self.installment_amount * Decimal::from(self.installment_count)
    }
}

/// Effective total cost input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveCostInput {
    pub loan: LoanInput,
    /// Calendar timing; when present the annual (ACT/365) rate is computed too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<ScheduleTiming>,
    /// Overrides for the search step and ceiling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverConfig>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Effective total cost output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveCostOutput {
    /// Effective cost per installment period (percentage).
    pub monthly: RateResult,
    /// Effective cost per year over actual days, when timing was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual: Option<RateResult>,
    /// Installment amount times installment count.
    pub total_installments: Money,
    /// Total installments minus principal.
    pub implied_interest: Money,
    pub monthly_search: SearchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_search: Option<SearchOutcome>,
    /// Dated installments used by the annual rate; empty without timing.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub schedule: Vec<ScheduleEntry>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the monthly (and, given timing, annual) effective total cost.
pub fn compute_effective_cost(
    input: &EffectiveCostInput,
) -> EffectiveCostResult<ComputationOutput<EffectiveCostOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let loan = &input.loan;
    loan.validate()?;
    let config = input.solver.unwrap_or_default();
    config.validate()?;
    let (principal, installment) = loan.amounts_f64()?;

    let total_installments = loan.total_installments();
    let implied_interest = total_installments - loan.principal;

    if implied_interest.is_zero() {
        warnings.push("Installments sum exactly to the principal; implied interest is zero".into());
    }
    if loan.installment_count > LONG_SCHEDULE_INSTALLMENTS {
        warnings.push(format!(
            "{} installments is unusually long; discount factors may underflow",
            loan.installment_count
        ));
    }

    let monthly = solver::solve_monthly_with(&config, principal, installment, loan.installment_count);
    if let Some(w) = not_found_warning("Monthly", &monthly.search, &config) {
        warnings.push(w);
    }

    let mut annual = None;
    let mut annual_search = None;
    let mut schedule = Vec::new();

    if let Some(timing) = &input.timing {
        if timing.first_installment_date < timing.contract_date {
            warnings.push(format!(
                "First installment date {} precedes contract date {}",
                timing.first_installment_date, timing.contract_date
            ));
        }

        let dated = DiscountSchedule::actual_365(timing, loan.installment_count)?;
        let solution = solver::solve(&config, &dated, principal, installment);
        if let Some(w) = not_found_warning("Annual", &solution.search, &config) {
            warnings.push(w);
        }

        annual = Some(solution.result);
        annual_search = Some(solution.search);
        schedule = dated.into_entries();
    }

    let methodology = if input.timing.is_some() {
        "Effective Total Cost (CMN 3.517): periodic and ACT/365 annual"
    } else {
        "Effective Total Cost (CMN 3.517): periodic"
    };

    let output = EffectiveCostOutput {
        monthly: monthly.result,
        annual,
        total_installments,
        implied_interest,
        monthly_search: monthly.search,
        annual_search,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_f64(field: &str, value: Decimal) -> EffectiveCostResult<f64> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EffectiveCostError::InvalidInput {
            field: field.into(),
            reason: format!("{value} cannot be represented as a floating-point amount"),
        })
}

fn not_found_warning(label: &str, outcome: &SearchOutcome, config: &SolverConfig) -> Option<String> {
    match outcome {
        SearchOutcome::Converged { .. } => None,
        SearchOutcome::Exhausted { iterations, .. } => Some(format!(
            "{label} effective cost not found: rate exceeded {} after {iterations} iterations",
            config.max_rate
        )),
        SearchOutcome::BelowPrincipal { present_value } => Some(format!(
            "{label} effective cost not found: installments total {present_value} is below the principal"
        )),
    }
}
