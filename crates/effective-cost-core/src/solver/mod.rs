//! Effective total cost rate solver.
//!
//! Finds the discount rate that equates the present value of a stream of
//! fixed installments to the principal actually released to the borrower,
//! following the approximation prescribed by CMN Resolution 3.517/2007.
//!
//! Two variants share the same search and differ only in their discount
//! exponents:
//!
//! - [`solve_monthly`]: installment `j` is discounted `j` whole periods, which
//!   yields a monthly rate for monthly installments.
//! - [`solve_annual`]: installment `j` is discounted by the ACT/365 year
//!   fraction between the contract date and its due date, which yields an
//!   annual rate.
//!
//! Arithmetic runs in `f64`; only the reported percentage is a `Decimal`.

pub mod result;
pub mod schedule;
pub mod search;

pub use result::{round_percentage, RateResult, RATE_DECIMAL_PLACES};
pub use schedule::{add_months, days_between, DayCount, DiscountSchedule, ScheduleEntry};
pub use search::{present_value, search, SearchOutcome};

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::EffectiveCostError;
use crate::types::ScheduleTiming;
use crate::EffectiveCostResult;

/// Search step and ceiling for the rate solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Fixed increment added to the candidate rate every iteration.
    #[serde(default = "SolverConfig::default_step")]
    pub step: f64,
    /// Periodic rate (as a fraction) at which the search gives up.
    #[serde(default = "SolverConfig::default_max_rate")]
    pub max_rate: f64,
}

impl SolverConfig {
    pub const DEFAULT_STEP: f64 = 0.0000001;
    /// 1,000,000% per period.
    pub const DEFAULT_MAX_RATE: f64 = 10000.0;

    fn default_step() -> f64 {
        Self::DEFAULT_STEP
    }

    fn default_max_rate() -> f64 {
        Self::DEFAULT_MAX_RATE
    }

    /// Upper bound on iterations: the number of plain `step` increments
    /// needed to reach `max_rate`.
    pub fn max_step_iterations(&self) -> u64 {
        (self.max_rate / self.step).ceil() as u64
    }

    pub fn validate(&self) -> EffectiveCostResult<()> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(EffectiveCostError::InvalidInput {
                field: "solver.step".into(),
                reason: "Step must be a positive finite number".into(),
            });
        }
        if !self.max_rate.is_finite() || self.max_rate <= 0.0 {
            return Err(EffectiveCostError::InvalidInput {
                field: "solver.max_rate".into(),
                reason: "Max rate must be a positive finite number".into(),
            });
        }
        if self.step >= self.max_rate {
            return Err(EffectiveCostError::InvalidInput {
                field: "solver.step".into(),
                reason: "Step must be smaller than max rate".into(),
            });
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            step: Self::DEFAULT_STEP,
            max_rate: Self::DEFAULT_MAX_RATE,
        }
    }
}

/// A rounded result together with the raw search outcome behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub result: RateResult,
    pub search: SearchOutcome,
}

/// Monthly effective cost, as a percentage per period.
///
/// Inputs are assumed validated: `principal > 0`, `installment_amount > 0`,
/// `installment_count >= 1`.
pub fn solve_monthly(principal: f64, installment_amount: f64, installment_count: u32) -> RateResult {
    solve_monthly_with(&SolverConfig::default(), principal, installment_amount, installment_count)
        .result
}

pub fn solve_monthly_with(
    config: &SolverConfig,
    principal: f64,
    installment_amount: f64,
    installment_count: u32,
) -> Solution {
    let schedule = DiscountSchedule::periodic(installment_count);
    solve(config, &schedule, principal, installment_amount)
}

/// Annual effective cost over actual calendar days (ACT/365), as a percentage.
///
/// Fails only when an installment date falls outside the calendar range.
pub fn solve_annual(
    principal: f64,
    installment_amount: f64,
    installment_count: u32,
    contract_date: NaiveDate,
    first_installment_date: NaiveDate,
) -> EffectiveCostResult<RateResult> {
    let timing = ScheduleTiming {
        contract_date,
        first_installment_date,
    };
    let solution = solve_annual_with(
        &SolverConfig::default(),
        principal,
        installment_amount,
        installment_count,
        &timing,
    )?;
    Ok(solution.result)
}

pub fn solve_annual_with(
    config: &SolverConfig,
    principal: f64,
    installment_amount: f64,
    installment_count: u32,
    timing: &ScheduleTiming,
) -> EffectiveCostResult<Solution> {
    let schedule = DiscountSchedule::actual_365(timing, installment_count)?;
    Ok(solve(config, &schedule, principal, installment_amount))
}

/// Run the search over an arbitrary schedule and round the result.
pub fn solve(
    config: &SolverConfig,
    schedule: &DiscountSchedule,
    principal: f64,
    installment_amount: f64,
) -> Solution {
    let outcome = search(config, schedule, principal, installment_amount);

    let result = match outcome {
        SearchOutcome::Converged {
            periodic_rate,
            iterations,
            ..
        } => {
            debug!(
                "effective cost converged after {iterations} iterations at periodic rate {periodic_rate}"
            );
            RateResult::from_periodic_rate(periodic_rate)
        }
        SearchOutcome::Exhausted {
            last_rate,
            iterations,
        } => {
            warn!(
                "effective cost search stopped without converging after {iterations} iterations (last rate {last_rate}, step {}, max rate {})",
                config.step, config.max_rate
            );
            RateResult::NotFound
        }
        SearchOutcome::BelowPrincipal { present_value } => {
            debug!(
                "installment total {present_value} is below principal {principal}; no non-negative rate exists"
            );
            RateResult::NotFound
        }
    };

    Solution {
        result,
        search: outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_known_answer() {
        assert_eq!(solve_monthly(9000.0, 1000.0, 10), RateResult::Found { rate: dec!(1.963) });
    }

    #[test]
    fn test_monthly_single_installment() {
        // 1000 now against 1100 in one period is exactly 10%.
        assert_eq!(solve_monthly(1000.0, 1100.0, 1), RateResult::Found { rate: dec!(10.000) });
    }

    #[test]
    fn test_monthly_zero_interest() {
        let result = solve_monthly(10_000.0, 1000.0, 10);
        assert_eq!(result.rate().unwrap().to_string(), "0.000");
    }

    #[test]
    fn test_monthly_not_found() {
        assert_eq!(solve_monthly(1_000_000.0, 0.01, 1), RateResult::NotFound);
        assert_eq!(solve_monthly(1.0, 1e9, 1), RateResult::NotFound);
    }

    #[test]
    fn test_annual_known_answer() {
        let result = solve_annual(9000.0, 1000.0, 10, date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(result, RateResult::Found { rate: dec!(26.457) });
    }

    #[test]
    fn test_annual_one_year_gap_matches_periodic() {
        // 365 days in a non-leap year is exactly one ACT/365 year.
        let result = solve_annual(1000.0, 1100.0, 1, date(2023, 1, 1), date(2024, 1, 1)).unwrap();
        assert_eq!(result, RateResult::Found { rate: dec!(10.000) });
    }

    #[test]
    fn test_annual_calendar_overflow() {
        let result = solve_annual(1000.0, 100.0, 12, date(2024, 1, 1), NaiveDate::MAX);
        assert!(matches!(result, Err(EffectiveCostError::DateError(_))));
    }

    #[test]
    fn test_small_ceiling_forces_not_found() {
        let config = SolverConfig {
            step: 0.0000001,
            max_rate: 0.01,
        };
        let solution = solve_monthly_with(&config, 9000.0, 1000.0, 10);
        assert_eq!(solution.result, RateResult::NotFound);
        assert!(matches!(solution.search, SearchOutcome::Exhausted { .. }));
    }

    #[test]
    fn test_config_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.step, 1e-7);
        assert_eq!(config.max_rate, 10_000.0);
        assert!(config.validate().is_ok());
        assert_eq!(config.max_step_iterations(), 100_000_000_000);
    }

    #[test]
    fn test_config_validation() {
        let zero_step = SolverConfig {
            step: 0.0,
            max_rate: 1.0,
        };
        assert!(zero_step.validate().is_err());

        let inverted = SolverConfig {
            step: 2.0,
            max_rate: 1.0,
        };
        assert!(inverted.validate().is_err());

        let infinite = SolverConfig {
            step: 1e-7,
            max_rate: f64::INFINITY,
        };
        assert!(infinite.validate().is_err());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: SolverConfig = serde_json::from_str(r#"{"max_rate": 5.0}"#).unwrap();
        assert_eq!(config.step, SolverConfig::DEFAULT_STEP);
        assert_eq!(config.max_rate, 5.0);
    }
}
