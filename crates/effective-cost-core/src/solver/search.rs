//! The rate search shared by every day-count convention.
//!
//! Starting from a zero rate, each iteration discounts the installment stream,
//! nudges the candidate by `step`, and then either stops (the discounted total
//! no longer exceeds the principal) or scales the candidate by
//! `present_value / principal`. The present value used for the stopping test
//! is the one computed *before* the nudge, and the returned rate is the one
//! *after* it.
//!
//! The candidate never decreases: the nudge is positive and the scale factor
//! is above one whenever the loop continues. The loop stops as `Exhausted`
//! once the candidate reaches `max_rate` or after `max_rate / step`
//! iterations, whichever comes first. A config that fails
//! [`SolverConfig::validate`] is exhausted before the first iteration.

use serde::{Deserialize, Serialize};

use super::schedule::DiscountSchedule;
use super::SolverConfig;

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// The discounted stream fell to or below the principal.
    Converged {
        /// Periodic rate as a fraction, before rounding.
        periodic_rate: f64,
        /// Present value computed at the rate preceding the final nudge.
        present_value: f64,
        iterations: u64,
    },
    /// The candidate reached `max_rate` (or stopped being finite).
    Exhausted { last_rate: f64, iterations: u64 },
    /// The undiscounted installments are already below the principal, so no
    /// non-negative rate can reproduce it.
    BelowPrincipal { present_value: f64 },
}

impl SearchOutcome {
    pub fn periodic_rate(&self) -> Option<f64> {
        match self {
            SearchOutcome::Converged { periodic_rate, .. } => Some(*periodic_rate),
            _ => None,
        }
    }

    pub fn iterations(&self) -> u64 {
        match self {
            SearchOutcome::Converged { iterations, .. }
            | SearchOutcome::Exhausted { iterations, .. } => *iterations,
            SearchOutcome::BelowPrincipal { .. } => 1,
        }
    }
}

/// Present value of `installment` paid once per schedule entry, discounted at `rate`.
pub fn present_value(installment: f64, schedule: &DiscountSchedule, rate: f64) -> f64 {
    let base = 1.0 + rate;
    let mut total = 0.0;
    for exponent in schedule.exponents() {
        total += installment / base.powf(exponent);
    }
    total
}

/// Search for the rate that discounts the installment stream down to `principal`.
pub fn search(
    config: &SolverConfig,
    schedule: &DiscountSchedule,
    principal: f64,
    installment: f64,
) -> SearchOutcome {
    if config.validate().is_err() {
        return SearchOutcome::Exhausted {
            last_rate: 0.0,
            iterations: 0,
        };
    }

    let max_iterations = config.max_step_iterations();
    let mut rate = 0.0_f64;
    let mut iterations = 0_u64;

    loop {
        if iterations >= max_iterations {
            return SearchOutcome::Exhausted {
                last_rate: rate,
                iterations,
            };
        }
        iterations += 1;
        let pv = present_value(installment, schedule, rate);

        if iterations == 1 && pv < principal {
            return SearchOutcome::BelowPrincipal { present_value: pv };
        }

        rate += config.step;

        if !rate.is_finite() || rate >= config.max_rate {
            return SearchOutcome::Exhausted {
                last_rate: rate,
                iterations,
            };
        }

        if pv - principal <= 0.0 {
            return SearchOutcome::Converged {
                periodic_rate: rate,
                present_value: pv,
                iterations,
            };
        }

        rate *= pv / principal;
    }
}
