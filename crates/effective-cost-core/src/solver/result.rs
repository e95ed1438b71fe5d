use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::Percentage;

/// Fractional digits of a reported rate.
pub const RATE_DECIMAL_PLACES: u32 = 3;

/// Outcome of an effective cost calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RateResult {
    /// Rate as a percentage with exactly three fractional digits.
    Found { rate: Percentage },
    /// No non-negative rate below the configured ceiling reproduces the principal.
    NotFound,
}

impl RateResult {
    /// Numeric stand-in for [`RateResult::NotFound`] expected by legacy callers.
    pub const SENTINEL: f64 = -1.0;

    /// Convert a periodic rate (0.0196 = 1.96%) into a rounded percentage.
    pub fn from_periodic_rate(periodic_rate: f64) -> Self {
        match round_percentage(periodic_rate) {
            Some(rate) => RateResult::Found { rate },
            None => RateResult::NotFound,
        }
    }

    pub fn rate(&self) -> Option<Percentage> {
        match self {
            RateResult::Found { rate } => Some(*rate),
            RateResult::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, RateResult::Found { .. })
    }

    /// The rate as an `f64`, or [`RateResult::SENTINEL`] when not found.
    pub fn to_sentinel(&self) -> f64 {
        self.rate()
            .and_then(|r| r.to_f64())
            .unwrap_or(Self::SENTINEL)
    }
}

/// `periodic_rate * 100`, rounded half-up to [`RATE_DECIMAL_PLACES`].
///
/// Rounding starts from the shortest decimal string that round-trips the
/// `f64`, not from its exact binary expansion, so 0.0005 rounds up to 0.001.
pub fn round_percentage(periodic_rate: f64) -> Option<Decimal> {
    let pct = periodic_rate * 100.0;
    if !pct.is_finite() {
        return None;
    }
    let exact = Decimal::from_str(&pct.to_string())
        .ok()
        .or_else(|| Decimal::from_f64_retain(pct))?;
    let mut rounded =
        exact.round_dp_with_strategy(RATE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(RATE_DECIMAL_PLACES);
    Some(rounded)
}
