pub mod effective_cost;
pub mod error;
pub mod solver;
pub mod types;

pub use error::EffectiveCostError;
pub use solver::{solve_annual, solve_monthly, RateResult, SolverConfig};
pub use types::*;

/// Standard result type for all effective-cost operations
pub type EffectiveCostResult<T> = Result<T, EffectiveCostError>;
