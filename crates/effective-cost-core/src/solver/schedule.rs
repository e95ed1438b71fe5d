//! Discount exponents for each installment of a loan.
//!
//! The periodic convention discounts installment `j` (1-based) by `j` whole
//! periods. The ACT/365 convention discounts it by the actual calendar days
//! between the contract date and the installment's due date, divided by 365.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EffectiveCostError;
use crate::types::ScheduleTiming;
use crate::EffectiveCostResult;

/// Denominator of the ACT/365 year fraction.
pub const DAYS_IN_YEAR: f64 = 365.0;

/// Day-count convention used to build a [`DiscountSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "convention", rename_all = "snake_case")]
pub enum DayCount {
    /// Installment `j` is discounted by `j` whole periods.
    Periodic,
    /// Installment `j` is discounted by `days / 365` from the contract date.
    Actual365(ScheduleTiming),
}

/// One installment of a dated schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Installment number, starting at 1.
    pub index: u32,
    pub due_date: NaiveDate,
    /// Calendar days from the contract date (negative if due before it).
    pub days: i64,
    /// `days / 365`, the discount exponent.
    pub year_fraction: f64,
}

/// Per-installment discount exponents, in payment order.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountSchedule {
    exponents: Exponents,
    entries: Vec<ScheduleEntry>,
}

/// Periodic exponents are derived from the index, so only dated schedules
/// hold one value per installment.
#[derive(Debug, Clone, PartialEq)]
enum Exponents {
    Periodic(u32),
    Dated(Vec<f64>),
}

impl DiscountSchedule {
    /// Build the schedule for `installment_count` installments under `day_count`.
    pub fn build(day_count: &DayCount, installment_count: u32) -> EffectiveCostResult<Self> {
        match day_count {
            DayCount::Periodic => Ok(Self::periodic(installment_count)),
            DayCount::Actual365(timing) => Self::actual_365(timing, installment_count),
        }
    }

    /// Exponents `1, 2, ..., installment_count`.
    pub fn periodic(installment_count: u32) -> Self {
        Self {
            exponents: Exponents::Periodic(installment_count),
            entries: Vec::new(),
        }
    }

    /// ACT/365 exponents. The first installment falls on
    /// `first_installment_date`; installment `j` (0-based) falls `j` calendar
    /// months after it, clamped to the end of shorter months.
    pub fn actual_365(timing: &ScheduleTiming, installment_count: u32) -> EffectiveCostResult<Self> {
        // Fail on the last due date before allocating anything.
        if installment_count > 1 {
            add_months(timing.first_installment_date, installment_count - 1)?;
        }

        let mut exponents = Vec::with_capacity(installment_count as usize);
        let mut entries = Vec::with_capacity(installment_count as usize);

        for j in 0..installment_count {
            let due_date = if j == 0 {
                timing.first_installment_date
            } else {
                add_months(timing.first_installment_date, j)?
            };
            let days = days_between(timing.contract_date, due_date);
            let year_fraction = days as f64 / DAYS_IN_YEAR;

            exponents.push(year_fraction);
            entries.push(ScheduleEntry {
                index: j + 1,
                due_date,
                days,
                year_fraction,
            });
        }

        Ok(Self {
            exponents: Exponents::Dated(exponents),
            entries,
        })
    }

    /// Discount exponent of the installment at `index` (0-based).
    ///
    /// # Panics
    /// If `index >= self.len()` on a dated schedule.
    pub fn exponent(&self, index: usize) -> f64 {
        match &self.exponents {
            Exponents::Periodic(_) => (index + 1) as f64,
            Exponents::Dated(values) => values[index],
        }
    }

    pub fn exponents(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |i| self.exponent(i))
    }

    /// Dated entries; empty for the periodic convention.
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        match &self.exponents {
            Exponents::Periodic(count) => *count as usize,
            Exponents::Dated(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_entries(self) -> Vec<ScheduleEntry> {
        self.entries
    }
}

/// Add calendar months, clamping the day to the last day of the target month
/// (Jan 31 + 1 month = Feb 28, or Feb 29 in a leap year).
pub fn add_months(date: NaiveDate, months: u32) -> EffectiveCostResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| {
            EffectiveCostError::DateError(format!(
                "{date} + {months} months is outside the supported calendar range"
            ))
        })
}

/// Signed calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(add_months(date(2023, 1, 31), 1).unwrap(), date(2023, 2, 28));
        assert_eq!(add_months(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(add_months(date(2024, 1, 31), 3).unwrap(), date(2024, 4, 30));
        assert_eq!(add_months(date(2024, 3, 31), 11).unwrap(), date(2025, 2, 28));
    }

    #[test]
    fn test_add_months_is_not_cumulative() {
        // Each installment is offset from the first date, so the 31st survives
        // a short February.
        let first = date(2024, 1, 31);
        assert_eq!(add_months(first, 2).unwrap(), date(2024, 3, 31));
        assert_eq!(add_months(first, 12).unwrap(), date(2025, 1, 31));
    }

    #[test]
    fn test_add_months_out_of_range() {
        let err = add_months(NaiveDate::MAX, 1).unwrap_err();
        assert!(matches!(err, EffectiveCostError::DateError(_)));
    }

    #[test]
    fn test_days_between_signed() {
        assert_eq!(days_between(date(2024, 1, 1), date(2024, 1, 31)), 30);
        assert_eq!(days_between(date(2024, 1, 31), date(2024, 1, 1)), -30);
        assert_eq!(days_between(date(2024, 2, 1), date(2024, 3, 1)), 29);
    }

    #[test]
    fn test_periodic_exponents() {
        let schedule = DiscountSchedule::periodic(4);
        let exponents: Vec<f64> = schedule.exponents().collect();
        assert_eq!(exponents, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(schedule.entries().is_empty());
    }

    #[test]
    fn test_periodic_schedule_of_any_length_is_cheap() {
        let schedule = DiscountSchedule::periodic(u32::MAX);
        assert_eq!(schedule.len(), u32::MAX as usize);
        assert_eq!(schedule.exponent(0), 1.0);
        assert_eq!(schedule.exponent(u32::MAX as usize - 1), f64::from(u32::MAX));
    }

    #[test]
    fn test_actual_365_huge_count_hits_calendar_limit() {
        let timing = ScheduleTiming {
            contract_date: date(2024, 1, 1),
            first_installment_date: date(2024, 2, 1),
        };
        let err = DiscountSchedule::actual_365(&timing, u32::MAX).unwrap_err();
        assert!(matches!(err, EffectiveCostError::DateError(_)));
    }

    #[test]
    fn test_actual_365_schedule() {
        let timing = ScheduleTiming {
            contract_date: date(2024, 1, 1),
            first_installment_date: date(2024, 1, 31),
        };
        let schedule = DiscountSchedule::actual_365(&timing, 3).unwrap();
        let days: Vec<i64> = schedule.entries().iter().map(|e| e.days).collect();
        let due: Vec<NaiveDate> = schedule.entries().iter().map(|e| e.due_date).collect();

        assert_eq!(days, vec![30, 59, 90]);
        assert_eq!(due, vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31)]);
        assert_eq!(schedule.exponent(0), 30.0 / 365.0);
        assert_eq!(schedule.entries()[2].index, 3);
    }

    #[test]
    fn test_actual_365_first_before_contract() {
        let timing = ScheduleTiming {
            contract_date: date(2024, 2, 10),
            first_installment_date: date(2024, 2, 1),
        };
        let schedule = DiscountSchedule::actual_365(&timing, 2).unwrap();
        assert_eq!(schedule.entries()[0].days, -9);
        assert_eq!(schedule.entries()[1].days, 20);
    }

    #[test]
    fn test_build_dispatches_on_convention() {
        let periodic = DiscountSchedule::build(&DayCount::Periodic, 2).unwrap();
        assert_eq!(periodic.len(), 2);

        let timing = ScheduleTiming {
            contract_date: date(2024, 1, 1),
            first_installment_date: date(2025, 1, 1),
        };
        let dated = DiscountSchedule::build(&DayCount::Actual365(timing), 1).unwrap();
        assert_eq!(dated.exponents().collect::<Vec<_>>(), vec![366.0 / 365.0]);
    }
}
