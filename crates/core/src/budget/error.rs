//! Budget error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tally_shared::AppError;

/// Budget validation errors.
///
/// Every variant is raised before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// Timeframe kind is not one of yearly, monthly, weekly or custom.
    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    /// Recurring budget without a positive interval.
    #[error("Recurring timeframe requires a positive interval")]
    MissingInterval,

    /// Custom budget that also carries an interval.
    #[error("Custom timeframe must not have an interval")]
    ContradictoryInterval,

    /// Interval above the supported bound.
    #[error("Interval {0} exceeds the maximum of {max}", max = super::types::MAX_INTERVAL)]
    IntervalTooLarge(i32),

    /// Custom window missing or not strictly increasing.
    #[error("End date must be after start date")]
    DateRangeInvalid,

    /// The anchor's day of month does not exist in a month the recurrence lands on.
    #[error("Anchor {anchor} has no matching day in month {month}")]
    AnchorDayOverflow {
        /// Recurrence anchor.
        anchor: NaiveDate,
        /// Target month (1-12) the anchor could not be shifted into.
        month: u32,
    },

    /// Shifting the anchor left the supported calendar range.
    #[error("Period out of calendar range for anchor {0}")]
    DateOutOfRange(NaiveDate),

    /// Spend cap must be positive and within the money bound.
    #[error("Invalid max spend: {0}")]
    CapInvalid(Decimal),

    /// Current or future spend supplied below zero.
    #[error("Spend cannot be negative: {0}")]
    NegativeSpend(Decimal),
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::CapInvalid(_) | BudgetError::NegativeSpend(_) => {
                Self::BusinessRule(err.to_string())
            }
            _ => Self::Validation(err.to_string()),
        }
    }
}
