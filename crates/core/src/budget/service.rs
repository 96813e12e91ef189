//! Budget validation and the over-max rule.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::is_valid_cap;

use super::error::BudgetError;
use super::period::PeriodCalculator;
use super::types::{
    MAX_INTERVAL, Period, Recurrence, Timeframe, TimeframeInput, TimeframeKind, default_anchor,
};

/// Budget service for business logic.
pub struct BudgetService;

impl BudgetService {
    /// Returns true when committed plus declared spend exceeds the cap.
    ///
    /// Equality is not over.
    #[must_use]
    pub fn is_over_max(current_spend: Decimal, future_spend: Decimal, max_spend: Decimal) -> bool {
        current_spend + future_spend > max_spend
    }

    /// Validate a spend cap.
    ///
    /// # Errors
    ///
    /// Returns `CapInvalid` unless `0 < max_spend <= 999,999.99` with at most
    /// two decimal places.
    pub fn validate_cap(max_spend: Decimal) -> Result<(), BudgetError> {
        if is_valid_cap(max_spend) {
            Ok(())
        } else {
            Err(BudgetError::CapInvalid(max_spend))
        }
    }

    /// Validate a caller-supplied current or future spend.
    ///
    /// # Errors
    ///
    /// Returns `NegativeSpend` for values below zero.
    pub fn validate_spend(spend: Decimal) -> Result<(), BudgetError> {
        if spend < Decimal::ZERO {
            Err(BudgetError::NegativeSpend(spend))
        } else {
            Ok(())
        }
    }

    /// Validate raw timeframe fields.
    ///
    /// Recurring kinds need an interval in `1..=100`; the anchor defaults to
    /// January 1 of `today`'s year and must exist in every month the
    /// recurrence reaches. Custom kinds need `end_date > start_date` and no
    /// interval.
    ///
    /// # Errors
    ///
    /// Returns the matching `BudgetError` variant for the first violated rule.
    pub fn parse_timeframe(
        input: &TimeframeInput,
        today: NaiveDate,
    ) -> Result<Timeframe, BudgetError> {
        let kind: TimeframeKind = input.kind.parse()?;

        let Some(unit) = kind.unit() else {
            if input.interval.is_some() {
                return Err(BudgetError::ContradictoryInterval);
            }
            let (Some(start), Some(end)) = (input.start_date, input.end_date) else {
                return Err(BudgetError::DateRangeInvalid);
            };
            if end <= start {
                return Err(BudgetError::DateRangeInvalid);
            }
            return Ok(Timeframe::Custom(Period::new(start, end)));
        };

        let interval = match input.interval {
            None => return Err(BudgetError::MissingInterval),
            Some(i) if i <= 0 => return Err(BudgetError::MissingInterval),
            Some(i) if i > MAX_INTERVAL => return Err(BudgetError::IntervalTooLarge(i)),
            Some(i) => u32::try_from(i).map_err(|_| BudgetError::MissingInterval)?,
        };

        let recurrence = Recurrence {
            unit,
            interval,
            anchor: input.anchor.unwrap_or_else(|| default_anchor(today)),
        };
        PeriodCalculator::check_anchor(&recurrence)?;

        Ok(Timeframe::Recurring(recurrence))
    }
}
