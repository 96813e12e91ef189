//! Budget creation and update rules.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::period::PeriodCalculator;
use super::recalc::RecalcError;
use super::service::BudgetService;
use super::store::SpendAggregator;
use super::types::{Budget, CreateBudgetInput, UpdateBudgetInput};
use tally_shared::types::BudgetId;

/// Builds new and updated budgets with their derived fields filled in.
///
/// Nothing is persisted here; callers store the returned budget.
pub struct BudgetLifecycle<'s, S> {
    spend: &'s S,
    today: NaiveDate,
}

impl<'s, S: SpendAggregator> BudgetLifecycle<'s, S> {
    /// Creates a lifecycle manager evaluating windows as of `today`.
    pub const fn new(spend: &'s S, today: NaiveDate) -> Self {
        Self { spend, today }
    }

    /// Validates `input` and derives window, current spend and over-max flag.
    ///
    /// # Errors
    ///
    /// Returns `Budget` for invalid input, `Store` if the spend total cannot
    /// be read.
    pub async fn create(&self, input: &CreateBudgetInput) -> Result<Budget, RecalcError<S::Error>> {
        BudgetService::validate_cap(input.max_spend)?;
        let future_spend = input.future_spend.unwrap_or(Decimal::ZERO);
        BudgetService::validate_spend(future_spend)?;

        let timeframe = BudgetService::parse_timeframe(&input.timeframe, self.today)?;
        let window = PeriodCalculator::window(&timeframe, self.today)?;

        let current_spend = self
            .spend
            .sum_between(input.user_id, input.category_id, window)
            .await
            .map_err(RecalcError::Store)?;

        Ok(Budget {
            id: BudgetId::new(),
            user_id: input.user_id,
            category_id: input.category_id,
            max_spend: input.max_spend,
            current_spend,
            future_spend,
            is_over_max: BudgetService::is_over_max(current_spend, future_spend, input.max_spend),
            timeframe,
            window,
        })
    }

    /// Applies `patch` to `existing`.
    ///
    /// - A new owner or category resets `current_spend` to the all-time total
    ///   for the new pair, ignoring any window and any supplied
    ///   `current_spend`.
    /// - Otherwise a new timeframe re-sums spend over its window.
    /// - Otherwise a supplied `current_spend` is taken as is.
    ///
    /// `is_over_max` is always recomputed from the final values.
    ///
    /// # Errors
    ///
    /// Returns `Budget` for invalid input, `Store` if a spend total cannot be
    /// read.
    pub async fn update(
        &self,
        existing: &Budget,
        patch: &UpdateBudgetInput,
    ) -> Result<Budget, RecalcError<S::Error>> {
        if let Some(max_spend) = patch.max_spend {
            BudgetService::validate_cap(max_spend)?;
        }
        for spend in [patch.current_spend, patch.future_spend].into_iter().flatten() {
            BudgetService::validate_spend(spend)?;
        }

        let mut budget = existing.clone();

        let owner_changed = patch.user_id.is_some_and(|u| u != existing.user_id)
            || patch.category_id.is_some_and(|c| c != existing.category_id);
        budget.user_id = patch.user_id.unwrap_or(existing.user_id);
        budget.category_id = patch.category_id.unwrap_or(existing.category_id);

        if let Some(input) = &patch.timeframe {
            budget.timeframe = BudgetService::parse_timeframe(input, self.today)?;
            budget.window = PeriodCalculator::window(&budget.timeframe, self.today)?;
        }

        budget.max_spend = patch.max_spend.unwrap_or(existing.max_spend);
        budget.future_spend = patch.future_spend.unwrap_or(existing.future_spend);

        budget.current_spend = if owner_changed {
            self.spend
                .sum_all_time(budget.user_id, budget.category_id)
                .await
                .map_err(RecalcError::Store)?
        } else if patch.timeframe.is_some() {
            self.spend
                .sum_between(budget.user_id, budget.category_id, budget.window)
                .await
                .map_err(RecalcError::Store)?
        } else {
            patch.current_spend.unwrap_or(existing.current_spend)
        };

        budget.is_over_max =
            BudgetService::is_over_max(budget.current_spend, budget.future_spend, budget.max_spend);

        Ok(budget)
    }
}
