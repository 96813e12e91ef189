//! Budget recalculation engine.
//!
//! Recalculation is absolute: every call re-sums spend from scratch over the
//! budget's current window, so running it twice changes nothing and
//! concurrent writers converge on the last committed state.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;
use tally_shared::AppError;
use tally_shared::types::{CategoryId, UserId};

use super::error::BudgetError;
use super::period::PeriodCalculator;
use super::service::BudgetService;
use super::store::{BudgetStore, SpendAggregator};
use super::types::{Budget, Recalculation};
use crate::expense::ExpenseMutation;

/// Failure of a recalculation or lifecycle operation.
#[derive(Debug, Error)]
pub enum RecalcError<E: std::error::Error + 'static> {
    /// Budget data failed validation.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// The backing store failed; the surrounding write must be rolled back.
    #[error("Store error: {0}")]
    Store(#[source] E),
}

impl<E: std::error::Error + 'static> From<RecalcError<E>> for AppError {
    fn from(err: RecalcError<E>) -> Self {
        match err {
            RecalcError::Budget(e) => e.into(),
            RecalcError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl<E: std::error::Error + 'static> RecalcError<E> {
    /// Returns the validation error, if this is one.
    pub const fn as_budget_error(&self) -> Option<&BudgetError> {
        match self {
            Self::Budget(e) => Some(e),
            Self::Store(_) => None,
        }
    }
}

/// Keeps budgets' `current_spend` and `is_over_max` in step with expenses.
pub struct BudgetRecalcEngine<'s, S> {
    store: &'s S,
    today: NaiveDate,
}

impl<'s, S> BudgetRecalcEngine<'s, S>
where
    S: SpendAggregator + BudgetStore,
{
    /// Creates an engine that derives recurring windows as of `today`.
    pub const fn new(store: &'s S, today: NaiveDate) -> Self {
        Self { store, today }
    }

    /// Recalculates every budget of `user` tracking `category`.
    ///
    /// # Errors
    ///
    /// Aborts on the first budget whose window cannot be derived or on any
    /// store failure.
    pub async fn recalc_budgets_for(
        &self,
        user: UserId,
        category: CategoryId,
    ) -> Result<Vec<Recalculation>, RecalcError<S::Error>> {
        let budgets = self
            .store
            .budgets_for(user, category)
            .await
            .map_err(RecalcError::Store)?;

        let mut results = Vec::with_capacity(budgets.len());
        for budget in &budgets {
            results.push(self.recalc_budget(budget).await?);
        }
        Ok(results)
    }

    /// Runs [`Self::recalc_budgets_for`] for each category in order.
    ///
    /// Repeated categories are recalculated again.
    ///
    /// # Errors
    ///
    /// Same as [`Self::recalc_budgets_for`].
    pub async fn recalc_many(
        &self,
        user: UserId,
        categories: &[CategoryId],
    ) -> Result<Vec<Recalculation>, RecalcError<S::Error>> {
        let mut results = Vec::new();
        for category in categories {
            results.extend(self.recalc_budgets_for(user, *category).await?);
        }
        Ok(results)
    }

    /// Runs the cascade an expense mutation triggers.
    ///
    /// # Errors
    ///
    /// Same as [`Self::recalc_budgets_for`].
    pub async fn apply(
        &self,
        mutation: &ExpenseMutation,
    ) -> Result<Vec<Recalculation>, RecalcError<S::Error>> {
        self.recalc_many(mutation.owner(), &mutation.affected_categories())
            .await
    }

    /// Recalculates one budget and writes the result back.
    ///
    /// # Errors
    ///
    /// Returns `Budget` if the window cannot be derived, `Store` on any
    /// store failure.
    pub async fn recalc_budget(
        &self,
        budget: &Budget,
    ) -> Result<Recalculation, RecalcError<S::Error>> {
        let window = PeriodCalculator::window(&budget.timeframe, self.today)?;

        let current_spend = self
            .store
            .sum_between(budget.user_id, budget.category_id, window)
            .await
            .map_err(RecalcError::Store)?;

        let recalculation = Recalculation {
            budget_id: budget.id,
            window,
            current_spend,
            is_over_max: BudgetService::is_over_max(
                current_spend,
                budget.future_spend,
                budget.max_spend,
            ),
        };

        self.store
            .save_recalculation(&recalculation)
            .await
            .map_err(RecalcError::Store)?;

        debug!(
            budget_id = %budget.id,
            start = %window.start,
            end = %window.end,
            days = window.days(),
            current_spend = %current_spend,
            is_over_max = recalculation.is_over_max,
            "Budget recalculated"
        );

        Ok(recalculation)
    }
}
