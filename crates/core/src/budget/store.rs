//! Storage seams for spend aggregation and budget write-back.
//!
//! `tally-db` implements these over a SeaORM connection or transaction.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tally_shared::types::{CategoryId, UserId};

use super::types::{Budget, Period, Recalculation};

/// Error type shared by every store seam of one backend.
pub trait Store: Send + Sync {
    /// Backend failure.
    type Error: std::error::Error + Send + Sync + 'static;
}

/// Read-only spend totals over a user's expenses.
#[async_trait]
pub trait SpendAggregator: Store {
    /// Total of every expense owned by `user`, linked to `category`, and
    /// purchased inside `period` (both ends inclusive). Zero when nothing matches.
    async fn sum_between(
        &self,
        user: UserId,
        category: CategoryId,
        period: Period,
    ) -> Result<Decimal, Self::Error>;

    /// Same total without a date filter.
    async fn sum_all_time(&self, user: UserId, category: CategoryId)
    -> Result<Decimal, Self::Error>;
}

/// Budget lookup and write-back for the recalculation engine.
#[async_trait]
pub trait BudgetStore: Store {
    /// Every budget owned by `user` that tracks exactly `category`.
    async fn budgets_for(
        &self,
        user: UserId,
        category: CategoryId,
    ) -> Result<Vec<Budget>, Self::Error>;

    /// Persists spend, over-max flag and window snapshot of one budget.
    async fn save_recalculation(&self, recalculation: &Recalculation) -> Result<(), Self::Error>;
}
