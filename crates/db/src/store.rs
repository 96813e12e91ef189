//! SeaORM implementation of the core storage seams.
//!
//! `SeaStore` borrows any connection, so the same code runs against the pool
//! for reads and against a `DatabaseTransaction` inside a cascade.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    RelationTrait, Set, Unchanged,
    sea_query::JoinType,
};
use tally_core::budget::{
    Budget, BudgetError, BudgetStore, Period, Recalculation, SpendAggregator, Store, Timeframe,
};
use tally_shared::types::{BudgetId, CategoryId, UserId};

use crate::entities::{budgets, expense_categories, expenses};

/// Store over a borrowed SeaORM connection or transaction.
pub struct SeaStore<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> SeaStore<'c, C> {
    /// Wraps a connection.
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    async fn linked_amounts(
        &self,
        user: UserId,
        category: CategoryId,
        period: Option<Period>,
    ) -> Result<Vec<Decimal>, DbErr> {
        let mut query = expenses::Entity::find()
            .select_only()
            .column(expenses::Column::Amount)
            .join(JoinType::InnerJoin, expenses::Relation::ExpenseCategories.def())
            .filter(expenses::Column::UserId.eq(user.into_inner()))
            .filter(expense_categories::Column::CategoryId.eq(category.into_inner()));

        if let Some(period) = period {
            query = query.filter(expenses::Column::DatePurchased.between(period.start, period.end));
        }

        query.into_tuple().all(self.conn).await
    }
}

impl<C: ConnectionTrait + Sync> Store for SeaStore<'_, C> {
    type Error = DbErr;
}

#[async_trait]
impl<C: ConnectionTrait + Sync> SpendAggregator for SeaStore<'_, C> {
    async fn sum_between(
        &self,
        user: UserId,
        category: CategoryId,
        period: Period,
    ) -> Result<Decimal, DbErr> {
        let amounts = self.linked_amounts(user, category, Some(period)).await?;
        Ok(amounts.into_iter().sum())
    }

    async fn sum_all_time(&self, user: UserId, category: CategoryId) -> Result<Decimal, DbErr> {
        let amounts = self.linked_amounts(user, category, None).await?;
        Ok(amounts.into_iter().sum())
    }
}

#[async_trait]
impl<C: ConnectionTrait + Sync> BudgetStore for SeaStore<'_, C> {
    async fn budgets_for(&self, user: UserId, category: CategoryId) -> Result<Vec<Budget>, DbErr> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user.into_inner()))
            .filter(budgets::Column::CategoryId.eq(category.into_inner()))
            .all(self.conn)
            .await?;

        models
            .iter()
            .map(|m| budget_from_model(m).map_err(|e| corrupt_row(m, &e)))
            .collect()
    }

    async fn save_recalculation(&self, recalculation: &Recalculation) -> Result<(), DbErr> {
        budgets::ActiveModel {
            id: Unchanged(recalculation.budget_id.into_inner()),
            current_spend: Set(recalculation.current_spend),
            is_over_max: Set(recalculation.is_over_max),
            start_date: Set(recalculation.window.start),
            end_date: Set(recalculation.window.end),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(self.conn)
        .await?;
        Ok(())
    }
}

/// Converts a stored row into the domain budget.
///
/// # Errors
///
/// Returns `MissingInterval` for a recurring row without interval or anchor.
pub fn budget_from_model(model: &budgets::Model) -> Result<Budget, BudgetError> {
    let window = Period::new(model.start_date, model.end_date);
    let timeframe = Timeframe::from_stored(
        model.timeframe_kind.into(),
        model.timeframe_interval,
        model.recurring_start_date,
        window,
    )?;

    Ok(Budget {
        id: BudgetId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        category_id: CategoryId::from_uuid(model.category_id),
        max_spend: model.max_spend,
        current_spend: model.current_spend,
        future_spend: model.future_spend,
        is_over_max: model.is_over_max,
        timeframe,
        window,
    })
}

fn corrupt_row(model: &budgets::Model, err: &BudgetError) -> DbErr {
    DbErr::Custom(format!("budget {} has an invalid timeframe: {err}", model.id))
}
