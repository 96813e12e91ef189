//! Budget repository for database operations.
//!
//! Creation and updates go through [`BudgetLifecycle`], manual recalculation
//! through [`BudgetRecalcEngine`]; both read spend totals inside the same
//! transaction that writes the budget row.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::budget::{
    Budget, BudgetLifecycle, BudgetRecalcEngine, CreateBudgetInput, RecalcError, UpdateBudgetInput,
};
use tally_shared::AppError;
use tally_shared::types::{BudgetId, CategoryId, PageRequest, UserId};
use tracing::info;

use crate::entities::{budgets, categories, users};
use crate::store::{SeaStore, budget_from_model};

/// Error types for budget operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// Budget not found.
    #[error("Budget not found: {0}")]
    NotFound(BudgetId),

    /// Owner not found.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// Validation or recalculation failure.
    #[error(transparent)]
    Recalc(#[from] RecalcError<DbErr>),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<tally_core::budget::BudgetError> for BudgetError {
    fn from(err: tally_core::budget::BudgetError) -> Self {
        Self::Recalc(RecalcError::Budget(err))
    }
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::NotFound(_)
            | BudgetError::UserNotFound(_)
            | BudgetError::CategoryNotFound(_) => Self::NotFound(err.to_string()),
            BudgetError::Recalc(e) => e.into(),
            BudgetError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Budget repository.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
    today: Option<NaiveDate>,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db, today: None }
    }

    /// Fixes the date recurring budget windows are derived from.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    // ========================================================================
    // Budget Operations
    // ========================================================================

    /// Creates a budget with its window and current spend derived.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The owner or category does not exist
    /// - The cap, future spend or timeframe is invalid
    /// - Database operation fails
    pub async fn create_budget(&self, input: &CreateBudgetInput) -> Result<Budget, BudgetError> {
        let txn = self.db.begin().await?;

        ensure_owner(&txn, input.user_id, input.category_id).await?;

        let store = SeaStore::new(&txn);
        let budget = BudgetLifecycle::new(&store, self.today())
            .create(input)
            .await?;

        let now = Utc::now().into();
        budgets::ActiveModel {
            id: Set(budget.id.into_inner()),
            user_id: Set(budget.user_id.into_inner()),
            category_id: Set(budget.category_id.into_inner()),
            max_spend: Set(budget.max_spend),
            current_spend: Set(budget.current_spend),
            future_spend: Set(budget.future_spend),
            is_over_max: Set(budget.is_over_max),
            start_date: Set(budget.window.start),
            end_date: Set(budget.window.end),
            timeframe_kind: Set(budget.timeframe.kind().into()),
            timeframe_interval: Set(stored_interval(&budget)),
            recurring_start_date: Set(budget.timeframe.anchor()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            budget_id = %budget.id,
            user_id = %budget.user_id,
            kind = %budget.timeframe.kind(),
            current_spend = %budget.current_spend,
            "Budget created"
        );

        Ok(budget)
    }

    /// Updates a budget.
    ///
    /// A new owner or category resets `current_spend` to that pair's all-time
    /// total; see [`BudgetLifecycle::update`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the budget does not exist, otherwise as
    /// [`Self::create_budget`].
    pub async fn update_budget(
        &self,
        id: BudgetId,
        patch: &UpdateBudgetInput,
    ) -> Result<Budget, BudgetError> {
        let txn = self.db.begin().await?;

        let model = find_model(&txn, id).await?;
        let existing = budget_from_model(&model)?;

        ensure_owner(
            &txn,
            patch.user_id.unwrap_or(existing.user_id),
            patch.category_id.unwrap_or(existing.category_id),
        )
        .await?;

        let store = SeaStore::new(&txn);
        let budget = BudgetLifecycle::new(&store, self.today())
            .update(&existing, patch)
            .await?;

        let mut active: budgets::ActiveModel = model.into();
        active.user_id = Set(budget.user_id.into_inner());
        active.category_id = Set(budget.category_id.into_inner());
        active.max_spend = Set(budget.max_spend);
        active.current_spend = Set(budget.current_spend);
        active.future_spend = Set(budget.future_spend);
        active.is_over_max = Set(budget.is_over_max);
        active.start_date = Set(budget.window.start);
        active.end_date = Set(budget.window.end);
        active.timeframe_kind = Set(budget.timeframe.kind().into());
        active.timeframe_interval = Set(stored_interval(&budget));
        active.recurring_start_date = Set(budget.timeframe.anchor());
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;

        info!(budget_id = %id, is_over_max = budget.is_over_max, "Budget updated");
        Ok(budget)
    }

    /// Gets a budget by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the budget does not exist.
    pub async fn get_budget(&self, id: BudgetId) -> Result<Budget, BudgetError> {
        let model = find_model(&self.db, id).await?;
        Ok(budget_from_model(&model)?)
    }

    /// Lists a user's budgets, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is malformed.
    pub async fn list_budgets(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Vec<Budget>, BudgetError> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.into_inner()))
            .order_by_asc(budgets::Column::CreatedAt)
            .order_by_asc(budgets::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        models
            .iter()
            .map(|m| budget_from_model(m).map_err(BudgetError::from))
            .collect()
    }

    /// Deletes a budget. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete_budget(&self, id: BudgetId) -> Result<bool, BudgetError> {
        let result = budgets::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Recalculates one budget from scratch and returns the refreshed budget.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the budget does not exist, or the recalculation
    /// failure.
    pub async fn recalculate(&self, id: BudgetId) -> Result<Budget, BudgetError> {
        let txn = self.db.begin().await?;

        let mut budget = budget_from_model(&find_model(&txn, id).await?)?;

        let store = SeaStore::new(&txn);
        let recalculation = BudgetRecalcEngine::new(&store, self.today())
            .recalc_budget(&budget)
            .await?;

        txn.commit().await?;

        budget.current_spend = recalculation.current_spend;
        budget.is_over_max = recalculation.is_over_max;
        budget.window = recalculation.window;
        Ok(budget)
    }
}

async fn find_model<C: ConnectionTrait>(conn: &C, id: BudgetId) -> Result<budgets::Model, BudgetError> {
    budgets::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or(BudgetError::NotFound(id))
}

async fn ensure_owner<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    category_id: CategoryId,
) -> Result<(), BudgetError> {
    if users::Entity::find_by_id(user_id.into_inner())
        .one(conn)
        .await?
        .is_none()
    {
        return Err(BudgetError::UserNotFound(user_id));
    }
    if categories::Entity::find_by_id(category_id.into_inner())
        .one(conn)
        .await?
        .is_none()
    {
        return Err(BudgetError::CategoryNotFound(category_id));
    }
    Ok(())
}

fn stored_interval(budget: &Budget) -> Option<i32> {
    budget
        .timeframe
        .interval()
        .and_then(|i| i32::try_from(i).ok())
}
