//! Expense repository.
//!
//! Every mutation runs the expense write and the budget recalculations it
//! triggers inside one database transaction. Any failure drops the
//! transaction, which rolls the whole unit back.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
    sea_query::JoinType,
};
use tally_core::budget::{BudgetRecalcEngine, RecalcError};
use tally_core::expense::{Expense, ExpenseMutation, ExpensePatch, NewExpense};
use tally_shared::AppError;
use tally_shared::types::{CategoryId, ExpenseId, PageRequest, UserId};
use tracing::info;
use uuid::Uuid;

use super::category::{self, CategoryError};
use crate::entities::{expense_categories, expenses, users};
use crate::store::SeaStore;

/// Error types for expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// Input failed validation.
    #[error(transparent)]
    Invalid(#[from] tally_core::expense::ExpenseError),

    /// Expense not found.
    #[error("Expense not found: {0}")]
    NotFound(ExpenseId),

    /// Owner not found.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Category lookup or creation failed.
    #[error(transparent)]
    Category(#[from] CategoryError),

    /// A triggered budget recalculation failed.
    #[error(transparent)]
    Recalc(#[from] RecalcError<DbErr>),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ExpenseError> for AppError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::Invalid(e) => e.into(),
            ExpenseError::NotFound(_) | ExpenseError::UserNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            ExpenseError::Category(e) => e.into(),
            ExpenseError::Recalc(e) => e.into(),
            ExpenseError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Filter for listing expenses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpenseFilter {
    /// Only this owner's expenses.
    pub user_id: Option<UserId>,
    /// Only expenses linked to this category.
    pub category_id: Option<CategoryId>,
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
    today: Option<NaiveDate>,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
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
    // Mutations
    // ========================================================================

    /// Records an expense, links its categories and recalculates their budgets.
    ///
    /// Categories named in `new_categories` are looked up or created in the
    /// same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the owner or a listed category
    /// does not exist, or any write or recalculation fails.
    pub async fn create_expense(&self, input: &NewExpense) -> Result<Expense, ExpenseError> {
        let input = input.validated()?;

        let txn = self.db.begin().await?;

        if users::Entity::find_by_id(input.user_id.into_inner())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(ExpenseError::UserNotFound(input.user_id));
        }
        category::ensure_exist(&txn, &input.category_ids).await?;

        let model = expenses::ActiveModel {
            id: Set(ExpenseId::new().into_inner()),
            user_id: Set(input.user_id.into_inner()),
            item: Set(input.item),
            vendor: Set(input.vendor),
            amount: Set(input.amount),
            date_purchased: Set(input.date_purchased),
            payment_method: Set(input.payment_method),
            notes: Set(input.notes),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        let mut linked = input.category_ids;
        for name in &input.new_categories {
            let id = CategoryId::from_uuid(category::get_or_create_in(&txn, name).await?.id);
            if !linked.contains(&id) {
                linked.push(id);
            }
        }
        insert_links(&txn, model.id, &linked).await?;

        let mutation = ExpenseMutation::Created {
            owner: input.user_id,
            linked: linked.clone(),
        };
        let recalculated = self.cascade(&txn, &mutation).await?;

        txn.commit().await?;

        info!(
            expense_id = %model.id,
            user_id = %input.user_id,
            categories = linked.len(),
            budgets_recalculated = recalculated,
            "Expense created"
        );

        Ok(to_domain(model, linked))
    }

    /// Updates an expense and recalculates budgets of every category it was
    /// linked to plus every category the patch adds.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the expense does not exist, otherwise as
    /// [`Self::create_expense`].
    pub async fn update_expense(
        &self,
        id: ExpenseId,
        patch: &ExpensePatch,
    ) -> Result<Expense, ExpenseError> {
        let patch = patch.validated()?;

        let txn = self.db.begin().await?;

        let existing = expenses::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(ExpenseError::NotFound(id))?;
        let owner = UserId::from_uuid(existing.user_id);
        let before = linked_categories(&txn, existing.id).await?;

        let mut active: expenses::ActiveModel = existing.into();
        if let Some(item) = patch.item {
            active.item = Set(item);
        }
        if let Some(vendor) = patch.vendor {
            active.vendor = Set(vendor);
        }
        if let Some(amount) = patch.amount {
            active.amount = Set(amount);
        }
        if let Some(date) = patch.date_purchased {
            active.date_purchased = Set(date);
        }
        if let Some(method) = patch.payment_method {
            active.payment_method = Set(Some(method));
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(Some(notes));
        }
        let model = active.update(&txn).await?;

        category::ensure_exist(&txn, &patch.category_ids).await?;
        let mut added: Vec<CategoryId> = Vec::new();
        for category_id in patch.category_ids {
            if !before.contains(&category_id) && !added.contains(&category_id) {
                added.push(category_id);
            }
        }
        for name in &patch.new_categories {
            let category_id =
                CategoryId::from_uuid(category::get_or_create_in(&txn, name).await?.id);
            if !before.contains(&category_id) && !added.contains(&category_id) {
                added.push(category_id);
            }
        }
        insert_links(&txn, model.id, &added).await?;

        let mutation = ExpenseMutation::Updated {
            owner,
            before: before.clone(),
            added: added.clone(),
        };
        let recalculated = self.cascade(&txn, &mutation).await?;

        txn.commit().await?;

        info!(
            expense_id = %id,
            categories_added = added.len(),
            budgets_recalculated = recalculated,
            "Expense updated"
        );

        let mut linked = before;
        linked.extend(added);
        Ok(to_domain(model, linked))
    }

    /// Deletes an expense and its links, then recalculates the budgets of
    /// every category it had been linked to.
    ///
    /// Returns `false` if no such expense exists.
    ///
    /// # Errors
    ///
    /// Returns an error if any write or recalculation fails.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<bool, ExpenseError> {
        let txn = self.db.begin().await?;

        let Some(existing) = expenses::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };
        let linked = linked_categories(&txn, existing.id).await?;

        expense_categories::Entity::delete_many()
            .filter(expense_categories::Column::ExpenseId.eq(existing.id))
            .exec(&txn)
            .await?;
        expenses::Entity::delete_by_id(existing.id).exec(&txn).await?;

        // Sums run after the delete, inside the same transaction.
        let mutation = ExpenseMutation::Deleted {
            owner: UserId::from_uuid(existing.user_id),
            linked,
        };
        let recalculated = self.cascade(&txn, &mutation).await?;

        txn.commit().await?;

        info!(expense_id = %id, budgets_recalculated = recalculated, "Expense deleted");
        Ok(true)
    }

    /// Links a category to an expense and recalculates that category's budgets.
    ///
    /// Linking an already linked category only re-runs the recalculation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Category(NotFound)` for missing rows, otherwise
    /// any write or recalculation failure.
    pub async fn add_category(
        &self,
        expense_id: ExpenseId,
        category_id: CategoryId,
    ) -> Result<(), ExpenseError> {
        let txn = self.db.begin().await?;

        let expense = expenses::Entity::find_by_id(expense_id.into_inner())
            .one(&txn)
            .await?
            .ok_or(ExpenseError::NotFound(expense_id))?;
        category::ensure_exist(&txn, &[category_id]).await?;

        if !linked_categories(&txn, expense.id).await?.contains(&category_id) {
            insert_links(&txn, expense.id, &[category_id]).await?;
        }

        let mutation = ExpenseMutation::Linked {
            owner: UserId::from_uuid(expense.user_id),
            category: category_id,
        };
        let recalculated = self.cascade(&txn, &mutation).await?;

        txn.commit().await?;

        info!(
            expense_id = %expense_id,
            category_id = %category_id,
            budgets_recalculated = recalculated,
            "Category linked"
        );
        Ok(())
    }

    /// Unlinks a category from an expense and recalculates that category's
    /// budgets.
    ///
    /// Returns `false`, without recalculating, if the link did not exist.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the expense does not exist, otherwise any write
    /// or recalculation failure.
    pub async fn remove_category(
        &self,
        expense_id: ExpenseId,
        category_id: CategoryId,
    ) -> Result<bool, ExpenseError> {
        let txn = self.db.begin().await?;

        let expense = expenses::Entity::find_by_id(expense_id.into_inner())
            .one(&txn)
            .await?
            .ok_or(ExpenseError::NotFound(expense_id))?;

        let deleted = expense_categories::Entity::delete_many()
            .filter(expense_categories::Column::ExpenseId.eq(expense.id))
            .filter(expense_categories::Column::CategoryId.eq(category_id.into_inner()))
            .exec(&txn)
            .await?;
        if deleted.rows_affected == 0 {
            return Ok(false);
        }

        let mutation = ExpenseMutation::Unlinked {
            owner: UserId::from_uuid(expense.user_id),
            category: category_id,
        };
        let recalculated = self.cascade(&txn, &mutation).await?;

        txn.commit().await?;

        info!(
            expense_id = %expense_id,
            category_id = %category_id,
            budgets_recalculated = recalculated,
            "Category unlinked"
        );
        Ok(true)
    }

    async fn cascade<C: ConnectionTrait + Sync>(
        &self,
        conn: &C,
        mutation: &ExpenseMutation,
    ) -> Result<usize, RecalcError<DbErr>> {
        let store = SeaStore::new(conn);
        let engine = BudgetRecalcEngine::new(&store, self.today());
        Ok(engine.apply(mutation).await?.len())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Gets an expense with its category links.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_expense(&self, id: ExpenseId) -> Result<Option<Expense>, DbErr> {
        let Some(model) = expenses::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let linked = linked_categories(&self.db, model.id).await?;
        Ok(Some(to_domain(model, linked)))
    }

    /// Lists expenses, newest purchase first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_expenses(
        &self,
        filter: ExpenseFilter,
        page: PageRequest,
    ) -> Result<Vec<Expense>, DbErr> {
        let mut query = expenses::Entity::find();

        if let Some(user_id) = filter.user_id {
            query = query.filter(expenses::Column::UserId.eq(user_id.into_inner()));
        }
        if let Some(category_id) = filter.category_id {
            query = query
                .join(JoinType::InnerJoin, expenses::Relation::ExpenseCategories.def())
                .filter(expense_categories::Column::CategoryId.eq(category_id.into_inner()));
        }

        let models = query
            .order_by_desc(expenses::Column::DatePurchased)
            .order_by_desc(expenses::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let links: Vec<expense_categories::Model> = expense_categories::Entity::find()
            .filter(expense_categories::Column::ExpenseId.is_in(models.iter().map(|m| m.id)))
            .all(&self.db)
            .await?;

        let mut by_expense: HashMap<Uuid, Vec<CategoryId>> = HashMap::new();
        for link in links {
            by_expense
                .entry(link.expense_id)
                .or_default()
                .push(CategoryId::from_uuid(link.category_id));
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let linked = by_expense.remove(&m.id).unwrap_or_default();
                to_domain(m, linked)
            })
            .collect())
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn linked_categories<C: ConnectionTrait>(
    conn: &C,
    expense_id: Uuid,
) -> Result<Vec<CategoryId>, DbErr> {
    let ids: Vec<Uuid> = expense_categories::Entity::find()
        .select_only()
        .column(expense_categories::Column::CategoryId)
        .filter(expense_categories::Column::ExpenseId.eq(expense_id))
        .into_tuple()
        .all(conn)
        .await?;
    Ok(ids.into_iter().map(CategoryId::from_uuid).collect())
}

async fn insert_links<C: ConnectionTrait>(
    conn: &C,
    expense_id: Uuid,
    categories: &[CategoryId],
) -> Result<(), DbErr> {
    if categories.is_empty() {
        return Ok(());
    }

    let links = categories.iter().map(|c| expense_categories::ActiveModel {
        expense_id: Set(expense_id),
        category_id: Set(c.into_inner()),
    });
    expense_categories::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

fn to_domain(model: expenses::Model, category_ids: Vec<CategoryId>) -> Expense {
    Expense {
        id: ExpenseId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        item: model.item,
        vendor: model.vendor,
        amount: model.amount,
        date_purchased: model.date_purchased,
        payment_method: model.payment_method,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        category_ids,
    }
}
