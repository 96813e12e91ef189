//! Category repository with lookup-or-create semantics.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::expense::{ExpenseError, normalize_category_name};
use tally_shared::AppError;
use tally_shared::types::{CategoryId, PageRequest};

use tracing::info;

use crate::entities::{budgets, categories, expense_categories};

/// Error types for category operations.
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    /// Name rejected by normalization.
    #[error(transparent)]
    Invalid(#[from] ExpenseError),

    /// Category not found.
    #[error("Category not found: {0}")]
    NotFound(CategoryId),

    /// Another category already has this name.
    #[error("Category name already in use: {0}")]
    NameTaken(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::Invalid(e) => e.into(),
            CategoryError::NotFound(_) => Self::NotFound(err.to_string()),
            CategoryError::NameTaken(_) => Self::Conflict(err.to_string()),
            CategoryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Category repository.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the category with this name, creating it if needed.
    ///
    /// Names match exactly after trimming and sanitizing.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a name that is empty or too long after
    /// normalization, `Database` if a query fails.
    pub async fn get_or_create(&self, name: &str) -> Result<categories::Model, CategoryError> {
        get_or_create_in(&self.db, name).await
    }

    /// Finds a category by normalized name.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for an unusable name, `Database` if the query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<categories::Model>, CategoryError> {
        let name = normalize_category_name(name)?;
        Ok(find_by_exact_name(&self.db, &name).await?)
    }

    /// Finds a category by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: CategoryId) -> Result<Option<categories::Model>, DbErr> {
        categories::Entity::find_by_id(id.into_inner()).one(&self.db).await
    }

    /// Lists categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, page: PageRequest) -> Result<Vec<categories::Model>, DbErr> {
        categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
    }

    /// Renames a category. Links and budgets follow the ID, so nothing else
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for an unusable name, `NotFound` if the category
    /// does not exist, `NameTaken` if another category already has the name.
    pub async fn rename(
        &self,
        id: CategoryId,
        name: &str,
    ) -> Result<categories::Model, CategoryError> {
        let name = normalize_category_name(name)?;

        let existing = self.find_by_id(id).await?.ok_or(CategoryError::NotFound(id))?;
        if let Some(other) = find_by_exact_name(&self.db, &name).await?
            && other.id != existing.id
        {
            return Err(CategoryError::NameTaken(name));
        }

        let mut active: categories::ActiveModel = existing.into();
        active.name = Set(name);
        let category = active.update(&self.db).await?;

        info!(category_id = %id, name = %category.name, "Category renamed");
        Ok(category)
    }

    /// Deletes a category, its expense links and every budget tracking it.
    /// Returns `false` if no such category exists.
    ///
    /// Expenses stay, as do their links to other categories, so no other
    /// budget's spend changes.
    ///
    /// # Errors
    ///
    /// Returns an error if any delete fails; the whole unit is rolled back.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, CategoryError> {
        let txn = self.db.begin().await?;
        let category = id.into_inner();

        expense_categories::Entity::delete_many()
            .filter(expense_categories::Column::CategoryId.eq(category))
            .exec(&txn)
            .await?;
        let budgets_removed = budgets::Entity::delete_many()
            .filter(budgets::Column::CategoryId.eq(category))
            .exec(&txn)
            .await?
            .rows_affected;
        let result = categories::Entity::delete_by_id(category).exec(&txn).await?;

        txn.commit().await?;

        let deleted = result.rows_affected > 0;
        if deleted {
            info!(category_id = %id, budgets_removed, "Category deleted");
        }
        Ok(deleted)
    }
}

async fn find_by_exact_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<Option<categories::Model>, DbErr> {
    categories::Entity::find()
        .filter(categories::Column::Name.eq(name))
        .one(conn)
        .await
}

/// Lookup-or-create on any connection, so expense writes can create
/// categories inside their transaction.
pub(crate) async fn get_or_create_in<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<categories::Model, CategoryError> {
    let name = normalize_category_name(name)?;

    if let Some(existing) = find_by_exact_name(conn, &name).await? {
        return Ok(existing);
    }

    let category = categories::ActiveModel {
        id: Set(CategoryId::new().into_inner()),
        name: Set(name),
    };
    Ok(category.insert(conn).await?)
}

/// Fails with `NotFound` for the first ID that has no row.
pub(crate) async fn ensure_exist<C: ConnectionTrait>(
    conn: &C,
    ids: &[CategoryId],
) -> Result<(), CategoryError> {
    if ids.is_empty() {
        return Ok(());
    }

    let found: Vec<uuid::Uuid> = categories::Entity::find()
        .select_only()
        .column(categories::Column::Id)
        .filter(categories::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
        .into_tuple()
        .all(conn)
        .await?;

    match ids.iter().find(|id| !found.contains(&id.into_inner())) {
        Some(missing) => Err(CategoryError::NotFound(*missing)),
        None => Ok(()),
    }
}
