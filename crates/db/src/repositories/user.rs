//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use tally_core::user::{UserPatch, normalize_email, validate_username};
use tally_shared::AppError;
use tally_shared::types::UserId;
use tracing::info;
use uuid::Uuid;

use crate::entities::{budgets, expense_categories, expenses, users, wishlist};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Username or email rejected.
    #[error(transparent)]
    Invalid(#[from] tally_core::user::UserError),

    /// User not found.
    #[error("User not found: {0}")]
    NotFound(UserId),

    /// Another user already has this email.
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Invalid(e) => e.into(),
            UserError::NotFound(_) => Self::NotFound(err.to_string()),
            UserError::EmailTaken(_) => Self::Conflict(err.to_string()),
            UserError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// User repository. Users only exist as owners of expenses, budgets and
/// wishlist items.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email, compared after trimming and lowercasing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id.into_inner()).one(&self.db).await
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a bad username or email, `EmailTaken` if the
    /// email is already registered.
    pub async fn create(&self, username: &str, email: &str) -> Result<users::Model, UserError> {
        let username = validate_username(username)?;
        let email = normalize_email(email)?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(UserError::EmailTaken(email));
        }

        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            username: Set(username),
            email: Set(email),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Changes a user's username and/or email.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a bad or empty patch, `NotFound` if the user
    /// does not exist, `EmailTaken` if another user has the new email.
    pub async fn update(&self, id: UserId, patch: &UserPatch) -> Result<users::Model, UserError> {
        let patch = patch.validated()?;

        let existing = self.find_by_id(id).await?.ok_or(UserError::NotFound(id))?;

        if let Some(email) = &patch.email
            && let Some(other) = self.find_by_email(email).await?
            && other.id != existing.id
        {
            return Err(UserError::EmailTaken(email.clone()));
        }

        let mut active: users::ActiveModel = existing.into();
        if let Some(username) = patch.username {
            active.username = Set(username);
        }
        if let Some(email) = patch.email {
            active.email = Set(email);
        }
        let user = active.update(&self.db).await?;

        info!(user_id = %id, "User updated");
        Ok(user)
    }

    /// Deletes a user with everything they own: expenses and their category
    /// links, budgets, and wishlist items. Returns `false` if no such user
    /// exists.
    ///
    /// Other users' budgets never count this user's expenses, so nothing is
    /// recalculated.
    ///
    /// # Errors
    ///
    /// Returns an error if any delete fails; the whole unit is rolled back.
    pub async fn delete(&self, id: UserId) -> Result<bool, UserError> {
        let txn = self.db.begin().await?;
        let owner = id.into_inner();

        let expense_ids: Vec<Uuid> = expenses::Entity::find()
            .select_only()
            .column(expenses::Column::Id)
            .filter(expenses::Column::UserId.eq(owner))
            .into_tuple()
            .all(&txn)
            .await?;

        expense_categories::Entity::delete_many()
            .filter(expense_categories::Column::ExpenseId.is_in(expense_ids))
            .exec(&txn)
            .await?;
        expenses::Entity::delete_many()
            .filter(expenses::Column::UserId.eq(owner))
            .exec(&txn)
            .await?;
        budgets::Entity::delete_many()
            .filter(budgets::Column::UserId.eq(owner))
            .exec(&txn)
            .await?;
        wishlist::Entity::delete_many()
            .filter(wishlist::Column::UserId.eq(owner))
            .exec(&txn)
            .await?;
        let result = users::Entity::delete_by_id(owner).exec(&txn).await?;

        txn.commit().await?;

        let deleted = result.rows_affected > 0;
        if deleted {
            info!(user_id = %id, "User deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(UserError::NotFound(UserId::new()), 404)]
    #[case(UserError::EmailTaken("a@b.io".into()), 409)]
    #[case(UserError::Invalid(tally_core::user::UserError::EmptyPatch), 400)]
    #[case(UserError::Database(DbErr::Custom("down".into())), 500)]
    fn test_user_errors_map_to_status(#[case] err: UserError, #[case] status: u16) {
        assert_eq!(AppError::from(err).status_code(), status);
    }
}
