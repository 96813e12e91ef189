//! Wishlist repository.
//!
//! Wishlist items are independent of expenses, so no write here touches a
//! budget.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tally_core::wishlist::{NewWishlistItem, WishlistItem, WishlistPatch};
use tally_shared::AppError;
use tally_shared::types::{PageRequest, UserId, WishId};
use tracing::info;

use crate::entities::{users, wishlist};

/// Error types for wishlist operations.
#[derive(Debug, thiserror::Error)]
pub enum WishlistError {
    /// Input failed validation.
    #[error(transparent)]
    Invalid(#[from] tally_core::wishlist::WishlistError),

    /// Wishlist item not found.
    #[error("Wishlist item not found: {0}")]
    NotFound(WishId),

    /// Owner not found.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<WishlistError> for AppError {
    fn from(err: WishlistError) -> Self {
        match err {
            WishlistError::Invalid(e) => e.into(),
            WishlistError::NotFound(_) | WishlistError::UserNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            WishlistError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Wishlist repository.
#[derive(Debug, Clone)]
pub struct WishlistRepository {
    db: DatabaseConnection,
}

impl WishlistRepository {
    /// Creates a new wishlist repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds an item to a user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for bad input, `UserNotFound` for an unknown owner.
    pub async fn create_item(
        &self,
        input: &NewWishlistItem,
    ) -> Result<WishlistItem, WishlistError> {
        let input = input.validated()?;

        if users::Entity::find_by_id(input.user_id.into_inner())
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(WishlistError::UserNotFound(input.user_id));
        }

        let model = wishlist::ActiveModel {
            id: Set(WishId::new().into_inner()),
            user_id: Set(input.user_id.into_inner()),
            item: Set(input.item),
            vendor: Set(input.vendor),
            price: Set(input.price),
            priority: Set(input.priority),
            status: Set(input.status.into()),
            notes: Set(input.notes),
            planned_date: Set(input.planned_date),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!(wish_id = %model.id, priority = model.priority, "Wishlist item created");
        Ok(to_domain(model))
    }

    /// Gets a wishlist item.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_item(&self, id: WishId) -> Result<Option<WishlistItem>, DbErr> {
        Ok(wishlist::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(to_domain))
    }

    /// Lists wishlist items, most wanted (lowest priority number) first.
    ///
    /// Items with equal priority keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_items(
        &self,
        user_id: Option<UserId>,
        page: PageRequest,
    ) -> Result<Vec<WishlistItem>, DbErr> {
        let mut query = wishlist::Entity::find();
        if let Some(user_id) = user_id {
            query = query.filter(wishlist::Column::UserId.eq(user_id.into_inner()));
        }

        let models = query
            .order_by_asc(wishlist::Column::Priority)
            .order_by_asc(wishlist::Column::CreatedAt)
            .order_by_asc(wishlist::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a bad or empty patch, `NotFound` if the item
    /// does not exist.
    pub async fn update_item(
        &self,
        id: WishId,
        patch: &WishlistPatch,
    ) -> Result<WishlistItem, WishlistError> {
        let patch = patch.validated()?;

        let existing = wishlist::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(WishlistError::NotFound(id))?;

        let mut active: wishlist::ActiveModel = existing.into();
        if let Some(item) = patch.item {
            active.item = Set(item);
        }
        if let Some(vendor) = patch.vendor {
            active.vendor = Set(Some(vendor));
        }
        if let Some(price) = patch.price {
            active.price = Set(price);
        }
        if let Some(priority) = patch.priority {
            active.priority = Set(priority);
        }
        if let Some(status) = patch.status {
            active.status = Set(status.into());
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(date) = patch.planned_date {
            active.planned_date = Set(Some(date));
        }
        let model = active.update(&self.db).await?;

        info!(wish_id = %id, "Wishlist item updated");
        Ok(to_domain(model))
    }

    /// Deletes a wishlist item. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete_item(&self, id: WishId) -> Result<bool, DbErr> {
        let result = wishlist::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

fn to_domain(model: wishlist::Model) -> WishlistItem {
    WishlistItem {
        id: WishId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        item: model.item,
        vendor: model.vendor,
        price: model.price,
        priority: model.priority,
        status: model.status.into(),
        notes: model.notes,
        planned_date: model.planned_date,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(WishlistError::NotFound(WishId::new()), 404)]
    #[case(WishlistError::UserNotFound(UserId::new()), 404)]
    #[case(
        WishlistError::Invalid(tally_core::wishlist::WishlistError::PriorityOutOfRange(0)),
        400
    )]
    #[case(WishlistError::Database(DbErr::Custom("down".into())), 500)]
    fn test_wishlist_errors_map_to_status(#[case] err: WishlistError, #[case] status: u16) {
        assert_eq!(AppError::from(err).status_code(), status);
    }
}
