//! Integration tests for the Wishlist repository.

mod common;

use common::{TestContext, date};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_core::wishlist::{NewWishlistItem, WishStatus, WishlistPatch};
use tally_db::repositories::WishlistError;
use tally_db::{UserRepository, WishlistRepository};
use tally_shared::types::{PageRequest, UserId, WishId};

fn wish(user_id: UserId, item: &str, price: Decimal, priority: i32) -> NewWishlistItem {
    NewWishlistItem {
        user_id,
        item: item.to_string(),
        vendor: None,
        price,
        priority,
        status: WishStatus::Wished,
        notes: None,
        planned_date: None,
    }
}

#[tokio::test]
async fn test_list_orders_by_priority() {
    let ctx = TestContext::new(date(2024, 3, 15)).await;
    let repo = WishlistRepository::new(ctx.db.clone());

    for (item, priority) in [("Bike", 5), ("Tent", 1), ("Lamp", 9), ("Boots", 1)] {
        repo.create_item(&wish(ctx.user, item, dec!(80), priority))
            .await
            .expect("Failed to create wishlist item");
    }

    let items: Vec<(String, i32)> = repo
        .list_items(Some(ctx.user), PageRequest::default())
        .await
        .expect("Failed to list wishlist")
        .into_iter()
        .map(|w| (w.item, w.priority))
        .collect();
    assert_eq!(
        items,
        vec![
            ("Tent".to_string(), 1),
            ("Boots".to_string(), 1),
            ("Bike".to_string(), 5),
            ("Lamp".to_string(), 9),
        ]
    );

    let page = repo
        .list_items(Some(ctx.user), PageRequest::new(1, 2))
        .await
        .expect("Failed to list wishlist");
    let names: Vec<&str> = page.iter().map(|w| w.item.as_str()).collect();
    assert_eq!(names, vec!["Boots", "Bike"]);

    let stranger = repo
        .list_items(Some(UserId::new()), PageRequest::default())
        .await
        .expect("Failed to list wishlist");
    assert!(stranger.is_empty());
}

#[tokio::test]
async fn test_create_validates_input_and_owner() {
    let ctx = TestContext::new(date(2024, 3, 15)).await;
    let repo = WishlistRepository::new(ctx.db.clone());

    let created = repo
        .create_item(&NewWishlistItem {
            vendor: Some(" <i>Outdoor Co</i> ".into()),
            notes: Some("   ".into()),
            ..wish(ctx.user, "  Stove ", dec!(45.50), 2)
        })
        .await
        .expect("Failed to create wishlist item");
    assert_eq!(created.item, "Stove");
    assert_eq!(created.vendor.as_deref(), Some("iOutdoor Co/i"));
    assert_eq!(created.notes, None);

    let bad_priority = repo.create_item(&wish(ctx.user, "Kayak", dec!(900), 11)).await;
    assert!(matches!(
        bad_priority,
        Err(WishlistError::Invalid(
            tally_core::wishlist::WishlistError::PriorityOutOfRange(11)
        ))
    ));

    let bad_price = repo.create_item(&wish(ctx.user, "Kayak", dec!(0), 3)).await;
    assert!(matches!(bad_price, Err(WishlistError::Invalid(_))));

    let stranger = UserId::new();
    let orphan = repo.create_item(&wish(stranger, "Kayak", dec!(900), 3)).await;
    assert!(matches!(orphan, Err(WishlistError::UserNotFound(id)) if id == stranger));
}

#[tokio::test]
async fn test_update_and_delete_item() {
    let ctx = TestContext::new(date(2024, 3, 15)).await;
    let repo = WishlistRepository::new(ctx.db.clone());

    let item = repo
        .create_item(&wish(ctx.user, "Camera", dec!(650), 4))
        .await
        .expect("Failed to create wishlist item");

    let patch = WishlistPatch {
        status: Some(WishStatus::Scheduled),
        planned_date: Some(date(2024, 6, 1)),
        priority: Some(2),
        ..WishlistPatch::default()
    };
    let updated = repo
        .update_item(item.id, &patch)
        .await
        .expect("Failed to update wishlist item");
    assert_eq!(updated.status, WishStatus::Scheduled);
    assert_eq!(updated.planned_date, Some(date(2024, 6, 1)));
    assert_eq!(updated.priority, 2);
    assert_eq!(updated.price, dec!(650));

    let stored = repo
        .get_item(item.id)
        .await
        .expect("Failed to get wishlist item")
        .expect("Item should exist");
    assert_eq!(stored, updated);

    let empty = repo.update_item(item.id, &WishlistPatch::default()).await;
    assert!(matches!(empty, Err(WishlistError::Invalid(_))));

    let missing = repo.update_item(WishId::new(), &patch).await;
    assert!(matches!(missing, Err(WishlistError::NotFound(_))));

    assert!(repo.delete_item(item.id).await.expect("Failed to delete"));
    assert!(!repo.delete_item(item.id).await.expect("Failed to delete"));
    assert!(
        repo.get_item(item.id)
            .await
            .expect("Failed to get wishlist item")
            .is_none()
    );
}

#[tokio::test]
async fn test_deleting_user_removes_wishlist() {
    let ctx = TestContext::new(date(2024, 3, 15)).await;
    let repo = WishlistRepository::new(ctx.db.clone());
    let users = UserRepository::new(ctx.db.clone());

    let other = users
        .create("other_user", "other@example.com")
        .await
        .expect("Failed to create user");
    let other_id = UserId::from_uuid(other.id);

    repo.create_item(&wish(ctx.user, "Desk", dec!(300), 3))
        .await
        .expect("Failed to create wishlist item");
    repo.create_item(&wish(other_id, "Chair", dec!(120), 3))
        .await
        .expect("Failed to create wishlist item");

    assert!(users.delete(ctx.user).await.expect("Failed to delete user"));

    let all = repo
        .list_items(None, PageRequest::default())
        .await
        .expect("Failed to list wishlist");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].user_id, other_id);
}
