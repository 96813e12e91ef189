use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_fresh_ids_are_distinct() {
    assert_ne!(ExpenseId::new(), ExpenseId::new());
}

#[test]
fn test_uuid_round_trip_through_conversions() {
    let uuid = Uuid::new_v4();
    let category = CategoryId::from(uuid);
    assert_eq!(Uuid::from(category), uuid);
    assert_eq!(category.into_inner(), uuid);
}

#[test]
fn test_display_matches_uuid() {
    let uuid = Uuid::new_v4();
    assert_eq!(BudgetId::from_uuid(uuid).to_string(), uuid.to_string());
}

#[test]
fn test_from_str() {
    let uuid = Uuid::new_v4();
    let id = UserId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id.into_inner(), uuid);
    assert!(UserId::from_str("not-a-uuid").is_err());
}
