//! Wishlist input validation.
//!
//! Text goes through the same sanitizer as expenses.

use rust_decimal::Decimal;
use tally_shared::types::is_valid_amount;

use super::error::WishlistError;
use super::types::{NewWishlistItem, WishlistPatch};
use crate::expense::sanitize_text;
use crate::expense::validation::{MAX_ITEM_LEN, MAX_NOTES_LEN};

/// Most wanted.
pub const MIN_PRIORITY: i32 = 1;
/// Least wanted.
pub const MAX_PRIORITY: i32 = 10;

fn check_price(price: Decimal) -> Result<(), WishlistError> {
    if is_valid_amount(price) {
        Ok(())
    } else {
        Err(WishlistError::PriceOutOfRange(price))
    }
}

fn check_priority(priority: i32) -> Result<(), WishlistError> {
    if (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        Ok(())
    } else {
        Err(WishlistError::PriorityOutOfRange(priority))
    }
}

fn item(value: &str) -> Result<String, WishlistError> {
    let value = sanitize_text(value);
    if value.is_empty() {
        return Err(WishlistError::EmptyField("item"));
    }
    if value.chars().count() > MAX_ITEM_LEN {
        return Err(WishlistError::FieldTooLong {
            field: "item",
            max: MAX_ITEM_LEN,
        });
    }
    Ok(value)
}

fn optional(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, WishlistError> {
    let Some(value) = value.map(sanitize_text).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > max {
        return Err(WishlistError::FieldTooLong { field, max });
    }
    Ok(Some(value))
}

impl NewWishlistItem {
    /// Returns a sanitized copy, or the first rule the input breaks.
    ///
    /// # Errors
    ///
    /// Returns a `WishlistError` describing the offending field.
    pub fn validated(&self) -> Result<Self, WishlistError> {
        check_price(self.price)?;
        check_priority(self.priority)?;
        Ok(Self {
            user_id: self.user_id,
            item: item(&self.item)?,
            vendor: optional("vendor", self.vendor.as_deref(), MAX_ITEM_LEN)?,
            price: self.price,
            priority: self.priority,
            status: self.status,
            notes: optional("notes", self.notes.as_deref(), MAX_NOTES_LEN)?,
            planned_date: self.planned_date,
        })
    }
}

impl WishlistPatch {
    /// Returns a sanitized copy, or the first rule the patch breaks.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPatch` if the patch changes nothing, otherwise a
    /// `WishlistError` describing the offending field.
    pub fn validated(&self) -> Result<Self, WishlistError> {
        if self.is_empty() {
            return Err(WishlistError::EmptyPatch);
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(priority) = self.priority {
            check_priority(priority)?;
        }
        Ok(Self {
            item: self.item.as_deref().map(item).transpose()?,
            vendor: optional("vendor", self.vendor.as_deref(), MAX_ITEM_LEN)?,
            price: self.price,
            priority: self.priority,
            status: self.status,
            notes: optional("notes", self.notes.as_deref(), MAX_NOTES_LEN)?,
            planned_date: self.planned_date,
        })
    }
}
