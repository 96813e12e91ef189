//! Wishlist domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{UserId, WishId};

use super::error::WishlistError;

/// Where a wished-for purchase stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishStatus {
    /// Wanted, no plan yet.
    #[default]
    Wished,
    /// Planned for a date.
    Scheduled,
    /// Already bought.
    Bought,
}

impl WishStatus {
    /// Returns the stored lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wished => "wished",
            Self::Scheduled => "scheduled",
            Self::Bought => "bought",
        }
    }
}

impl fmt::Display for WishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WishStatus {
    type Err = WishlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wished" => Ok(Self::Wished),
            "scheduled" => Ok(Self::Scheduled),
            "bought" => Ok(Self::Bought),
            other => Err(WishlistError::InvalidStatus(other.to_string())),
        }
    }
}

/// A stored wishlist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    /// Item ID.
    pub id: WishId,
    /// Owner.
    pub user_id: UserId,
    /// What is wanted.
    pub item: String,
    /// Where it would be bought.
    pub vendor: Option<String>,
    /// Expected price.
    pub price: Decimal,
    /// 1 is most wanted, 10 least.
    pub priority: i32,
    /// Planning state.
    pub status: WishStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Date the purchase is planned for.
    pub planned_date: Option<NaiveDate>,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

/// Input for adding a wishlist item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWishlistItem {
    /// Owner.
    pub user_id: UserId,
    /// What is wanted.
    pub item: String,
    /// Where it would be bought.
    #[serde(default)]
    pub vendor: Option<String>,
    /// Expected price.
    pub price: Decimal,
    /// 1 to 10.
    pub priority: i32,
    /// Planning state.
    #[serde(default)]
    pub status: WishStatus,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Date the purchase is planned for.
    #[serde(default)]
    pub planned_date: Option<NaiveDate>,
}

/// Partial wishlist update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WishlistPatch {
    /// New item.
    pub item: Option<String>,
    /// New vendor.
    pub vendor: Option<String>,
    /// New price.
    pub price: Option<Decimal>,
    /// New priority.
    pub priority: Option<i32>,
    /// New status.
    pub status: Option<WishStatus>,
    /// New notes.
    pub notes: Option<String>,
    /// New planned date.
    pub planned_date: Option<NaiveDate>,
}

impl WishlistPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item.is_none()
            && self.vendor.is_none()
            && self.price.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.notes.is_none()
            && self.planned_date.is_none()
    }
}
