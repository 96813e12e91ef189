//! Database-backed enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored timeframe kind of a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TimeframeKind {
    /// Yearly recurrence.
    #[sea_orm(string_value = "yearly")]
    Yearly,
    /// Monthly recurrence.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Weekly recurrence.
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Fixed window.
    #[sea_orm(string_value = "custom")]
    Custom,
}

impl From<tally_core::budget::TimeframeKind> for TimeframeKind {
    fn from(kind: tally_core::budget::TimeframeKind) -> Self {
        use tally_core::budget::TimeframeKind as Core;
        match kind {
            Core::Yearly => Self::Yearly,
            Core::Monthly => Self::Monthly,
            Core::Weekly => Self::Weekly,
            Core::Custom => Self::Custom,
        }
    }
}

impl From<TimeframeKind> for tally_core::budget::TimeframeKind {
    fn from(kind: TimeframeKind) -> Self {
        match kind {
            TimeframeKind::Yearly => Self::Yearly,
            TimeframeKind::Monthly => Self::Monthly,
            TimeframeKind::Weekly => Self::Weekly,
            TimeframeKind::Custom => Self::Custom,
        }
    }
}

/// Stored planning state of a wishlist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum WishStatus {
    /// Wanted, no plan yet.
    #[sea_orm(string_value = "wished")]
    Wished,
    /// Planned for a date.
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// Already bought.
    #[sea_orm(string_value = "bought")]
    Bought,
}

impl From<tally_core::wishlist::WishStatus> for WishStatus {
    fn from(status: tally_core::wishlist::WishStatus) -> Self {
        use tally_core::wishlist::WishStatus as Core;
        match status {
            Core::Wished => Self::Wished,
            Core::Scheduled => Self::Scheduled,
            Core::Bought => Self::Bought,
        }
    }
}

impl From<WishStatus> for tally_core::wishlist::WishStatus {
    fn from(status: WishStatus) -> Self {
        match status {
            WishStatus::Wished => Self::Wished,
            WishStatus::Scheduled => Self::Scheduled,
            WishStatus::Bought => Self::Bought,
        }
    }
}
