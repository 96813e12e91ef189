//! Expense domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{CategoryId, ExpenseId, UserId};

/// A stored expense with its category links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Owner.
    pub user_id: UserId,
    /// What was bought.
    pub item: String,
    /// Where it was bought.
    pub vendor: String,
    /// Price, positive with at most two decimals.
    pub amount: Decimal,
    /// Purchase date; decides which budget window the expense counts in.
    pub date_purchased: NaiveDate,
    /// Payment method.
    pub payment_method: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
    /// Linked categories.
    pub category_ids: Vec<CategoryId>,
}

/// Input for recording an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    /// Owner.
    pub user_id: UserId,
    /// What was bought.
    pub item: String,
    /// Where it was bought.
    pub vendor: String,
    /// Price.
    pub amount: Decimal,
    /// Purchase date.
    pub date_purchased: NaiveDate,
    /// Payment method.
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Existing categories to link.
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    /// Category names to look up or create, then link.
    #[serde(default)]
    pub new_categories: Vec<String>,
}

/// Partial expense update; `None` keeps the stored value.
///
/// Categories listed here are linked in addition to the existing ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpensePatch {
    /// New item.
    pub item: Option<String>,
    /// New vendor.
    pub vendor: Option<String>,
    /// New price.
    pub amount: Option<Decimal>,
    /// New purchase date.
    pub date_purchased: Option<NaiveDate>,
    /// New payment method.
    pub payment_method: Option<String>,
    /// New notes.
    pub notes: Option<String>,
    /// Existing categories to link.
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    /// Category names to look up or create, then link.
    #[serde(default)]
    pub new_categories: Vec<String>,
}

impl ExpensePatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item.is_none()
            && self.vendor.is_none()
            && self.amount.is_none()
            && self.date_purchased.is_none()
            && self.payment_method.is_none()
            && self.notes.is_none()
            && self.category_ids.is_empty()
            && self.new_categories.is_empty()
    }
}
