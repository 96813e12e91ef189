//! Expenses: input validation and the budget cascade they trigger.

pub mod error;
pub mod triggers;
pub mod types;
pub mod validation;

pub use error::ExpenseError;
pub use triggers::ExpenseMutation;
pub use types::{Expense, ExpensePatch, NewExpense};
pub use validation::{normalize_category_name, sanitize_text};
