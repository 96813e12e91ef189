//! Expense error types.

use rust_decimal::Decimal;
use thiserror::Error;
use tally_shared::AppError;

/// Expense validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseError {
    /// Amount not in `(0, 999,999.99]` or finer than cents.
    #[error("Amount must be between 0.01 and 999999.99: {0}")]
    AmountOutOfRange(Decimal),

    /// Required text field empty after sanitization.
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// Text field longer than its limit after sanitization.
    #[error("Field '{field}' exceeds {max} characters")]
    FieldTooLong {
        /// Field name.
        field: &'static str,
        /// Character limit.
        max: usize,
    },

    /// Category name empty or too long after normalization.
    #[error("Invalid category name: {0:?}")]
    InvalidCategoryName(String),

    /// Update that sets no field and links no category.
    #[error("Update must change at least one field")]
    EmptyPatch,
}

impl From<ExpenseError> for AppError {
    fn from(err: ExpenseError) -> Self {
        Self::Validation(err.to_string())
    }
}
