//! Wishlist error types.

use rust_decimal::Decimal;
use thiserror::Error;
use tally_shared::AppError;

/// Wishlist validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WishlistError {
    /// Price not in `(0, 999,999.99]` or finer than cents.
    #[error("Price must be between 0.01 and 999999.99: {0}")]
    PriceOutOfRange(Decimal),

    /// Priority outside 1 to 10.
    #[error("Priority must be between 1 and 10: {0}")]
    PriorityOutOfRange(i32),

    /// Status string other than wished, scheduled or bought.
    #[error("Invalid status: {0:?}")]
    InvalidStatus(String),

    /// Item empty after sanitization.
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

    /// Update that sets no field.
    #[error("Update must change at least one field")]
    EmptyPatch,
}

impl From<WishlistError> for AppError {
    fn from(err: WishlistError) -> Self {
        Self::Validation(err.to_string())
    }
}
