//! Monetary bounds.
//!
//! Money is always `rust_decimal::Decimal`; floating point never touches it.
//! Expense amounts and budget caps share one range: strictly positive, at most
//! [`MAX_AMOUNT`], and no finer than a cent.

use rust_decimal::Decimal;

/// Largest amount accepted for an expense or a budget cap (999,999.99).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// Number of decimal places money is stored with.
pub const MONEY_SCALE: u32 = 2;

/// Returns true if `amount` is a storable, strictly positive monetary value.
#[must_use]
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount <= MAX_AMOUNT && amount.normalize().scale() <= MONEY_SCALE
}

/// Returns true if `cap` can be used as a budget's `max_spend`.
///
/// Same range as an expense amount.
#[must_use]
pub fn is_valid_cap(cap: Decimal) -> bool {
    is_valid_amount(cap)
}
