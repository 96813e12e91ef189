//! Expense input sanitization and validation.

use std::sync::LazyLock;

use regex::Regex;
use tally_shared::types::{CategoryId, is_valid_amount};

use super::error::ExpenseError;
use super::types::{ExpensePatch, NewExpense};

/// Longest item or vendor.
pub const MAX_ITEM_LEN: usize = 255;
/// Longest payment method.
pub const MAX_PAYMENT_METHOD_LEN: usize = 100;
/// Longest notes.
pub const MAX_NOTES_LEN: usize = 1000;
/// Longest category name.
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

const SQL_FRAGMENT_PATTERN: &str = r"(?i)\b(?:SELECT|INSERT|UPDATE|DELETE|DROP|CREATE|ALTER|EXEC|UNION)\b|\b(?:OR|AND)\b\s+\d+\s*(?:=\s*\d+|(?:NOT\s+)?IN\s*\([^)]*\)|BETWEEN\s+\d+\s+AND\s+\d+|IS\s+(?:NOT\s+)?NULL|(?:NOT\s+)?EXISTS\s*\([^)]*\))";

static SQL_FRAGMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SQL_FRAGMENT_PATTERN).expect("SQL fragment pattern is valid"));

/// Strips markup characters and SQL keyword fragments, then trims.
#[must_use]
pub fn sanitize_text(text: &str) -> String {
    let stripped = text.replace(['<', '>', '"', '\''], "");
    SQL_FRAGMENTS.replace_all(&stripped, "").trim().to_string()
}

/// Normalizes a category name for exact-match lookup.
///
/// # Errors
///
/// Returns `InvalidCategoryName` if the name is empty or longer than 100
/// characters after sanitization.
pub fn normalize_category_name(name: &str) -> Result<String, ExpenseError> {
    let normalized = sanitize_text(name);
    let len = normalized.chars().count();
    if len == 0 || len > MAX_CATEGORY_NAME_LEN {
        return Err(ExpenseError::InvalidCategoryName(name.to_string()));
    }
    Ok(normalized)
}

fn required(field: &'static str, value: &str, max: usize) -> Result<String, ExpenseError> {
    let value = sanitize_text(value);
    if value.is_empty() {
        return Err(ExpenseError::EmptyField(field));
    }
    if value.chars().count() > max {
        return Err(ExpenseError::FieldTooLong { field, max });
    }
    Ok(value)
}

fn optional(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ExpenseError> {
    let Some(value) = value.map(sanitize_text).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > max {
        return Err(ExpenseError::FieldTooLong { field, max });
    }
    Ok(Some(value))
}

fn check_amount(amount: rust_decimal::Decimal) -> Result<(), ExpenseError> {
    if is_valid_amount(amount) {
        Ok(())
    } else {
        Err(ExpenseError::AmountOutOfRange(amount))
    }
}

/// Blank names are skipped; the rest are normalized, duplicates dropped.
fn category_names(names: &[String]) -> Result<Vec<String>, ExpenseError> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names.iter().filter(|n| !n.trim().is_empty()) {
        let name = normalize_category_name(name)?;
        if !out.contains(&name) {
            out.push(name);
        }
    }
    Ok(out)
}

fn unique_ids(ids: &[CategoryId]) -> Vec<CategoryId> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

impl NewExpense {
    /// Returns a sanitized copy, or the first rule the input breaks.
    ///
    /// # Errors
    ///
    /// Returns an `ExpenseError` describing the offending field.
    pub fn validated(&self) -> Result<Self, ExpenseError> {
        check_amount(self.amount)?;
        Ok(Self {
            user_id: self.user_id,
            item: required("item", &self.item, MAX_ITEM_LEN)?,
            vendor: required("vendor", &self.vendor, MAX_ITEM_LEN)?,
            amount: self.amount,
            date_purchased: self.date_purchased,
            payment_method: optional(
                "payment_method",
                self.payment_method.as_deref(),
                MAX_PAYMENT_METHOD_LEN,
            )?,
            notes: optional("notes", self.notes.as_deref(), MAX_NOTES_LEN)?,
            category_ids: unique_ids(&self.category_ids),
            new_categories: category_names(&self.new_categories)?,
        })
    }
}

impl ExpensePatch {
    /// Returns a sanitized copy, or the first rule the patch breaks.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPatch` if the patch changes nothing, otherwise an
    /// `ExpenseError` describing the offending field.
    pub fn validated(&self) -> Result<Self, ExpenseError> {
        if self.is_empty() {
            return Err(ExpenseError::EmptyPatch);
        }
        if let Some(amount) = self.amount {
            check_amount(amount)?;
        }
        Ok(Self {
            item: self
                .item
                .as_deref()
                .map(|v| required("item", v, MAX_ITEM_LEN))
                .transpose()?,
            vendor: self
                .vendor
                .as_deref()
                .map(|v| required("vendor", v, MAX_ITEM_LEN))
                .transpose()?,
            amount: self.amount,
            date_purchased: self.date_purchased,
            payment_method: optional(
                "payment_method",
                self.payment_method.as_deref(),
                MAX_PAYMENT_METHOD_LEN,
            )?,
            notes: optional("notes", self.notes.as_deref(), MAX_NOTES_LEN)?,
            category_ids: unique_ids(&self.category_ids),
            new_categories: category_names(&self.new_categories)?,
        })
    }
}
