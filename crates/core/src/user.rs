//! User input validation.
//!
//! Users only own expenses, budgets and wishlist items; the rules here cover
//! the two fields a user can set.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tally_shared::AppError;

/// Longest email address.
pub const MAX_EMAIL_LEN: usize = 255;

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,50}$").expect("username pattern is valid"));

/// User validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    /// Username not 3 to 50 letters, digits or underscores.
    #[error("Username must be 3-50 letters, digits or underscores: {0:?}")]
    InvalidUsername(String),

    /// Email without a local part and a domain, or too long.
    #[error("Invalid email: {0:?}")]
    InvalidEmail(String),

    /// Update that sets neither field.
    #[error("Update must change at least one field")]
    EmptyPatch,
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Partial user update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    /// New username.
    pub username: Option<String>,
    /// New email.
    pub email: Option<String>,
}

impl UserPatch {
    /// Returns a normalized copy, or the first rule the patch breaks.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPatch` if neither field is set, otherwise the field's
    /// validation error.
    pub fn validated(&self) -> Result<Self, UserError> {
        if self.username.is_none() && self.email.is_none() {
            return Err(UserError::EmptyPatch);
        }
        Ok(Self {
            username: self.username.as_deref().map(validate_username).transpose()?,
            email: self.email.as_deref().map(normalize_email).transpose()?,
        })
    }
}

/// Trims a username and checks it against `^[A-Za-z0-9_]{3,50}$`.
///
/// # Errors
///
/// Returns `InvalidUsername` if the trimmed name does not match.
pub fn validate_username(username: &str) -> Result<String, UserError> {
    let username = username.trim();
    if USERNAME.is_match(username) {
        Ok(username.to_string())
    } else {
        Err(UserError::InvalidUsername(username.to_string()))
    }
}

/// Trims and lowercases an email, requiring `local@domain.tld`.
///
/// # Errors
///
/// Returns `InvalidEmail` for a malformed or over-long address.
pub fn normalize_email(email: &str) -> Result<String, UserError> {
    let email = email.trim().to_lowercase();
    let valid = email.len() <= MAX_EMAIL_LEN
        && !email.chars().any(char::is_whitespace)
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        });
    if valid {
        Ok(email)
    } else {
        Err(UserError::InvalidEmail(email))
    }
}
