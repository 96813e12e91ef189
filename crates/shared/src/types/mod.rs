//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{MAX_AMOUNT, is_valid_amount, is_valid_cap};
pub use pagination::PageRequest;
