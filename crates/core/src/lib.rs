//! Core budget logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Storage is reached only through the async traits in [`budget::store`].
//!
//! # Modules
//!
//! - `budget` - Period calculation, spend recalculation and budget lifecycle
//! - `expense` - Expense validation and the recalculation cascade it triggers
//! - `user` - Username and email rules
//! - `wishlist` - Planned purchases ranked by priority

pub mod budget;
pub mod expense;
pub mod user;
pub mod wishlist;
