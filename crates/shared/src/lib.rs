//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for users, categories, expenses and budgets
//! - Monetary bounds shared by expenses and budget caps
//! - `skip`/`limit` pagination for list queries
//! - Application-wide error type
//! - Configuration loading and tracing bootstrap

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::AppConfig;
pub use error::AppError;
