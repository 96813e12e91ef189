//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - `SeaStore`, the storage backend of the budget recalculation engine
//! - Repositories whose expense mutations cascade into budget recalculation,
//!   plus owner, category and wishlist maintenance
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod store;

pub use repositories::{
    BudgetRepository, CategoryRepository, ExpenseFilter, ExpenseRepository, ReportRepository,
    UserRepository, WishlistRepository,
};
pub use store::SeaStore;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tally_shared::config::DatabaseConfig;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(config.sqlx_logging);

    tracing::debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connecting to database"
    );
    Database::connect(options).await
}
