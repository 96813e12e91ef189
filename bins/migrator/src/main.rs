//! Database migration runner for Tally.
//!
//! Reads `DATABASE_URL` (or `-u <url>`), then runs one of:
//!   migrator up       - Run all pending migrations
//!   migrator down     - Rollback last migration
//!   migrator status   - Show migration status
//!   migrator fresh    - Drop all tables and re-run migrations
//!   migrator refresh  - Rollback all migrations, then re-apply them
//!   migrator reset    - Rollback all migrations

use sea_orm_migration::prelude::*;
use tally_db::migration::Migrator;

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Run the migrator CLI (it sets up its own tracing)
    cli::run_cli(Migrator).await;
}
