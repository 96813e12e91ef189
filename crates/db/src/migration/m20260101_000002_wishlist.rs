//! Wishlist migration.
//!
//! Creates the wishlist table for planned purchases.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(WISHLIST_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS wishlist CASCADE;")
            .await?;
        Ok(())
    }
}

const WISHLIST_SQL: &str = r"
CREATE TABLE wishlist (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    item VARCHAR(255) NOT NULL,
    vendor VARCHAR(255),
    price NUMERIC(12, 2) NOT NULL,
    priority INTEGER NOT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'wished',
    notes TEXT,
    planned_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_wishlist_price CHECK (price > 0 AND price <= 999999.99),
    CONSTRAINT chk_wishlist_priority CHECK (priority BETWEEN 1 AND 10),
    CONSTRAINT chk_wishlist_status CHECK (status IN ('wished', 'scheduled', 'bought'))
);

-- Listing is by owner, most wanted first
CREATE INDEX idx_wishlist_user_priority ON wishlist(user_id, priority);
";
