//! Initial database migration.
//!
//! Creates users, categories, expenses, the expense/category link table and
//! budgets, with the CHECK constraints that back the budget invariants.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: OWNERS AND CATEGORIES
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(CATEGORIES_SQL).await?;

        // ============================================================
        // PART 2: EXPENSES
        // ============================================================
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(EXPENSE_CATEGORIES_SQL).await?;

        // ============================================================
        // PART 3: BUDGETS
        // ============================================================
        db.execute_unprepared(BUDGETS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(100) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const CATEGORIES_SQL: &str = r"
-- Names are matched exactly after trimming and sanitizing
CREATE TABLE categories (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(100) NOT NULL UNIQUE,
    CONSTRAINT chk_category_name_not_blank CHECK (length(trim(name)) > 0)
);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    item VARCHAR(255) NOT NULL,
    vendor VARCHAR(255) NOT NULL,
    amount NUMERIC(12, 2) NOT NULL,
    date_purchased DATE NOT NULL,
    payment_method VARCHAR(100),
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_expense_amount CHECK (amount > 0 AND amount <= 999999.99)
);

-- Spend aggregation filters by owner and purchase date
CREATE INDEX idx_expenses_user_date ON expenses(user_id, date_purchased);
";

const EXPENSE_CATEGORIES_SQL: &str = r"
CREATE TABLE expense_categories (
    expense_id UUID NOT NULL REFERENCES expenses(id) ON DELETE CASCADE,
    category_id UUID NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    PRIMARY KEY (expense_id, category_id)
);

CREATE INDEX idx_expense_categories_category ON expense_categories(category_id);
";

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    category_id UUID NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    max_spend NUMERIC(12, 2) NOT NULL,
    current_spend NUMERIC(12, 2) NOT NULL DEFAULT 0,
    future_spend NUMERIC(12, 2) NOT NULL DEFAULT 0,
    is_over_max BOOLEAN NOT NULL DEFAULT false,
    -- Snapshot of the window at last recalculation; authoritative for custom
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    timeframe_kind VARCHAR(16) NOT NULL,
    timeframe_interval INTEGER,
    recurring_start_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_budget_kind CHECK (timeframe_kind IN ('yearly', 'monthly', 'weekly', 'custom')),
    CONSTRAINT chk_budget_interval CHECK (
        (timeframe_kind = 'custom' AND timeframe_interval IS NULL)
        OR (timeframe_kind <> 'custom' AND timeframe_interval BETWEEN 1 AND 100
            AND recurring_start_date IS NOT NULL)
    ),
    CONSTRAINT chk_budget_max_spend CHECK (max_spend > 0),
    CONSTRAINT chk_budget_current_spend CHECK (current_spend >= 0),
    CONSTRAINT chk_budget_future_spend CHECK (future_spend >= 0),
    CONSTRAINT chk_budget_window CHECK (end_date >= start_date)
);

-- Recalculation looks budgets up by owner and category
CREATE INDEX idx_budgets_user_category ON budgets(user_id, category_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS budgets CASCADE;
DROP TABLE IF EXISTS expense_categories CASCADE;
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS categories CASCADE;
DROP TABLE IF EXISTS users CASCADE;
";
