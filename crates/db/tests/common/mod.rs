//! Shared setup for repository tests: an in-memory SQLite database with the
//! schema generated from the entities.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait, Schema};
use tally_core::budget::{CreateBudgetInput, TimeframeInput, TimeframeKind};
use tally_core::expense::NewExpense;
use tally_db::entities::{budgets, categories, expense_categories, expenses, users, wishlist};
use tally_db::{BudgetRepository, CategoryRepository, ExpenseRepository, UserRepository};
use tally_shared::types::{CategoryId, UserId};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) {
    let schema = Schema::new(DbBackend::Sqlite);
    let stmt = db.get_database_backend().build(&schema.create_table_from_entity(entity));
    db.execute(stmt).await.expect("Failed to create table");
}

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to database");

    create_table(&db, users::Entity).await;
    create_table(&db, categories::Entity).await;
    create_table(&db, expenses::Entity).await;
    create_table(&db, expense_categories::Entity).await;
    create_table(&db, budgets::Entity).await;
    create_table(&db, wishlist::Entity).await;

    db
}

/// Database with one user and one category, and repositories pinned to `today`.
pub struct TestContext {
    pub db: DatabaseConnection,
    pub user: UserId,
    pub category: CategoryId,
    pub today: NaiveDate,
}

impl TestContext {
    pub async fn new(today: NaiveDate) -> Self {
        let db = setup_db().await;

        let user = UserRepository::new(db.clone())
            .create("tester", "tester@example.com")
            .await
            .expect("Failed to create user");
        let category = CategoryRepository::new(db.clone())
            .get_or_create("Groceries")
            .await
            .expect("Failed to create category");

        Self {
            db,
            user: UserId::from_uuid(user.id),
            category: CategoryId::from_uuid(category.id),
            today,
        }
    }

    pub fn expenses(&self) -> ExpenseRepository {
        ExpenseRepository::new(self.db.clone()).with_today(self.today)
    }

    pub fn budgets(&self) -> BudgetRepository {
        BudgetRepository::new(self.db.clone()).with_today(self.today)
    }

    pub fn new_expense(&self, amount: Decimal, on: NaiveDate) -> NewExpense {
        NewExpense {
            user_id: self.user,
            item: "Weekly shop".to_string(),
            vendor: "Corner Market".to_string(),
            amount,
            date_purchased: on,
            payment_method: Some("card".to_string()),
            notes: None,
            category_ids: vec![self.category],
            new_categories: Vec::new(),
        }
    }

    pub fn monthly_budget(&self, max_spend: Decimal) -> CreateBudgetInput {
        CreateBudgetInput {
            user_id: self.user,
            category_id: self.category,
            max_spend,
            future_spend: None,
            timeframe: TimeframeInput::recurring(TimeframeKind::Monthly, 1, date(2024, 1, 1)),
        }
    }
}
