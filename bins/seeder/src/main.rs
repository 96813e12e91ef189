//! Database seeder for Tally development and testing.
//!
//! Seeds a default user, a set of spending categories and one monthly budget
//! per category. Purchases can then be imported from a tab-separated file or
//! generated at random; both go through the expense repository, so budgets
//! are recalculated as they would be in production.
//!
//! Usage: seeder [--import <file.tsv>] [--count <N>]

mod import;

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use clap::Parser;
use fake::Fake;
use fake::faker::lorem::en::Sentence;
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tally_core::budget::{CreateBudgetInput, TimeframeInput, TimeframeKind, default_anchor};
use tally_core::expense::NewExpense;
use tally_db::{BudgetRepository, CategoryRepository, ExpenseRepository, UserRepository};
use tally_shared::types::{CategoryId, PageRequest, UserId};
use tally_shared::{AppConfig, logging};
use tracing::{info, warn};

const DEFAULT_USERNAME: &str = "default_user";
const DEFAULT_EMAIL: &str = "default@example.com";

const CATEGORIES: &[&str] = &[
    "Gift",
    "Student Loans",
    "Entertainment",
    "Education",
    "Vacation",
    "Bills",
    "Pets",
    "Groceries",
    "Public Transit",
    "Hobbies",
    "Fashion",
    "Parking",
    "Charity",
    "Restaurant",
    "Gasoline",
    "Banking fees",
];

const VENDORS: &[&str] = &[
    "Ticketmaster",
    "Amazon",
    "Canadian Tire",
    "Telus",
    "Sobeys",
    "Presto",
    "City of Toronto",
    "Walmart",
    "Shoppers Drug Mart",
    "Freshco",
    "Petro",
    "Ikea",
    "Dollarama",
    "Spotify",
    "Tim Hortons",
    "Loblaws",
];

const PAYMENT_METHODS: &[&str] = &[
    "Bank A Debit",
    "Bank A Credit",
    "Bank B Debit",
    "Bank B Credit",
    "Cash",
];

/// Monthly cap given to every seeded budget.
const SEED_BUDGET_CAP: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Seeds the database, then optionally adds purchases.
#[derive(Debug, Parser)]
#[command(name = "seeder")]
#[command(about = "Seeds Tally with a default user, categories and budgets")]
struct Args {
    /// Tab-separated purchase file to import
    #[arg(long)]
    import: Option<PathBuf>,

    /// Number of random purchases to generate
    #[arg(long, default_value_t = 0)]
    count: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging);

    let db = tally_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let today = Utc::now().date_naive();

    let user = seed_default_user(&db).await?;
    let categories = seed_categories(&db).await?;
    seed_budgets(&db, user, &categories, today).await?;

    if let Some(path) = &args.import {
        import_purchases(&db, user, path, today).await?;
    }
    if args.count > 0 {
        generate_purchases(&db, user, args.count, today).await?;
    }

    info!("Seeding complete");
    Ok(())
}

/// Seeds the default user, reusing it when it already exists.
async fn seed_default_user(db: &DatabaseConnection) -> anyhow::Result<UserId> {
    let users = UserRepository::new(db.clone());

    if let Some(existing) = users.find_by_email(DEFAULT_EMAIL).await? {
        info!(user_id = %existing.id, "Default user already exists, skipping");
        return Ok(UserId::from_uuid(existing.id));
    }

    let user = users.create(DEFAULT_USERNAME, DEFAULT_EMAIL).await?;
    info!(user_id = %user.id, "Created default user");
    Ok(UserId::from_uuid(user.id))
}

async fn seed_categories(db: &DatabaseConnection) -> anyhow::Result<Vec<CategoryId>> {
    let repo = CategoryRepository::new(db.clone());

    let mut ids = Vec::with_capacity(CATEGORIES.len());
    for name in CATEGORIES {
        let category = repo.get_or_create(name).await?;
        ids.push(CategoryId::from_uuid(category.id));
    }

    info!(count = ids.len(), "Seeded categories");
    Ok(ids)
}

/// Gives every category without a budget a monthly one.
async fn seed_budgets(
    db: &DatabaseConnection,
    user: UserId,
    categories: &[CategoryId],
    today: NaiveDate,
) -> anyhow::Result<()> {
    let repo = BudgetRepository::new(db.clone()).with_today(today);
    let existing = repo.list_budgets(user, PageRequest::new(0, 1000)).await?;

    let mut created = 0;
    for category_id in categories {
        if existing.iter().any(|b| b.category_id == *category_id) {
            continue;
        }

        let input = CreateBudgetInput {
            user_id: user,
            category_id: *category_id,
            max_spend: SEED_BUDGET_CAP,
            future_spend: None,
            timeframe: TimeframeInput::recurring(TimeframeKind::Monthly, 1, default_anchor(today)),
        };
        repo.create_budget(&input).await?;
        created += 1;
    }

    info!(created, "Seeded budgets");
    Ok(())
}

async fn import_purchases(
    db: &DatabaseConnection,
    user: UserId,
    path: &Path,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let expenses = ExpenseRepository::new(db.clone()).with_today(today);

    let mut imported = 0;
    let mut skipped = 0;
    for (line, row) in import::read_rows(file) {
        let expense = row
            .map_err(anyhow::Error::from)
            .and_then(|row| row.to_expense(user, today));

        let input = match expense {
            Ok(input) => input,
            Err(e) => {
                warn!(line, error = %e, "Skipping purchase row");
                skipped += 1;
                continue;
            }
        };

        match expenses.create_expense(&input).await {
            Ok(_) => imported += 1,
            Err(e) => {
                warn!(line, error = %e, "Rejected purchase row");
                skipped += 1;
            }
        }
    }

    info!(file = %path.display(), imported, skipped, "Imported purchases");
    Ok(())
}

async fn generate_purchases(
    db: &DatabaseConnection,
    user: UserId,
    count: usize,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let expenses = ExpenseRepository::new(db.clone()).with_today(today);

    for _ in 0..count {
        let input = random_purchase(user, today);
        expenses.create_expense(&input).await?;
    }

    info!(count, "Generated purchases");
    Ok(())
}

fn random_purchase(user_id: UserId, today: NaiveDate) -> NewExpense {
    let mut rng = rand::rng();

    let item = CATEGORIES.choose(&mut rng).copied().unwrap_or("Unknown");
    let vendor = VENDORS.choose(&mut rng).copied().unwrap_or("Unknown");
    let method = PAYMENT_METHODS.choose(&mut rng).copied();
    let cents: i64 = rng.random_range(100..=4_000);
    let day = rng.random_range(1..=today.day());
    let notes = rng
        .random_ratio(1, 3)
        .then(|| Sentence(3..6).fake::<String>());

    NewExpense {
        user_id,
        item: item.to_string(),
        vendor: vendor.to_string(),
        amount: Decimal::new(cents, 2),
        date_purchased: today.with_day(day).unwrap_or(today),
        payment_method: method.map(str::to_string),
        notes,
        category_ids: Vec::new(),
        new_categories: vec![item.to_string()],
    }
}
