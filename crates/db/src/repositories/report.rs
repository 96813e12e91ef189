//! Spend totals across expenses.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect, RelationTrait,
    sea_query::JoinType,
};
use tally_shared::types::{CategoryId, UserId};
use uuid::Uuid;

use crate::entities::{categories, expense_categories, expenses};

/// Total spend linked to one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    /// Category ID.
    pub category_id: CategoryId,
    /// Category name.
    pub name: String,
    /// Sum of linked expense amounts.
    pub total: Decimal,
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Sums expense amounts, optionally for one owner and one category.
    ///
    /// Without a category every expense counts once, linked or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn total_expenses(
        &self,
        user_id: Option<UserId>,
        category_id: Option<CategoryId>,
    ) -> Result<Decimal, DbErr> {
        let mut query = expenses::Entity::find()
            .select_only()
            .column(expenses::Column::Amount);

        if let Some(user_id) = user_id {
            query = query.filter(expenses::Column::UserId.eq(user_id.into_inner()));
        }
        if let Some(category_id) = category_id {
            query = query
                .join(JoinType::InnerJoin, expenses::Relation::ExpenseCategories.def())
                .filter(expense_categories::Column::CategoryId.eq(category_id.into_inner()));
        }

        let amounts: Vec<Decimal> = query.into_tuple().all(&self.db).await?;
        Ok(amounts.into_iter().sum())
    }

    /// Totals per category, largest first. An expense linked to several
    /// categories counts toward each of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn expenses_by_category(
        &self,
        user_id: Option<UserId>,
    ) -> Result<Vec<CategoryTotal>, DbErr> {
        let mut query = expenses::Entity::find()
            .select_only()
            .column(expense_categories::Column::CategoryId)
            .column(expenses::Column::Amount)
            .join(JoinType::InnerJoin, expenses::Relation::ExpenseCategories.def());

        if let Some(user_id) = user_id {
            query = query.filter(expenses::Column::UserId.eq(user_id.into_inner()));
        }

        let rows: Vec<(Uuid, Decimal)> = query.into_tuple().all(&self.db).await?;

        let mut totals: HashMap<Uuid, Decimal> = HashMap::new();
        for (category_id, amount) in rows {
            *totals.entry(category_id).or_default() += amount;
        }
        if totals.is_empty() {
            return Ok(Vec::new());
        }

        let names: HashMap<Uuid, String> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(totals.keys().copied()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut report: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(id, total)| CategoryTotal {
                category_id: CategoryId::from_uuid(id),
                name: names.get(&id).cloned().unwrap_or_default(),
                total,
            })
            .collect();
        report.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

        Ok(report)
    }
}
