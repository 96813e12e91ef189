//! In-memory store for engine and lifecycle tests.

use std::convert::Infallible;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::{BudgetId, CategoryId, ExpenseId, UserId};

use super::store::{BudgetStore, SpendAggregator, Store};
use super::types::{Budget, Period, Recalculation};

#[derive(Debug, Clone)]
pub(crate) struct StoredExpense {
    pub id: ExpenseId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub categories: Vec<CategoryId>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    expenses: Mutex<Vec<StoredExpense>>,
    budgets: Mutex<Vec<Budget>>,
    pub saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn add_expense(
        &self,
        user_id: UserId,
        amount: Decimal,
        date: NaiveDate,
        categories: &[CategoryId],
    ) -> ExpenseId {
        let id = ExpenseId::new();
        self.expenses.lock().unwrap().push(StoredExpense {
            id,
            user_id,
            amount,
            date,
            categories: categories.to_vec(),
        });
        id
    }

    pub fn remove_expense(&self, id: ExpenseId) -> StoredExpense {
        let mut expenses = self.expenses.lock().unwrap();
        let pos = expenses.iter().position(|e| e.id == id).unwrap();
        expenses.remove(pos)
    }

    pub fn insert_budget(&self, budget: Budget) {
        self.budgets.lock().unwrap().push(budget);
    }

    pub fn replace_budget(&self, budget: Budget) {
        let mut budgets = self.budgets.lock().unwrap();
        budgets.retain(|b| b.id != budget.id);
        budgets.push(budget);
    }

    pub fn budget(&self, id: BudgetId) -> Budget {
        self.budgets
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .unwrap()
    }
}

impl Store for MemoryStore {
    type Error = Infallible;
}

#[async_trait]
impl SpendAggregator for MemoryStore {
    async fn sum_between(
        &self,
        user: UserId,
        category: CategoryId,
        period: Period,
    ) -> Result<Decimal, Infallible> {
        Ok(self
            .expenses
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user && e.categories.contains(&category))
            .filter(|e| period.contains(e.date))
            .map(|e| e.amount)
            .sum())
    }

    async fn sum_all_time(&self, user: UserId, category: CategoryId) -> Result<Decimal, Infallible> {
        Ok(self
            .expenses
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user && e.categories.contains(&category))
            .map(|e| e.amount)
            .sum())
    }
}

#[async_trait]
impl BudgetStore for MemoryStore {
    async fn budgets_for(
        &self,
        user: UserId,
        category: CategoryId,
    ) -> Result<Vec<Budget>, Infallible> {
        Ok(self
            .budgets
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.user_id == user && b.category_id == category)
            .cloned()
            .collect())
    }

    async fn save_recalculation(&self, recalculation: &Recalculation) -> Result<(), Infallible> {
        *self.saves.lock().unwrap() += 1;
        if let Some(budget) = self
            .budgets
            .lock()
            .unwrap()
            .iter_mut()
            .find(|b| b.id == recalculation.budget_id)
        {
            budget.current_spend = recalculation.current_spend;
            budget.is_over_max = recalculation.is_over_max;
            budget.window = recalculation.window;
        }
        Ok(())
    }
}
