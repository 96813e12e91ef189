//! Budgets: period calculation, spend recalculation and lifecycle rules.

pub mod error;
pub mod lifecycle;
pub mod period;
pub mod recalc;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod memory;

#[cfg(test)]
mod tests;

pub use error::BudgetError;
pub use lifecycle::BudgetLifecycle;
pub use period::PeriodCalculator;
pub use recalc::{BudgetRecalcEngine, RecalcError};
pub use service::BudgetService;
pub use store::{BudgetStore, SpendAggregator, Store};
pub use types::{
    Budget, CreateBudgetInput, MAX_INTERVAL, Period, Recalculation, Recurrence, RecurrenceUnit,
    Timeframe, TimeframeInput, TimeframeKind, UpdateBudgetInput, default_anchor,
};
