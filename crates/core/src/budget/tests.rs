//! Property-based and scenario tests for the budget module.

use chrono::{Datelike, Days, Months, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::{BudgetId, CategoryId, UserId};

use super::error::BudgetError;
use super::lifecycle::BudgetLifecycle;
use super::memory::MemoryStore;
use super::period::PeriodCalculator;
use super::recalc::{BudgetRecalcEngine, RecalcError};
use super::types::{
    Budget, CreateBudgetInput, Period, Recurrence, RecurrenceUnit, Timeframe, TimeframeInput,
    TimeframeKind, UpdateBudgetInput,
};
use crate::expense::ExpenseMutation;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Period properties
// ============================================================================

fn unit_strategy() -> impl Strategy<Value = RecurrenceUnit> {
    prop_oneof![
        Just(RecurrenceUnit::Year),
        Just(RecurrenceUnit::Month),
        Just(RecurrenceUnit::Week),
    ]
}

/// Anchors whose day exists in every month.
fn anchor_strategy() -> impl Strategy<Value = NaiveDate> {
    (1990i32..2060, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| date(y, m, d))
}

fn today_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..60_000).prop_map(|offset| date(1950, 1, 1) + Days::new(offset))
}

fn next_start(unit: RecurrenceUnit, interval: u32, start: NaiveDate) -> NaiveDate {
    match unit {
        RecurrenceUnit::Year => start + Months::new(12 * interval),
        RecurrenceUnit::Month => start + Months::new(interval),
        RecurrenceUnit::Week => start + Days::new(7 * u64::from(interval)),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The current period always contains today.
    #[test]
    fn prop_current_period_contains_today(
        unit in unit_strategy(),
        interval in 1u32..=100,
        anchor in anchor_strategy(),
        today in today_strategy(),
    ) {
        let recurrence = Recurrence { unit, interval, anchor };

        let period = PeriodCalculator::current(&recurrence, today).unwrap();

        prop_assert!(period.start <= today, "{period:?} starts after {today}");
        prop_assert!(today <= period.end, "{period:?} ends before {today}");
    }

    /// A period spans exactly `interval` units from its start.
    #[test]
    fn prop_period_spans_interval_units(
        unit in unit_strategy(),
        interval in 1u32..=100,
        anchor in anchor_strategy(),
        today in today_strategy(),
    ) {
        let recurrence = Recurrence { unit, interval, anchor };

        let period = PeriodCalculator::current(&recurrence, today).unwrap();

        prop_assert_eq!(period.end.succ_opt().unwrap(), next_start(unit, interval, period.start));
    }

    /// Consecutive periods tile without gaps or overlaps.
    #[test]
    fn prop_periods_tile(
        unit in unit_strategy(),
        interval in 1u32..=24,
        anchor in anchor_strategy(),
        index in -200i64..200,
    ) {
        let recurrence = Recurrence { unit, interval, anchor };

        let this = PeriodCalculator::nth(&recurrence, index).unwrap();
        let next = PeriodCalculator::nth(&recurrence, index + 1).unwrap();

        prop_assert_eq!(this.end.succ_opt().unwrap(), next.start);
        prop_assert!(this.start <= this.end);
    }

    /// The current period starts a whole number of intervals from the anchor.
    #[test]
    fn prop_current_period_is_aligned_to_anchor(
        unit in unit_strategy(),
        interval in 1u32..=100,
        anchor in anchor_strategy(),
        today in today_strategy(),
    ) {
        let recurrence = Recurrence { unit, interval, anchor };
        let start = PeriodCalculator::current(&recurrence, today).unwrap().start;
        let interval = i64::from(interval);

        match unit {
            RecurrenceUnit::Week => {
                prop_assert_eq!((start - anchor).num_days().rem_euclid(7 * interval), 0);
            }
            RecurrenceUnit::Month => {
                let months = i64::from(start.year() - anchor.year()) * 12
                    + i64::from(start.month()) - i64::from(anchor.month());
                prop_assert_eq!(months.rem_euclid(interval), 0);
                prop_assert_eq!(start.day(), anchor.day());
            }
            RecurrenceUnit::Year => {
                prop_assert_eq!(i64::from(start.year() - anchor.year()).rem_euclid(interval), 0);
                prop_assert_eq!((start.month(), start.day()), (anchor.month(), anchor.day()));
            }
        }
    }

    /// Over-max is exactly `current + future > max`.
    #[test]
    fn prop_over_max_matches_definition(
        current in 0i64..10_000_000,
        future in 0i64..10_000_000,
        max in 1i64..10_000_000,
    ) {
        let (current, future, max) = (
            Decimal::new(current, 2),
            Decimal::new(future, 2),
            Decimal::new(max, 2),
        );

        prop_assert_eq!(
            super::service::BudgetService::is_over_max(current, future, max),
            current + future > max
        );
    }
}

// ============================================================================
// Engine and lifecycle
// ============================================================================

struct Fixture {
    store: MemoryStore,
    user: UserId,
    category: CategoryId,
    today: NaiveDate,
}

impl Fixture {
    fn new(today: NaiveDate) -> Self {
        Self {
            store: MemoryStore::default(),
            user: UserId::new(),
            category: CategoryId::new(),
            today,
        }
    }

    fn engine(&self) -> BudgetRecalcEngine<'_, MemoryStore> {
        BudgetRecalcEngine::new(&self.store, self.today)
    }

    fn lifecycle(&self) -> BudgetLifecycle<'_, MemoryStore> {
        BudgetLifecycle::new(&self.store, self.today)
    }

    async fn create(&self, max: Decimal, timeframe: TimeframeInput) -> Budget {
        let budget = self
            .lifecycle()
            .create(&CreateBudgetInput {
                user_id: self.user,
                category_id: self.category,
                max_spend: max,
                future_spend: None,
                timeframe,
            })
            .await
            .unwrap();
        self.store.insert_budget(budget.clone());
        budget
    }

    async fn record(&self, amount: Decimal, on: NaiveDate) -> tally_shared::types::ExpenseId {
        let id = self.store.add_expense(self.user, amount, on, &[self.category]);
        self.engine()
            .apply(&ExpenseMutation::Created {
                owner: self.user,
                linked: vec![self.category],
            })
            .await
            .unwrap();
        id
    }

    async fn remove(&self, id: tally_shared::types::ExpenseId) {
        let removed = self.store.remove_expense(id);
        self.engine()
            .apply(&ExpenseMutation::Deleted {
                owner: removed.user_id,
                linked: removed.categories,
            })
            .await
            .unwrap();
    }
}

fn monthly() -> TimeframeInput {
    TimeframeInput::recurring(TimeframeKind::Monthly, 1, date(2024, 1, 1))
}

#[tokio::test]
async fn test_expense_cascade_flips_over_max() {
    let fx = Fixture::new(date(2024, 3, 15));
    let budget = fx.create(dec!(50), monthly()).await;

    let first = fx.record(dec!(30), date(2024, 3, 2)).await;
    let state = fx.store.budget(budget.id);
    assert_eq!(state.current_spend, dec!(30));
    assert!(!state.is_over_max);

    fx.record(dec!(25), date(2024, 3, 10)).await;
    let state = fx.store.budget(budget.id);
    assert_eq!(state.current_spend, dec!(55));
    assert!(state.is_over_max);

    fx.remove(first).await;
    let state = fx.store.budget(budget.id);
    assert_eq!(state.current_spend, dec!(25));
    assert!(!state.is_over_max);
}

#[tokio::test]
async fn test_future_spend_counts_toward_over_max() {
    let fx = Fixture::new(date(2024, 3, 15));
    fx.store
        .add_expense(fx.user, dec!(80), date(2024, 3, 1), &[fx.category]);

    let budget = fx
        .lifecycle()
        .create(&CreateBudgetInput {
            user_id: fx.user,
            category_id: fx.category,
            max_spend: dec!(100),
            future_spend: Some(dec!(30)),
            timeframe: monthly(),
        })
        .await
        .unwrap();

    assert_eq!(budget.current_spend, dec!(80));
    assert_eq!(budget.window, Period::new(date(2024, 3, 1), date(2024, 3, 31)));
    assert!(budget.is_over_max);
}

#[tokio::test]
async fn test_recalculation_is_idempotent() {
    let fx = Fixture::new(date(2024, 3, 15));
    let budget = fx.create(dec!(100), monthly()).await;
    fx.store
        .add_expense(fx.user, dec!(40), date(2024, 3, 5), &[fx.category]);

    let first = fx.engine().recalc_budgets_for(fx.user, fx.category).await.unwrap();
    let after_first = fx.store.budget(budget.id);
    let second = fx.engine().recalc_budgets_for(fx.user, fx.category).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fx.store.budget(budget.id), after_first);
    assert_eq!(after_first.current_spend, dec!(40));
}

#[tokio::test]
async fn test_delete_outside_period_leaves_spend_unchanged() {
    let fx = Fixture::new(date(2024, 3, 15));
    let budget = fx.create(dec!(100), monthly()).await;
    fx.record(dec!(20), date(2024, 3, 3)).await;
    let old = fx.record(dec!(70), date(2024, 2, 27)).await;
    assert_eq!(fx.store.budget(budget.id).current_spend, dec!(20));

    fx.remove(old).await;

    assert_eq!(fx.store.budget(budget.id).current_spend, dec!(20));
}

#[tokio::test]
async fn test_period_boundaries_are_inclusive() {
    let fx = Fixture::new(date(2024, 3, 15));
    let budget = fx.create(dec!(100), monthly()).await;

    fx.record(dec!(1), date(2024, 3, 1)).await;
    fx.record(dec!(2), date(2024, 3, 31)).await;
    fx.record(dec!(4), date(2024, 4, 1)).await;

    assert_eq!(fx.store.budget(budget.id).current_spend, dec!(3));
}

#[tokio::test]
async fn test_recalc_refreshes_stale_window() {
    let fx = Fixture::new(date(2024, 3, 15));
    let mut budget = fx.create(dec!(100), monthly()).await;
    budget.window = Period::new(date(2024, 1, 1), date(2024, 1, 31));
    fx.store.replace_budget(budget.clone());

    let results = fx.engine().recalc_budgets_for(fx.user, fx.category).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(
        fx.store.budget(budget.id).window,
        Period::new(date(2024, 3, 1), date(2024, 3, 31))
    );
}

#[tokio::test]
async fn test_custom_window_is_authoritative() {
    let fx = Fixture::new(date(2030, 6, 1));
    let budget = fx
        .create(
            dec!(100),
            TimeframeInput::custom(date(2024, 1, 1), date(2024, 1, 10)),
        )
        .await;

    fx.record(dec!(10), date(2024, 1, 10)).await;
    fx.record(dec!(10), date(2024, 1, 11)).await;

    let state = fx.store.budget(budget.id);
    assert_eq!(state.current_spend, dec!(10));
    assert_eq!(state.window, Period::new(date(2024, 1, 1), date(2024, 1, 10)));
}

#[tokio::test]
async fn test_other_users_and_categories_are_ignored() {
    let fx = Fixture::new(date(2024, 3, 15));
    let budget = fx.create(dec!(100), monthly()).await;

    fx.store
        .add_expense(UserId::new(), dec!(9), date(2024, 3, 2), &[fx.category]);
    fx.store
        .add_expense(fx.user, dec!(9), date(2024, 3, 2), &[CategoryId::new()]);
    fx.record(dec!(1), date(2024, 3, 2)).await;

    assert_eq!(fx.store.budget(budget.id).current_spend, dec!(1));
}

#[tokio::test]
async fn test_update_cascade_recalculates_duplicates() {
    let fx = Fixture::new(date(2024, 3, 15));
    fx.create(dec!(100), monthly()).await;

    let results = fx
        .engine()
        .apply(&ExpenseMutation::Updated {
            owner: fx.user,
            before: vec![fx.category],
            added: vec![fx.category],
        })
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(*fx.store.saves.lock().unwrap(), 2);
}

#[tokio::test]
async fn test_overflowing_stored_anchor_aborts_cascade() {
    let fx = Fixture::new(date(2024, 2, 10));
    let budget = Budget {
        id: BudgetId::new(),
        user_id: fx.user,
        category_id: fx.category,
        max_spend: dec!(100),
        current_spend: Decimal::ZERO,
        future_spend: Decimal::ZERO,
        is_over_max: false,
        timeframe: Timeframe::Recurring(Recurrence {
            unit: RecurrenceUnit::Month,
            interval: 1,
            anchor: date(2024, 1, 31),
        }),
        window: Period::new(date(2024, 1, 31), date(2024, 2, 29)),
    };
    fx.store.insert_budget(budget);

    let err = fx
        .engine()
        .recalc_budgets_for(fx.user, fx.category)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RecalcError::Budget(BudgetError::AnchorDayOverflow { month: 2, .. })
    ));
    assert_eq!(*fx.store.saves.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_create_rejects_invalid_input() {
    let fx = Fixture::new(date(2024, 3, 15));
    let mut input = CreateBudgetInput {
        user_id: fx.user,
        category_id: fx.category,
        max_spend: dec!(0),
        future_spend: None,
        timeframe: monthly(),
    };

    let err = fx.lifecycle().create(&input).await.unwrap_err();
    assert_eq!(err.as_budget_error(), Some(&BudgetError::CapInvalid(dec!(0))));

    input.max_spend = dec!(10);
    input.future_spend = Some(dec!(-1));
    let err = fx.lifecycle().create(&input).await.unwrap_err();
    assert_eq!(err.as_budget_error(), Some(&BudgetError::NegativeSpend(dec!(-1))));

    input.future_spend = None;
    input.timeframe.interval = None;
    let err = fx.lifecycle().create(&input).await.unwrap_err();
    assert_eq!(err.as_budget_error(), Some(&BudgetError::MissingInterval));
}

#[tokio::test]
async fn test_update_owner_change_uses_all_time_total() {
    let fx = Fixture::new(date(2024, 3, 15));
    let budget = fx.create(dec!(100), monthly()).await;
    let other = CategoryId::new();
    fx.store.add_expense(fx.user, dec!(60), date(2023, 6, 1), &[other]);
    fx.store.add_expense(fx.user, dec!(50), date(2024, 3, 2), &[other]);

    let updated = fx
        .lifecycle()
        .update(
            &budget,
            &UpdateBudgetInput {
                category_id: Some(other),
                current_spend: Some(dec!(1)),
                ..UpdateBudgetInput::default()
            },
        )
        .await
        .unwrap();

    // No window filter on this path.
    assert_eq!(updated.current_spend, dec!(110));
    assert!(updated.is_over_max);
    assert_eq!(updated.category_id, other);
}

#[tokio::test]
async fn test_update_same_owner_is_not_a_change() {
    let fx = Fixture::new(date(2024, 3, 15));
    let budget = fx.create(dec!(100), monthly()).await;
    fx.store
        .add_expense(fx.user, dec!(60), date(2023, 6, 1), &[fx.category]);

    let updated = fx
        .lifecycle()
        .update(
            &budget,
            &UpdateBudgetInput {
                user_id: Some(fx.user),
                ..UpdateBudgetInput::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.current_spend, Decimal::ZERO);
}

#[tokio::test]
async fn test_update_max_spend_recomputes_flag() {
    let fx = Fixture::new(date(2024, 3, 15));
    fx.store
        .add_expense(fx.user, dec!(40), date(2024, 3, 2), &[fx.category]);
    let budget = fx.create(dec!(100), monthly()).await;
    assert!(!budget.is_over_max);

    let updated = fx
        .lifecycle()
        .update(
            &budget,
            &UpdateBudgetInput {
                max_spend: Some(dec!(30)),
                ..UpdateBudgetInput::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.is_over_max);

    let updated = fx
        .lifecycle()
        .update(
            &updated,
            &UpdateBudgetInput {
                future_spend: Some(dec!(0)),
                current_spend: Some(dec!(30)),
                ..UpdateBudgetInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.current_spend, dec!(30));
    assert!(!updated.is_over_max);
}

#[tokio::test]
async fn test_update_timeframe_resums_window() {
    let fx = Fixture::new(date(2024, 3, 15));
    fx.store
        .add_expense(fx.user, dec!(40), date(2024, 2, 20), &[fx.category]);
    let budget = fx.create(dec!(100), monthly()).await;
    assert_eq!(budget.current_spend, Decimal::ZERO);

    let updated = fx
        .lifecycle()
        .update(
            &budget,
            &UpdateBudgetInput {
                timeframe: Some(TimeframeInput::recurring(
                    TimeframeKind::Yearly,
                    1,
                    date(2024, 1, 1),
                )),
                ..UpdateBudgetInput::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.timeframe.kind(), TimeframeKind::Yearly);
    assert_eq!(updated.window, Period::new(date(2024, 1, 1), date(2024, 12, 31)));
    assert_eq!(updated.current_spend, dec!(40));
}

#[tokio::test]
async fn test_update_rejects_negative_spend() {
    let fx = Fixture::new(date(2024, 3, 15));
    let budget = fx.create(dec!(100), monthly()).await;

    let err = fx
        .lifecycle()
        .update(
            &budget,
            &UpdateBudgetInput {
                current_spend: Some(dec!(-5)),
                ..UpdateBudgetInput::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.as_budget_error(), Some(&BudgetError::NegativeSpend(dec!(-5))));
}
