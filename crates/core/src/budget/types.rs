//! Budget domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{BudgetId, CategoryId, UserId};

use super::error::BudgetError;

/// Largest accepted recurrence interval.
pub const MAX_INTERVAL: i32 = 100;

/// Timeframe kind as stored and as accepted from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeframeKind {
    /// Periods of `interval` years.
    Yearly,
    /// Periods of `interval` months.
    Monthly,
    /// Periods of `interval` weeks.
    Weekly,
    /// Fixed caller-supplied window.
    Custom,
}

impl TimeframeKind {
    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
            Self::Custom => "custom",
        }
    }

    /// Recurrence unit, or `None` for custom.
    #[must_use]
    pub const fn unit(self) -> Option<RecurrenceUnit> {
        match self {
            Self::Yearly => Some(RecurrenceUnit::Year),
            Self::Monthly => Some(RecurrenceUnit::Month),
            Self::Weekly => Some(RecurrenceUnit::Week),
            Self::Custom => None,
        }
    }
}

impl fmt::Display for TimeframeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeframeKind {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yearly" => Ok(Self::Yearly),
            "monthly" => Ok(Self::Monthly),
            "weekly" => Ok(Self::Weekly),
            "custom" => Ok(Self::Custom),
            other => Err(BudgetError::InvalidTimeframe(other.to_string())),
        }
    }
}

/// Granularity of a recurring timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecurrenceUnit {
    /// Calendar years.
    Year,
    /// Calendar months.
    Month,
    /// Seven-day weeks.
    Week,
}

impl RecurrenceUnit {
    /// Timeframe kind for this unit.
    #[must_use]
    pub const fn kind(self) -> TimeframeKind {
        match self {
            Self::Year => TimeframeKind::Yearly,
            Self::Month => TimeframeKind::Monthly,
            Self::Week => TimeframeKind::Weekly,
        }
    }
}

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// First day, inclusive.
    pub start: NaiveDate,
    /// Last day, inclusive.
    pub end: NaiveDate,
}

impl Period {
    /// Creates a period.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns true if `date` falls inside the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, both ends included.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// A validated recurrence: `interval` units per period, tiled from `anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    /// Period granularity.
    pub unit: RecurrenceUnit,
    /// Units per period, `1..=MAX_INTERVAL`.
    pub interval: u32,
    /// Reference date period boundaries are computed from.
    pub anchor: NaiveDate,
}

/// A budget's timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    /// Window re-derived from the recurrence at every recalculation.
    Recurring(Recurrence),
    /// Authoritative fixed window.
    Custom(Period),
}

impl Timeframe {
    /// Timeframe kind.
    #[must_use]
    pub const fn kind(&self) -> TimeframeKind {
        match self {
            Self::Recurring(r) => r.unit.kind(),
            Self::Custom(_) => TimeframeKind::Custom,
        }
    }

    /// Recurrence interval, `None` for custom.
    #[must_use]
    pub const fn interval(&self) -> Option<u32> {
        match self {
            Self::Recurring(r) => Some(r.interval),
            Self::Custom(_) => None,
        }
    }

    /// Recurrence anchor, `None` for custom.
    #[must_use]
    pub const fn anchor(&self) -> Option<NaiveDate> {
        match self {
            Self::Recurring(r) => Some(r.anchor),
            Self::Custom(_) => None,
        }
    }

    /// Rebuilds a timeframe from stored columns without the creation-time
    /// anchor checks.
    ///
    /// Custom rows use the stored window; recurring rows need an interval and
    /// an anchor.
    pub fn from_stored(
        kind: TimeframeKind,
        interval: Option<i32>,
        anchor: Option<NaiveDate>,
        window: Period,
    ) -> Result<Self, BudgetError> {
        match kind.unit() {
            None => Ok(Self::Custom(window)),
            Some(unit) => {
                let interval = interval
                    .and_then(|i| u32::try_from(i).ok())
                    .filter(|i| *i > 0)
                    .ok_or(BudgetError::MissingInterval)?;
                let anchor = anchor.ok_or(BudgetError::MissingInterval)?;
                Ok(Self::Recurring(Recurrence {
                    unit,
                    interval,
                    anchor,
                }))
            }
        }
    }
}

/// Raw timeframe fields as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeInput {
    /// One of `yearly`, `monthly`, `weekly`, `custom`.
    pub kind: String,
    /// Required for recurring kinds, forbidden for custom.
    pub interval: Option<i32>,
    /// Recurrence anchor; defaults to January 1 of the current year.
    pub anchor: Option<NaiveDate>,
    /// Custom window start.
    pub start_date: Option<NaiveDate>,
    /// Custom window end.
    pub end_date: Option<NaiveDate>,
}

impl TimeframeInput {
    /// Recurring input with an explicit anchor.
    #[must_use]
    pub fn recurring(kind: TimeframeKind, interval: i32, anchor: NaiveDate) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            interval: Some(interval),
            anchor: Some(anchor),
            start_date: None,
            end_date: None,
        }
    }

    /// Custom input.
    #[must_use]
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            kind: TimeframeKind::Custom.as_str().to_string(),
            interval: None,
            anchor: None,
            start_date: Some(start),
            end_date: Some(end),
        }
    }
}

/// Default anchor for a recurring budget created on `today`.
#[must_use]
pub fn default_anchor(today: NaiveDate) -> NaiveDate {
    today.with_month(1).and_then(|d| d.with_day(1)).unwrap_or(today)
}

/// A spend budget for one user and one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Budget ID.
    pub id: BudgetId,
    /// Owner.
    pub user_id: UserId,
    /// The single category this budget tracks.
    pub category_id: CategoryId,
    /// Spend cap, always positive.
    pub max_spend: Decimal,
    /// Derived spend inside the window.
    pub current_spend: Decimal,
    /// Caller-declared upcoming spend.
    pub future_spend: Decimal,
    /// `current_spend + future_spend > max_spend`.
    pub is_over_max: bool,
    /// How the window is determined.
    pub timeframe: Timeframe,
    /// Window at last creation or recalculation. Authoritative only for custom.
    pub window: Period,
}

/// Input for creating a budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBudgetInput {
    /// Owner.
    pub user_id: UserId,
    /// Tracked category.
    pub category_id: CategoryId,
    /// Spend cap.
    pub max_spend: Decimal,
    /// Declared upcoming spend, zero when absent.
    pub future_spend: Option<Decimal>,
    /// Timeframe fields.
    pub timeframe: TimeframeInput,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBudgetInput {
    /// New owner.
    pub user_id: Option<UserId>,
    /// New category.
    pub category_id: Option<CategoryId>,
    /// New cap.
    pub max_spend: Option<Decimal>,
    /// Explicit current spend. Ignored when owner or category changes.
    pub current_spend: Option<Decimal>,
    /// New declared upcoming spend.
    pub future_spend: Option<Decimal>,
    /// Replacement timeframe.
    pub timeframe: Option<TimeframeInput>,
}

/// Fields written back by one recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recalculation {
    /// Recalculated budget.
    pub budget_id: BudgetId,
    /// Window the spend was summed over.
    pub window: Period,
    /// Fresh spend total.
    pub current_spend: Decimal,
    /// Fresh over-max flag.
    pub is_over_max: bool,
}
