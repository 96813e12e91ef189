//! Current-period calculation for recurring budgets.
//!
//! A recurrence tiles the calendar into periods starting at
//! `anchor + k * interval` units for every integer `k`, negative included.
//! All index arithmetic uses floored division so dates before the anchor
//! land in the right period.

use chrono::{Datelike, NaiveDate, TimeDelta};

use super::error::BudgetError;
use super::types::{Period, Recurrence, RecurrenceUnit, Timeframe};

/// Stateless period calculator.
pub struct PeriodCalculator;

impl PeriodCalculator {
    /// Returns the window a timeframe measures spend against on `today`.
    ///
    /// Custom timeframes return their stored window unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AnchorDayOverflow` if the anchor's day does not exist in a
    /// month the current period starts or ends on.
    pub fn window(timeframe: &Timeframe, today: NaiveDate) -> Result<Period, BudgetError> {
        match timeframe {
            Timeframe::Recurring(recurrence) => Self::current(recurrence, today),
            Timeframe::Custom(period) => Ok(*period),
        }
    }

    /// Returns the period of `recurrence` that contains `today`.
    ///
    /// The result always satisfies `start <= today <= end`.
    ///
    /// Periods do not follow calendar months: a monthly budget anchored on
    /// the 15th runs from the 15th to the 14th of the next month, because
    /// `end` is always the day before the next period's start.
    ///
    /// # Errors
    ///
    /// Returns `AnchorDayOverflow` when shifting the anchor hits a month
    /// without its day, and `DateOutOfRange` past chrono's calendar limits.
    pub fn current(recurrence: &Recurrence, today: NaiveDate) -> Result<Period, BudgetError> {
        let mut index = Self::candidate_index(recurrence, today);
        // The candidate ignores the anchor's day (and month, for yearly).
        if Self::shift(recurrence, index * i64::from(recurrence.interval))? > today {
            index -= 1;
        }
        Self::nth(recurrence, index)
    }

    /// Returns period number `index`; period 0 starts on the anchor.
    ///
    /// `end` is the day before period `index + 1` starts, so mid-month
    /// anchors end mid-month rather than on the last day of the month.
    ///
    /// # Errors
    ///
    /// Same as [`PeriodCalculator::current`].
    pub fn nth(recurrence: &Recurrence, index: i64) -> Result<Period, BudgetError> {
        let interval = i64::from(recurrence.interval);
        let start = Self::shift(recurrence, index * interval)?;
        let next = Self::shift(recurrence, (index + 1) * interval)?;
        let end = next
            .pred_opt()
            .ok_or(BudgetError::DateOutOfRange(recurrence.anchor))?;
        Ok(Period::new(start, end))
    }

    /// Rejects anchors whose day cannot exist in every month (or year) the
    /// recurrence lands on.
    ///
    /// February counts as 28 days, so a February 29 anchor is only accepted
    /// for weekly recurrences.
    ///
    /// # Errors
    ///
    /// Returns `AnchorDayOverflow` naming the first unreachable month.
    pub fn check_anchor(recurrence: &Recurrence) -> Result<(), BudgetError> {
        let anchor = recurrence.anchor;
        let day = anchor.day();
        let overflow = match recurrence.unit {
            RecurrenceUnit::Week => None,
            RecurrenceUnit::Year => (day > shortest_month_length(anchor.month0()))
                .then_some(anchor.month0()),
            RecurrenceUnit::Month => {
                // Reachable months are congruent to the anchor's month modulo gcd(interval, 12).
                let step = gcd(recurrence.interval, 12);
                let offset = anchor.month0() % step;
                (0..12)
                    .filter(|month0| month0 % step == offset)
                    .find(|month0| day > shortest_month_length(*month0))
            }
        };

        match overflow {
            Some(month0) => Err(BudgetError::AnchorDayOverflow {
                anchor,
                month: month0 + 1,
            }),
            None => Ok(()),
        }
    }

    fn candidate_index(recurrence: &Recurrence, today: NaiveDate) -> i64 {
        let interval = i64::from(recurrence.interval);
        let anchor = recurrence.anchor;
        match recurrence.unit {
            RecurrenceUnit::Year => {
                (i64::from(today.year()) - i64::from(anchor.year())).div_euclid(interval)
            }
            RecurrenceUnit::Month => (month_index(today) - month_index(anchor)).div_euclid(interval),
            RecurrenceUnit::Week => (today - anchor).num_days().div_euclid(7 * interval),
        }
    }

    /// Anchor moved by `units` years, months or weeks.
    fn shift(recurrence: &Recurrence, units: i64) -> Result<NaiveDate, BudgetError> {
        let anchor = recurrence.anchor;
        match recurrence.unit {
            RecurrenceUnit::Year => {
                with_anchor_day(anchor, i64::from(anchor.year()) + units, anchor.month())
            }
            RecurrenceUnit::Month => {
                let total = month_index(anchor) + units;
                let month = u32::try_from(total.rem_euclid(12) + 1)
                    .map_err(|_| BudgetError::DateOutOfRange(anchor))?;
                with_anchor_day(anchor, total.div_euclid(12), month)
            }
            RecurrenceUnit::Week => TimeDelta::try_weeks(units)
                .and_then(|delta| anchor.checked_add_signed(delta))
                .ok_or(BudgetError::DateOutOfRange(anchor)),
        }
    }
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn with_anchor_day(anchor: NaiveDate, year: i64, month: u32) -> Result<NaiveDate, BudgetError> {
    let first = i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, 1))
        .ok_or(BudgetError::DateOutOfRange(anchor))?;
    first
        .with_day(anchor.day())
        .ok_or(BudgetError::AnchorDayOverflow { anchor, month })
}

/// Length of a month in a common year.
const fn shortest_month_length(month0: u32) -> u32 {
    match month0 {
        1 => 28,
        3 | 5 | 8 | 10 => 30,
        _ => 31,
    }
}

const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn recurrence(unit: RecurrenceUnit, interval: u32, anchor: NaiveDate) -> Recurrence {
        Recurrence {
            unit,
            interval,
            anchor,
        }
    }

    #[rstest]
    // Monthly, anchor on the 1st
    #[case(RecurrenceUnit::Month, 1, date(2024, 1, 1), date(2024, 3, 15), date(2024, 3, 1), date(2024, 3, 31))]
    // Two-week periods
    #[case(RecurrenceUnit::Week, 2, date(2024, 1, 1), date(2024, 1, 20), date(2024, 1, 15), date(2024, 1, 28))]
    // Two-year periods
    #[case(RecurrenceUnit::Year, 2, date(2023, 1, 1), date(2026, 10, 15), date(2025, 1, 1), date(2026, 12, 31))]
    // Quarterly, today before the anchor
    #[case(RecurrenceUnit::Month, 3, date(2024, 6, 1), date(2024, 1, 10), date(2023, 12, 1), date(2024, 2, 29))]
    // Weekly, the day before the anchor
    #[case(RecurrenceUnit::Week, 1, date(2024, 1, 1), date(2023, 12, 31), date(2023, 12, 25), date(2023, 12, 31))]
    // Mid-month anchor, today before the anchor day
    #[case(RecurrenceUnit::Month, 1, date(2024, 1, 15), date(2024, 3, 10), date(2024, 2, 15), date(2024, 3, 14))]
    // Mid-year anchor
    #[case(RecurrenceUnit::Year, 1, date(2020, 7, 1), date(2024, 3, 1), date(2023, 7, 1), date(2024, 6, 30))]
    // Anchor on the 30th, every other month
    #[case(RecurrenceUnit::Month, 2, date(2024, 1, 30), date(2024, 3, 1), date(2024, 1, 30), date(2024, 3, 29))]
    // Today is the last day of a period
    #[case(RecurrenceUnit::Month, 1, date(2024, 1, 1), date(2024, 2, 29), date(2024, 2, 1), date(2024, 2, 29))]
    // Today is the anchor
    #[case(RecurrenceUnit::Week, 4, date(2024, 5, 6), date(2024, 5, 6), date(2024, 5, 6), date(2024, 6, 2))]
    fn test_current_period(
        #[case] unit: RecurrenceUnit,
        #[case] interval: u32,
        #[case] anchor: NaiveDate,
        #[case] today: NaiveDate,
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
    ) {
        let period = PeriodCalculator::current(&recurrence(unit, interval, anchor), today).unwrap();
        assert_eq!(period, Period::new(start, end));
    }

    #[test]
    fn test_custom_window_is_returned_verbatim() {
        let window = Period::new(date(2024, 4, 1), date(2024, 4, 10));
        let timeframe = Timeframe::Custom(window);

        assert_eq!(
            PeriodCalculator::window(&timeframe, date(2030, 1, 1)).unwrap(),
            window
        );
    }

    #[test]
    fn test_anchor_day_overflow_is_not_clamped() {
        let monthly = recurrence(RecurrenceUnit::Month, 1, date(2024, 1, 31));

        let err = PeriodCalculator::current(&monthly, date(2024, 2, 10)).unwrap_err();

        assert_eq!(
            err,
            BudgetError::AnchorDayOverflow {
                anchor: date(2024, 1, 31),
                month: 2
            }
        );
    }

    #[test]
    fn test_leap_day_yearly_anchor_overflows_in_common_year() {
        let yearly = recurrence(RecurrenceUnit::Year, 1, date(2024, 2, 29));

        assert!(PeriodCalculator::current(&yearly, date(2024, 6, 1)).is_err());
    }

    #[test]
    fn test_nth_zero_starts_on_anchor() {
        let weekly = recurrence(RecurrenceUnit::Week, 1, date(2024, 1, 3));

        let period = PeriodCalculator::nth(&weekly, 0).unwrap();

        assert_eq!(period, Period::new(date(2024, 1, 3), date(2024, 1, 9)));
    }

    #[rstest]
    #[case(RecurrenceUnit::Month, 1, date(2024, 1, 28), None)]
    #[case(RecurrenceUnit::Month, 1, date(2024, 1, 29), Some(2))]
    #[case(RecurrenceUnit::Month, 1, date(2024, 1, 31), Some(2))]
    #[case(RecurrenceUnit::Month, 2, date(2024, 1, 30), None)]
    #[case(RecurrenceUnit::Month, 2, date(2024, 1, 31), Some(9))]
    #[case(RecurrenceUnit::Month, 12, date(2024, 1, 31), None)]
    #[case(RecurrenceUnit::Month, 12, date(2024, 2, 29), Some(2))]
    #[case(RecurrenceUnit::Month, 6, date(2024, 3, 31), Some(9))]
    #[case(RecurrenceUnit::Year, 1, date(2024, 2, 29), Some(2))]
    #[case(RecurrenceUnit::Year, 4, date(2024, 2, 29), Some(2))]
    #[case(RecurrenceUnit::Year, 1, date(2024, 12, 31), None)]
    #[case(RecurrenceUnit::Week, 1, date(2024, 2, 29), None)]
    fn test_check_anchor(
        #[case] unit: RecurrenceUnit,
        #[case] interval: u32,
        #[case] anchor: NaiveDate,
        #[case] bad_month: Option<u32>,
    ) {
        let result = PeriodCalculator::check_anchor(&recurrence(unit, interval, anchor));

        match bad_month {
            None => assert!(result.is_ok()),
            Some(month) => {
                assert_eq!(result, Err(BudgetError::AnchorDayOverflow { anchor, month }));
            }
        }
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(1, 12), 1);
        assert_eq!(gcd(8, 12), 4);
        assert_eq!(gcd(24, 12), 12);
        assert_eq!(gcd(7, 12), 1);
    }
}
