//! Tab-separated purchase files.
//!
//! Columns: `Item`, `Vendor`, `Price`, `Date` (day of the current month),
//! `Method`, `Notes`. The item doubles as the category name.

use std::io::Read;
use std::str::FromStr;

use anyhow::{Context, bail};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use tally_core::expense::NewExpense;
use tally_shared::types::UserId;

/// One row of a purchase file.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRow {
    #[serde(rename = "Item")]
    pub item: String,
    #[serde(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "Date")]
    pub day: String,
    #[serde(rename = "Method", default)]
    pub method: Option<String>,
    #[serde(rename = "Notes", default)]
    pub notes: Option<String>,
}

impl PurchaseRow {
    /// Builds the expense this row describes, dated in `today`'s month.
    pub fn to_expense(&self, user_id: UserId, today: NaiveDate) -> anyhow::Result<NewExpense> {
        if self.item.is_empty() || self.vendor.is_empty() {
            bail!("missing item or vendor");
        }

        let amount = Decimal::from_str(self.price.trim_start_matches('$'))
            .with_context(|| format!("invalid price '{}'", self.price))?
            .round_dp(2);

        let day: u32 = self
            .day
            .parse()
            .with_context(|| format!("invalid day '{}'", self.day))?;
        let Some(date_purchased) = today.with_day(day) else {
            bail!("day {day} does not exist in month {}", today.month());
        };

        Ok(NewExpense {
            user_id,
            item: self.item.clone(),
            vendor: self.vendor.clone(),
            amount,
            date_purchased,
            payment_method: self.method.clone(),
            notes: self.notes.clone(),
            category_ids: Vec::new(),
            new_categories: vec![self.item.clone()],
        })
    }
}

/// Reads rows with their 1-based line numbers (the header is line 1).
pub fn read_rows<R: Read>(input: R) -> impl Iterator<Item = (usize, csv::Result<PurchaseRow>)> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_reader(input)
        .into_deserialize()
        .enumerate()
        .map(|(i, row)| (i + 2, row))
}
