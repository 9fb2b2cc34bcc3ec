//! Spending aggregation
//!
//! Groups expenses that fall inside a date window by category, spender and
//! calendar day. Only keys that actually occur are present in the result;
//! zero-filling is left to the progress calculator.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{HearthError, HearthResult};
use crate::models::{CategoryId, Expense, Money, UserId};

/// Inclusive calendar-day range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> HearthResult<Self> {
        if start > end {
            return Err(HearthError::Validation(format!(
                "Date range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// A range covering one day
    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Closed on both ends
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Spending totals over a date range
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpendingSummary {
    pub total: Money,
    pub by_category: HashMap<CategoryId, Money>,
    pub by_spender: HashMap<UserId, Money>,
    pub daily: BTreeMap<NaiveDate, Money>,
    pub expense_count: usize,
}

impl SpendingSummary {
    /// Spending recorded against one category
    pub fn spent_in(&self, category_id: CategoryId) -> Money {
        self.by_category.get(&category_id).copied().unwrap_or_default()
    }

    /// The `n` categories with the highest spending, largest first.
    /// Ties are broken by category id so the order is stable.
    pub fn top_categories(&self, n: usize) -> Vec<(CategoryId, Money)> {
        let mut ranked: Vec<(CategoryId, Money)> =
            self.by_category.iter().map(|(id, amount)| (*id, *amount)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    /// Mean spending per day over `range`, counting days with no spending
    pub fn daily_average(&self, range: &DateRange) -> Money {
        let days = (range.end - range.start).num_days() + 1;
        Money::from_cents((self.total.cents() as f64 / days as f64).round() as i64)
    }
}

/// Stateless aggregation over expense snapshots
pub struct SpendingAggregator;

impl SpendingAggregator {
    /// Summarize the expenses whose calendar day falls inside `range`
    pub fn aggregate<'a, I>(range: &DateRange, expenses: I) -> SpendingSummary
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let mut summary = SpendingSummary::default();

        for expense in expenses.into_iter().filter(|e| range.contains(e.day())) {
            summary.total += expense.amount;
            *summary.by_category.entry(expense.category_id).or_default() += expense.amount;
            *summary.by_spender.entry(expense.spender_id).or_default() += expense.amount;
            *summary.daily.entry(expense.day()).or_default() += expense.amount;
            summary.expense_count += 1;
        }

        summary
    }
}
