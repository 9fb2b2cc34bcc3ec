//! Expense model
//!
//! An expense records money spent by a household member. It references its
//! category and spender by id and never owns them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, ExpenseId, HouseholdId, UserId};
use super::money::Money;

/// Maximum length of an expense description
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// Household this expense belongs to
    pub household_id: HouseholdId,

    /// Amount spent (always positive)
    pub amount: Money,

    /// What the money was spent on
    #[serde(default)]
    pub description: String,

    /// When the expense happened, in the recorder's local time
    pub date: NaiveDateTime,

    /// Category reference (may point at an archived category)
    pub category_id: CategoryId,

    /// Household member who spent the money
    pub spender_id: UserId,

    /// Where the money was spent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// When the expense was created
    pub created_at: DateTime<Utc>,

    /// When the expense was last modified
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense
    pub fn new(
        household_id: HouseholdId,
        amount: Money,
        date: NaiveDateTime,
        category_id: CategoryId,
        spender_id: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            household_id,
            amount,
            description: String::new(),
            date,
            category_id,
            spender_id,
            location: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an expense dated at the start of the given day
    pub fn on_day(
        household_id: HouseholdId,
        amount: Money,
        day: NaiveDate,
        category_id: CategoryId,
        spender_id: UserId,
    ) -> Self {
        Self::new(
            household_id,
            amount,
            day.and_time(chrono::NaiveTime::MIN),
            category_id,
            spender_id,
        )
    }

    /// Builder-style description setter
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder-style location setter
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// The calendar day of the expense, with time-of-day stripped
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Move the expense to another category
    pub fn set_category(&mut self, category_id: CategoryId) {
        self.category_id = category_id;
        self.updated_at = Utc::now();
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }

        if self.description.len() > MAX_DESCRIPTION_LEN {
            return Err(ExpenseValidationError::DescriptionTooLong(
                self.description.len(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day().format("%Y-%m-%d"), self.amount)?;
        if !self.description.is_empty() {
            write!(f, " {}", self.description)?;
        }
        Ok(())
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    NonPositiveAmount(Money),
    DescriptionTooLong(usize),
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Expense amount must be positive, got {}", amount)
            }
            Self::DescriptionTooLong(len) => write!(
                f,
                "Expense description too long ({} chars, max {})",
                len, MAX_DESCRIPTION_LEN
            ),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}
