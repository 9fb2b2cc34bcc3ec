//! Budget model
//!
//! A budget is a total amount over an inclusive date range plus the ordered
//! list of category allocations it owns. Whether a budget is past, current
//! or future is derived from its range at query time and never stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::allocation::CategoryAllocation;
use super::ids::{BudgetId, CategoryId, HouseholdId};
use super::money::Money;
use super::period::PeriodKind;

/// A periodic household budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Unique identifier
    pub id: BudgetId,

    /// Household this budget belongs to
    pub household_id: HouseholdId,

    /// Display name (e.g., "March 2025")
    #[serde(default)]
    pub name: String,

    /// Total amount available for the period
    pub total_amount: Money,

    /// First day of the budget (inclusive)
    pub start_date: NaiveDate,

    /// Last day of the budget (inclusive)
    pub end_date: NaiveDate,

    /// How the date range was chosen
    #[serde(default)]
    pub period: PeriodKind,

    /// Per-category allocations, in display order
    #[serde(default)]
    pub allocations: Vec<CategoryAllocation>,

    /// When the budget was created
    pub created_at: DateTime<Utc>,

    /// When the budget was last modified
    pub updated_at: DateTime<Utc>,
}

/// Where a budget sits relative to a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    Past,
    Current,
    Future,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Past => write!(f, "Past"),
            Self::Current => write!(f, "Current"),
            Self::Future => write!(f, "Future"),
        }
    }
}

impl Budget {
    /// Create a new budget with no allocations
    pub fn new(
        household_id: HouseholdId,
        name: impl Into<String>,
        total_amount: Money,
        start_date: NaiveDate,
        end_date: NaiveDate,
        period: PeriodKind,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            household_id,
            name: name.into(),
            total_amount,
            start_date,
            end_date,
            period,
            allocations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a budget covering the period of `kind` that contains `anchor`.
    ///
    /// Returns `None` for `PeriodKind::Custom`, which needs explicit dates.
    pub fn for_period(
        household_id: HouseholdId,
        name: impl Into<String>,
        total_amount: Money,
        kind: PeriodKind,
        anchor: NaiveDate,
    ) -> Option<Self> {
        let (start, end) = kind.range_containing(anchor)?;
        Some(Self::new(household_id, name, total_amount, start, end, kind))
    }

    /// Builder-style allocation setter
    pub fn with_allocations(mut self, allocations: Vec<CategoryAllocation>) -> Self {
        self.allocations = allocations;
        self
    }

    /// Replace the allocation list
    pub fn set_allocations(&mut self, allocations: Vec<CategoryAllocation>) {
        self.allocations = allocations;
        self.updated_at = Utc::now();
    }

    /// Check if a day falls within the budget's range (inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Classify the budget relative to `today`
    pub fn status(&self, today: NaiveDate) -> BudgetStatus {
        if today < self.start_date {
            BudgetStatus::Future
        } else if today > self.end_date {
            BudgetStatus::Past
        } else {
            BudgetStatus::Current
        }
    }

    /// The allocation for a category, if any
    pub fn allocation_for(&self, category_id: CategoryId) -> Option<&CategoryAllocation> {
        self.allocations
            .iter()
            .find(|a| a.category_id == category_id)
    }

    /// Sum of all allocation amounts
    pub fn allocated_total(&self) -> Money {
        self.allocations.iter().map(|a| a.amount).sum()
    }

    /// Part of the total not assigned to any category (negative when
    /// over-allocated)
    pub fn unallocated(&self) -> Money {
        self.total_amount - self.allocated_total()
    }

    /// Number of days covered by the budget
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Validate the budget
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if !self.total_amount.is_positive() {
            return Err(BudgetValidationError::NonPositiveTotal(self.total_amount));
        }

        if self.start_date > self.end_date {
            return Err(BudgetValidationError::InvertedRange {
                start: self.start_date,
                end: self.end_date,
            });
        }

        let mut seen = HashSet::new();
        for allocation in &self.allocations {
            if allocation.amount.is_negative() {
                return Err(BudgetValidationError::NegativeAllocation(
                    allocation.category_id,
                ));
            }
            if !seen.insert(allocation.category_id) {
                return Err(BudgetValidationError::DuplicateCategory(
                    allocation.category_id,
                ));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} - {})",
            self.name,
            self.total_amount,
            self.start_date.format("%Y-%m-%d"),
            self.end_date.format("%Y-%m-%d")
        )
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    NonPositiveTotal(Money),
    InvertedRange { start: NaiveDate, end: NaiveDate },
    NegativeAllocation(CategoryId),
    DuplicateCategory(CategoryId),
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveTotal(total) => {
                write!(f, "Budget total must be positive, got {}", total)
            }
            Self::InvertedRange { start, end } => {
                write!(f, "Budget starts ({}) after it ends ({})", start, end)
            }
            Self::NegativeAllocation(id) => {
                write!(f, "Allocation for category {} is negative", id)
            }
            Self::DuplicateCategory(id) => {
                write!(f, "Category {} is allocated more than once", id)
            }
        }
    }
}

impl std::error::Error for BudgetValidationError {}
