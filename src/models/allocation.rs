//! Category allocation model
//!
//! An allocation is the spending ceiling a budget assigns to one category.
//! The absolute `amount` is canonical and is what progress is measured
//! against; `percentage` only records where the amount came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AllocationId, CategoryId};
use super::money::Money;

/// A per-category allocation owned by a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    /// Unique identifier
    pub id: AllocationId,

    /// The category this allocation is for
    pub category_id: CategoryId,

    /// Amount allocated to the category
    pub amount: Money,

    /// Whether `amount` was derived from a percentage of the budget total
    #[serde(default)]
    pub is_percentage: bool,

    /// The originating percentage (percent points), for display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,

    /// Carry unspent funds into the next period (reserved, not used by progress)
    #[serde(default)]
    pub rollover_enabled: bool,

    /// When this allocation was created
    pub created_at: DateTime<Utc>,

    /// When this allocation was last modified
    pub updated_at: DateTime<Utc>,
}

impl CategoryAllocation {
    /// Create an allocation with a fixed amount
    pub fn fixed(category_id: CategoryId, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: AllocationId::new(),
            category_id,
            amount,
            is_percentage: false,
            percentage: None,
            rollover_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an allocation whose amount was derived from a percentage
    pub fn from_percentage(category_id: CategoryId, amount: Money, percentage: f64) -> Self {
        let mut allocation = Self::fixed(category_id, amount);
        allocation.is_percentage = true;
        allocation.percentage = Some(percentage);
        allocation
    }

    /// Set a new fixed amount, dropping any percentage provenance
    pub fn set_amount(&mut self, amount: Money) {
        self.amount = amount;
        self.is_percentage = false;
        self.percentage = None;
        self.updated_at = Utc::now();
    }

    /// Enable or disable rollover
    pub fn set_rollover(&mut self, enabled: bool) {
        self.rollover_enabled = enabled;
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for CategoryAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.amount)?;
        if let Some(pct) = self.percentage {
            write!(f, " ({:.1}%)", pct)?;
        }
        Ok(())
    }
}
