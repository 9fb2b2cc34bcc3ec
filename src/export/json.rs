//! JSON export of a whole household, with schema versioning

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HearthError, HearthResult};
use crate::models::{Budget, Category, Expense, HouseholdId};
use crate::services::{BudgetService, CategoryService, ExpenseService};
use crate::storage::DocumentStore;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Everything stored for one household
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdSnapshot {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
    pub household_id: HouseholdId,

    /// Archived categories included
    pub categories: Vec<Category>,
    pub expenses: Vec<Expense>,
    pub budgets: Vec<Budget>,

    pub metadata: SnapshotMetadata,
}

/// Counts and date bounds, for a quick look without parsing everything
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub category_count: usize,
    pub expense_count: usize,
    pub budget_count: usize,
    pub earliest_expense: Option<String>,
    pub latest_expense: Option<String>,
}

impl HouseholdSnapshot {
    /// Read the full household from `store`
    pub fn capture(store: &dyn DocumentStore, household: HouseholdId) -> HearthResult<Self> {
        let categories = CategoryService::new(store, household).list_all()?;
        let expenses = ExpenseService::new(store, household).list_all()?;
        let budgets = BudgetService::new(store, household).list()?;

        let metadata = SnapshotMetadata {
            category_count: categories.len(),
            expense_count: expenses.len(),
            budget_count: budgets.len(),
            earliest_expense: expenses.iter().map(Expense::day).min().map(|d| d.to_string()),
            latest_expense: expenses.iter().map(Expense::day).max().map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            household_id: household,
            categories,
            expenses,
            budgets,
            metadata,
        })
    }

    /// Check the schema version and that every reference resolves
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let category_ids: HashSet<_> = self.categories.iter().map(|c| c.id).collect();

        for expense in &self.expenses {
            if !category_ids.contains(&expense.category_id) {
                return Err(format!(
                    "Expense {} references unknown category {}",
                    expense.id, expense.category_id
                ));
            }
        }

        for budget in &self.budgets {
            if let Some(allocation) = budget
                .allocations
                .iter()
                .find(|a| !category_ids.contains(&a.category_id))
            {
                return Err(format!(
                    "Budget {} allocates to unknown category {}",
                    budget.id, allocation.category_id
                ));
            }
        }

        let foreign = self
            .categories
            .iter()
            .map(|c| c.household_id)
            .chain(self.expenses.iter().map(|e| e.household_id))
            .chain(self.budgets.iter().map(|b| b.household_id))
            .any(|id| id != self.household_id);
        if foreign {
            return Err("Snapshot mixes records from another household".to_string());
        }

        Ok(())
    }
}

/// Write a snapshot of `household` as JSON
pub fn export_household_json<W: Write>(
    store: &dyn DocumentStore,
    household: HouseholdId,
    writer: W,
    pretty: bool,
) -> HearthResult<HouseholdSnapshot> {
    let snapshot = HouseholdSnapshot::capture(store, household)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &snapshot)
    } else {
        serde_json::to_writer(writer, &snapshot)
    }
    .map_err(|e| HearthError::Export(e.to_string()))?;

    Ok(snapshot)
}

/// Parse and validate a snapshot produced by [`export_household_json`]
pub fn import_from_json(json: &str) -> HearthResult<HouseholdSnapshot> {
    let snapshot: HouseholdSnapshot = serde_json::from_str(json)?;
    snapshot.validate().map_err(HearthError::Validation)?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryAllocation, CategoryId, Money, PeriodKind, UserId};
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn populated() -> (MemoryStore, HouseholdId) {
        let store = MemoryStore::new();
        let household = HouseholdId::new();
        let categories = CategoryService::new(&store, household);
        let food = categories.create("Food", None, None).unwrap();
        let old = categories.create("Old", None, None).unwrap();
        categories.archive(old.id).unwrap();

        let expenses = ExpenseService::new(&store, household);
        for d in [3, 9] {
            let day = NaiveDate::from_ymd_opt(2025, 5, d).unwrap();
            expenses
                .create(Expense::on_day(household, Money::from_cents(1_000), day, food.id, UserId::new()))
                .unwrap();
        }

        let anchor = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let budget = Budget::for_period(household, "May", Money::from_cents(50_000), PeriodKind::Monthly, anchor)
            .unwrap()
            .with_allocations(vec![CategoryAllocation::fixed(food.id, Money::from_cents(20_000))]);
        BudgetService::new(&store, household).create(budget).unwrap();

        (store, household)
    }

    #[test]
    fn test_export_and_reimport() {
        let (store, household) = populated();

        let mut output = Vec::new();
        let exported = export_household_json(&store, household, &mut output, true).unwrap();
        assert_eq!(exported.metadata.category_count, 2);
        assert_eq!(exported.metadata.earliest_expense.as_deref(), Some("2025-05-03"));
        assert_eq!(exported.metadata.latest_expense.as_deref(), Some("2025-05-09"));

        let imported = import_from_json(&String::from_utf8(output).unwrap()).unwrap();
        assert_eq!(imported.household_id, household);
        assert_eq!(imported.expenses, exported.expenses);
        assert_eq!(imported.budgets[0].allocations.len(), 1);
    }

    #[test]
    fn test_validate_catches_dangling_category() {
        let (store, household) = populated();
        let mut snapshot = HouseholdSnapshot::capture(&store, household).unwrap();
        snapshot.expenses[0].category_id = CategoryId::new();

        let err = snapshot.validate().unwrap_err();
        assert!(err.contains("unknown category"));
    }

    #[test]
    fn test_import_rejects_other_schema() {
        let (store, household) = populated();
        let mut snapshot = HouseholdSnapshot::capture(&store, household).unwrap();
        snapshot.schema_version = "0.9.0".to_string();

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(import_from_json(&json).unwrap_err().is_validation());
    }
}
