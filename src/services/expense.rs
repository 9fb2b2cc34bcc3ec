//! Expense service

use chrono::Utc;
use tracing::{debug, info};

use super::aggregation::DateRange;
use super::category::CategoryService;
use super::record_audit;
use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::error::{HearthError, HearthResult};
use crate::models::{CategoryId, Expense, ExpenseId, HouseholdId};
use crate::storage::records::{from_record, to_record};
use crate::storage::{CollectionPath, Direction, DocumentStore, Query};

/// Service for recording and querying expenses
pub struct ExpenseService<'a> {
    store: &'a dyn DocumentStore,
    household: HouseholdId,
    audit: Option<&'a AuditLogger>,
}

impl<'a> ExpenseService<'a> {
    pub fn new(store: &'a dyn DocumentStore, household: HouseholdId) -> Self {
        Self {
            store,
            household,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: Option<&'a AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    fn path(&self) -> CollectionPath {
        CollectionPath::expenses(self.household)
    }

    /// Record a new expense.
    ///
    /// The amount must be positive and the category must exist; archived
    /// categories are accepted.
    pub fn create(&self, expense: Expense) -> HearthResult<Expense> {
        self.check(&expense)?;

        self.store
            .create(&self.path(), &expense.id.key(), to_record(&expense)?)?;

        info!(expense = %expense.id, amount = %expense.amount, "recorded expense");
        record_audit(
            self.audit,
            AuditEntry::created(EntityType::Expense, expense.id.key(), &expense),
        );
        Ok(expense)
    }

    pub fn get(&self, id: ExpenseId) -> HearthResult<Expense> {
        self.store
            .get(&self.path(), &id.key())?
            .map(from_record)
            .transpose()?
            .ok_or_else(|| HearthError::expense_not_found(id.to_string()))
    }

    /// Replace an existing expense with `expense`
    pub fn update(&self, mut expense: Expense) -> HearthResult<Expense> {
        let before = self.get(expense.id)?;
        self.check(&expense)?;

        expense.created_at = before.created_at;
        expense.updated_at = Utc::now();
        self.store
            .update(&self.path(), &expense.id.key(), to_record(&expense)?)?;

        record_audit(
            self.audit,
            AuditEntry::updated(EntityType::Expense, expense.id.key(), &before, &expense),
        );
        Ok(expense)
    }

    pub fn delete(&self, id: ExpenseId) -> HearthResult<Expense> {
        let expense = self.get(id)?;
        self.store.delete(&self.path(), &id.key())?;

        info!(expense = %id, "deleted expense");
        record_audit(
            self.audit,
            AuditEntry::deleted(EntityType::Expense, id.key(), &expense),
        );
        Ok(expense)
    }

    /// Expenses whose calendar day falls within `range`, oldest first
    pub fn list_in_range(&self, range: &DateRange) -> HearthResult<Vec<Expense>> {
        // Dates are stored as ISO-8601 strings, so day bounds compare lexically.
        let mut query = Query::all()
            .where_ge("date", range.start().to_string())
            .order_by("date", Direction::Ascending);
        if let Some(next) = range.end().succ_opt() {
            query = query.where_lt("date", next.to_string());
        }

        let expenses = self.load(&query)?;
        debug!(range = %range, count = expenses.len(), "loaded expenses in range");
        Ok(expenses)
    }

    /// Expenses filed under one category, oldest first
    pub fn list_for_category(&self, category_id: CategoryId) -> HearthResult<Vec<Expense>> {
        self.load(
            &Query::all()
                .where_eq("category_id", category_id.key())
                .order_by("date", Direction::Ascending),
        )
    }

    /// Every expense, oldest first
    pub fn list_all(&self) -> HearthResult<Vec<Expense>> {
        self.load(&Query::all().order_by("date", Direction::Ascending))
    }

    fn load(&self, query: &Query) -> HearthResult<Vec<Expense>> {
        self.store
            .query(&self.path(), query)?
            .into_iter()
            .map(from_record)
            .collect()
    }

    fn check(&self, expense: &Expense) -> HearthResult<()> {
        if expense.household_id != self.household {
            return Err(HearthError::Validation(
                "Expense belongs to a different household".into(),
            ));
        }
        expense
            .validate()
            .map_err(|e| HearthError::Validation(e.to_string()))?;
        CategoryService::new(self.store, self.household).get(expense.category_id)?;
        Ok(())
    }
}
