//! Budget lifecycle
//!
//! A budget and its allocations are stored as one parent record plus one
//! child record per allocation. Creating, updating and deleting therefore
//! take several independent store writes, issued in order. They are not
//! atomic: when a write fails after earlier ones have landed, the error is
//! a `PartialFailure` reporting how many steps were committed, and nothing
//! is rolled back.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::aggregation::{DateRange, SpendingAggregator, SpendingSummary};
use super::allocation::AllocationStrategy;
use super::category::CategoryService;
use super::expense::ExpenseService;
use super::progress::{BudgetProgress, CategoryProgress, ProgressCalculator, ZeroAllocationPolicy};
use super::record_audit;
use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::error::{HearthError, HearthResult};
use crate::models::{Budget, BudgetId, CategoryAllocation, HouseholdId};
use crate::storage::records::{
    allocation_record, budget_from_records, budget_record, from_record, POSITION_FIELD,
};
use crate::storage::{CollectionPath, Direction, Document, DocumentStore, Query, WriteMode};

const START_DATE_FIELD: &str = "start_date";

/// Spending and progress for one budget
#[derive(Debug, Clone)]
pub struct BudgetReport {
    pub budget: Budget,
    pub spending: SpendingSummary,
    pub progress: BudgetProgress,
    pub details: Vec<CategoryProgress>,
}

/// Service for budget management
pub struct BudgetService<'a> {
    store: &'a dyn DocumentStore,
    household: HouseholdId,
    audit: Option<&'a AuditLogger>,
    calculator: ProgressCalculator,
}

impl<'a> BudgetService<'a> {
    pub fn new(store: &'a dyn DocumentStore, household: HouseholdId) -> Self {
        Self {
            store,
            household,
            audit: None,
            calculator: ProgressCalculator::default(),
        }
    }

    pub fn with_audit(mut self, audit: Option<&'a AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// How progress treats zero-amount allocations
    pub fn with_policy(mut self, policy: ZeroAllocationPolicy) -> Self {
        self.calculator = ProgressCalculator::new(policy);
        self
    }

    fn budgets_path(&self) -> CollectionPath {
        CollectionPath::budgets(self.household)
    }

    fn allocations_path(&self, id: BudgetId) -> CollectionPath {
        CollectionPath::allocations(self.household, id)
    }

    // === Lifecycle ===

    /// Store a new budget and its allocations.
    ///
    /// Writes the budget record first, then each allocation in order.
    pub fn create(&self, budget: Budget) -> HearthResult<Budget> {
        self.check(&budget)?;

        let total = 1 + budget.allocations.len();
        self.store
            .create(&self.budgets_path(), &budget.id.key(), budget_record(&budget)?)?;

        let children = self.allocations_path(budget.id);
        for (position, allocation) in budget.allocations.iter().enumerate() {
            let written = allocation_record(allocation, position)
                .and_then(|fields| self.store.create(&children, &allocation.id.key(), fields));
            if let Err(e) = written {
                return Err(self.partial("create budget", 1 + position, total, e));
            }
        }

        info!(
            budget = %budget.id,
            name = %budget.name,
            allocations = budget.allocations.len(),
            "created budget"
        );
        record_audit(
            self.audit,
            AuditEntry::created(EntityType::Budget, budget.id.key(), &budget).labeled(&budget.name),
        );

        Ok(budget)
    }

    /// Store new budget fields and reconcile its allocations by id.
    ///
    /// Allocations in the new list are upserted with merge semantics, and
    /// stored allocations whose id is no longer listed are deleted. Surviving
    /// ids are never deleted and recreated.
    pub fn update(&self, mut budget: Budget) -> HearthResult<Budget> {
        let before = self.get(budget.id)?;
        self.check(&budget)?;

        budget.created_at = before.created_at;
        budget.updated_at = Utc::now();

        let children = self.allocations_path(budget.id);
        let keep: HashSet<String> = budget.allocations.iter().map(|a| a.id.key()).collect();
        let stale: Vec<String> = self
            .store
            .query(&children, &Query::all())?
            .into_iter()
            .map(|doc| doc.id)
            .filter(|id| !keep.contains(id))
            .collect();

        let total = 1 + budget.allocations.len() + stale.len();
        self.store.set(
            &self.budgets_path(),
            &budget.id.key(),
            budget_record(&budget)?,
            WriteMode::Merge,
        )?;
        let mut completed = 1;

        for (position, allocation) in budget.allocations.iter().enumerate() {
            let written = allocation_record(allocation, position).and_then(|fields| {
                self.store
                    .set(&children, &allocation.id.key(), fields, WriteMode::Merge)
            });
            if let Err(e) = written {
                return Err(self.partial("update budget", completed, total, e));
            }
            completed += 1;
        }

        for id in &stale {
            if let Err(e) = self.store.delete(&children, id) {
                return Err(self.partial("update budget", completed, total, e));
            }
            completed += 1;
        }

        info!(
            budget = %budget.id,
            upserted = budget.allocations.len(),
            removed = stale.len(),
            "updated budget"
        );
        record_audit(
            self.audit,
            AuditEntry::updated(EntityType::Budget, budget.id.key(), &before, &budget).labeled(&budget.name),
        );

        Ok(budget)
    }

    /// Remove a budget: every allocation first, then the budget record, so a
    /// failure midway never leaves allocations without a parent.
    pub fn delete(&self, id: BudgetId) -> HearthResult<Budget> {
        let budget = self.get(id)?;
        let children = self.allocations_path(id);
        let child_ids: Vec<String> = self
            .store
            .query(&children, &Query::all())?
            .into_iter()
            .map(|doc| doc.id)
            .collect();

        let total = child_ids.len() + 1;
        for (done, child) in child_ids.iter().enumerate() {
            if let Err(e) = self.store.delete(&children, child) {
                return Err(self.partial("delete budget", done, total, e));
            }
        }

        if let Err(e) = self.store.delete(&self.budgets_path(), &id.key()) {
            return Err(self.partial("delete budget", child_ids.len(), total, e));
        }

        info!(budget = %id, allocations = child_ids.len(), "deleted budget");
        record_audit(
            self.audit,
            AuditEntry::deleted(EntityType::Budget, id.key(), &budget).labeled(&budget.name),
        );

        Ok(budget)
    }

    /// Recompute a budget's allocations with `strategy` over the
    /// household's categories and store the result.
    ///
    /// A recomputed allocation for a category that already had one keeps the
    /// existing allocation id.
    pub fn reallocate(&self, id: BudgetId, strategy: &AllocationStrategy) -> HearthResult<Budget> {
        let mut budget = self.get(id)?;
        let categories = CategoryService::new(self.store, self.household).list_all()?;

        let existing: HashMap<_, _> = budget
            .allocations
            .iter()
            .map(|a| (a.category_id, (a.id, a.created_at)))
            .collect();

        let allocations: Vec<CategoryAllocation> = strategy
            .allocate(budget.total_amount, &categories)
            .into_iter()
            .map(|mut allocation| {
                if let Some((id, created_at)) = existing.get(&allocation.category_id) {
                    allocation.id = *id;
                    allocation.created_at = *created_at;
                }
                allocation
            })
            .collect();

        debug!(budget = %id, strategy = strategy.label(), count = allocations.len(), "reallocating");
        budget.set_allocations(allocations);
        self.update(budget)
    }

    // === Queries ===

    /// Get a budget with its allocations in order
    pub fn get(&self, id: BudgetId) -> HearthResult<Budget> {
        self.find(id)?
            .ok_or_else(|| HearthError::budget_not_found(id.to_string()))
    }

    /// Like [`get`](Self::get), returning `None` when the budget is missing
    pub fn find(&self, id: BudgetId) -> HearthResult<Option<Budget>> {
        match self.store.get(&self.budgets_path(), &id.key())? {
            Some(doc) => self.assemble(doc).map(Some),
            None => Ok(None),
        }
    }

    /// The budget whose date range contains `today`.
    ///
    /// Overlapping budgets are not prevented; when several contain `today`
    /// the one that started most recently wins.
    pub fn find_current(&self, today: NaiveDate) -> HearthResult<Option<Budget>> {
        let query = Query::all()
            .where_le(START_DATE_FIELD, today.to_string())
            .order_by(START_DATE_FIELD, Direction::Descending);

        for doc in self.store.query(&self.budgets_path(), &query)? {
            let candidate: Budget = from_record(doc.clone())?;
            if candidate.end_date >= today {
                debug!(budget = %candidate.id, %today, "found current budget");
                return self.assemble(doc).map(Some);
            }
        }

        Ok(None)
    }

    /// Every budget, by start date
    pub fn list(&self) -> HearthResult<Vec<Budget>> {
        let query = Query::all().order_by(START_DATE_FIELD, Direction::Ascending);
        self.store
            .query(&self.budgets_path(), &query)?
            .into_iter()
            .map(|doc| self.assemble(doc))
            .collect()
    }

    // === Progress ===

    /// Progress of a budget against the expenses in its window
    pub fn progress(&self, id: BudgetId) -> HearthResult<BudgetProgress> {
        Ok(self.report(id)?.progress)
    }

    /// Progress of the current budget. Fails with `InvalidState` when no
    /// budget contains `today`.
    pub fn current_progress(&self, today: NaiveDate) -> HearthResult<BudgetProgress> {
        Ok(self.current_report(today)?.progress)
    }

    /// Spending, progress and per-category detail for a budget
    pub fn report(&self, id: BudgetId) -> HearthResult<BudgetReport> {
        self.build_report(self.get(id)?)
    }

    /// Like [`report`](Self::report) for the current budget
    pub fn current_report(&self, today: NaiveDate) -> HearthResult<BudgetReport> {
        let budget = self.find_current(today)?.ok_or_else(|| {
            HearthError::InvalidState(format!("No budget covers {}", today))
        })?;
        self.build_report(budget)
    }

    fn build_report(&self, budget: Budget) -> HearthResult<BudgetReport> {
        let range = DateRange::new(budget.start_date, budget.end_date)?;
        let expenses = ExpenseService::new(self.store, self.household).list_in_range(&range)?;
        let spending = SpendingAggregator::aggregate(&range, &expenses);

        let progress = self.calculator.calculate(&budget, &spending)?;
        let details = self.calculator.details(&budget, &spending)?;

        Ok(BudgetReport {
            budget,
            spending,
            progress,
            details,
        })
    }

    // === Helpers ===

    fn assemble(&self, doc: Document) -> HearthResult<Budget> {
        let id: BudgetId = doc
            .id
            .parse()
            .map_err(|_| HearthError::Storage(format!("Malformed budget id '{}'", doc.id)))?;
        let children = self.store.query(
            &self.allocations_path(id),
            &Query::all().order_by(POSITION_FIELD, Direction::Ascending),
        )?;
        budget_from_records(doc, children)
    }

    fn check(&self, budget: &Budget) -> HearthResult<()> {
        if budget.household_id != self.household {
            return Err(HearthError::Validation(
                "Budget belongs to a different household".into(),
            ));
        }
        budget
            .validate()
            .map_err(|e| HearthError::Validation(e.to_string()))?;

        let categories = CategoryService::new(self.store, self.household);
        for allocation in &budget.allocations {
            categories.get(allocation.category_id)?;
        }
        Ok(())
    }

    fn partial(&self, operation: &'static str, completed: usize, total: usize, source: HearthError) -> HearthError {
        warn!(operation, completed, total, error = %source, "budget operation left store partially written");
        HearthError::partial(operation, completed, total, source)
    }
}
