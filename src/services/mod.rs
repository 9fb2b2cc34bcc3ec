//! Service layer for Hearth
//!
//! The pure core (allocation, aggregation, progress) works on snapshots
//! handed in by the caller. The stateful services borrow a
//! [`DocumentStore`](crate::storage::DocumentStore) and a household id
//! passed at construction, and optionally an audit logger.

pub mod aggregation;
pub mod allocation;
pub mod budget;
pub mod category;
pub mod expense;
pub mod progress;

pub use aggregation::{DateRange, SpendingAggregator, SpendingSummary};
pub use allocation::{
    custom_split, equal_split, retain_positive, rule_based_split, AllocationStrategy, RuleBucket,
};
pub use budget::{BudgetReport, BudgetService};
pub use category::{CategoryChanges, CategoryService};
pub use expense::ExpenseService;
pub use progress::{
    BudgetProgress, CategoryProgress, ProgressCalculator, ProgressKey, ZeroAllocationPolicy,
};

use tracing::warn;

use crate::audit::{AuditEntry, AuditLogger};

/// Append `entry` to the audit log, if one is attached.
///
/// Runs after the store write has committed, so a failure is logged rather
/// than reported as a failed operation.
fn record_audit(audit: Option<&AuditLogger>, entry: AuditEntry) {
    let Some(logger) = audit else {
        return;
    };
    if let Err(e) = logger.log(&entry) {
        warn!(
            entity = %entry.entity_id,
            operation = ?entry.operation,
            error = %e,
            "failed to write audit entry"
        );
    }
}
