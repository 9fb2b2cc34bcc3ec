//! Core data models for Hearth
//!
//! Plain records for the household budgeting domain: categories, expenses,
//! budgets and their category allocations.

pub mod allocation;
pub mod budget;
pub mod category;
pub mod expense;
pub mod ids;
pub mod money;
pub mod period;

pub use allocation::CategoryAllocation;
pub use budget::{Budget, BudgetStatus, BudgetValidationError};
pub use category::{Category, CategoryValidationError};
pub use expense::{Expense, ExpenseValidationError};
pub use ids::{AllocationId, BudgetId, CategoryId, ExpenseId, HouseholdId, UserId};
pub use money::Money;
pub use period::PeriodKind;
