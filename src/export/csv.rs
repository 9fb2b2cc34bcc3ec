//! CSV export of expenses and budget allocations

use std::io::Write;

use serde::Serialize;

use crate::error::HearthResult;
use crate::models::{CategoryId, HouseholdId};
use crate::services::{BudgetService, CategoryService, ExpenseService};
use crate::storage::DocumentStore;

#[derive(Serialize)]
struct ExpenseRecord<'r> {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Category")]
    category: &'r str,
    #[serde(rename = "Description")]
    description: &'r str,
    #[serde(rename = "Location")]
    location: &'r str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Spender")]
    spender: String,
}

#[derive(Serialize)]
struct AllocationRecord<'r> {
    #[serde(rename = "Budget")]
    budget: &'r str,
    #[serde(rename = "Start")]
    start: String,
    #[serde(rename = "End")]
    end: String,
    #[serde(rename = "Category")]
    category: &'r str,
    #[serde(rename = "Allocated")]
    allocated: String,
    #[serde(rename = "Percentage")]
    percentage: String,
    #[serde(rename = "Rollover")]
    rollover: bool,
}

fn category_lookup(
    store: &dyn DocumentStore,
    household: HouseholdId,
) -> HearthResult<std::collections::HashMap<CategoryId, String>> {
    Ok(CategoryService::new(store, household)
        .list_all()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}

fn decimal(cents: i64) -> String {
    format!("{:.2}", cents as f64 / 100.0)
}

/// Write every expense of the household as CSV, oldest first
pub fn export_expenses_csv<W: Write>(
    store: &dyn DocumentStore,
    household: HouseholdId,
    writer: W,
) -> HearthResult<usize> {
    let names = category_lookup(store, household)?;
    let expenses = ExpenseService::new(store, household).list_all()?;

    let mut out = csv::Writer::from_writer(writer);
    for expense in &expenses {
        out.serialize(ExpenseRecord {
            id: expense.id.key(),
            date: expense.date.format("%Y-%m-%d %H:%M:%S").to_string(),
            category: names
                .get(&expense.category_id)
                .map(String::as_str)
                .unwrap_or("Unknown"),
            description: &expense.description,
            location: expense.location.as_deref().unwrap_or(""),
            amount: decimal(expense.amount.cents()),
            spender: expense.spender_id.key(),
        })?;
    }
    out.flush()?;

    Ok(expenses.len())
}

/// Write one row per budget allocation as CSV
pub fn export_allocations_csv<W: Write>(
    store: &dyn DocumentStore,
    household: HouseholdId,
    writer: W,
) -> HearthResult<usize> {
    let names = category_lookup(store, household)?;
    let budgets = BudgetService::new(store, household).list()?;

    let mut out = csv::Writer::from_writer(writer);
    let mut rows = 0;
    for budget in &budgets {
        for allocation in &budget.allocations {
            out.serialize(AllocationRecord {
                budget: &budget.name,
                start: budget.start_date.to_string(),
                end: budget.end_date.to_string(),
                category: names
                    .get(&allocation.category_id)
                    .map(String::as_str)
                    .unwrap_or("Unknown"),
                allocated: decimal(allocation.amount.cents()),
                percentage: allocation
                    .percentage
                    .map(|p| format!("{:.2}", p))
                    .unwrap_or_default(),
                rollover: allocation.rollover_enabled,
            })?;
            rows += 1;
        }
    }
    out.flush()?;

    Ok(rows)
}
