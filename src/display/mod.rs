//! Terminal output formatting
//!
//! Turns models and service results into printable tables. Amounts are
//! rendered with the configured currency symbol.

pub mod budget;
pub mod category;
pub mod expense;
pub mod report;

pub use budget::{format_budget_details, format_budget_list, format_progress_report};
pub use category::{format_category_details, format_category_list};
pub use expense::format_expense_list;
pub use report::format_spending_report;

use std::collections::HashMap;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Category, CategoryId, Money};

/// Category names by id, for resolving references in listings
pub type CategoryNames = HashMap<CategoryId, String>;

/// Build a name lookup; archived categories are marked
pub fn category_names(categories: &[Category]) -> CategoryNames {
    categories.iter().map(|c| (c.id, c.to_string())).collect()
}

fn name_of(names: &CategoryNames, id: CategoryId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

fn money(symbol: &str, amount: Money) -> String {
    amount.format_with_symbol(symbol)
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}
