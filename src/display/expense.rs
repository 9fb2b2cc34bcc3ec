//! Expense display formatting

use tabled::Tabled;

use super::{money, name_of, render, CategoryNames};
use crate::models::{Expense, Money};

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "ID")]
    id: String,
}

/// Table of expenses followed by their total
pub fn format_expense_list(
    expenses: &[Expense],
    names: &CategoryNames,
    symbol: &str,
    date_format: &str,
) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let total: Money = expenses.iter().map(|e| e.amount).sum();
    let table = render(
        expenses
            .iter()
            .map(|e| ExpenseRow {
                date: e.date.format(date_format).to_string(),
                amount: money(symbol, e.amount),
                category: name_of(names, e.category_id),
                description: e.description.clone(),
                id: e.id.to_string(),
            })
            .collect(),
    );

    format!(
        "{}\n{} expense(s), total {}\n",
        table,
        expenses.len(),
        money(symbol, total)
    )
}
