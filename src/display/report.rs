//! Spending report formatting

use tabled::Tabled;

use super::{money, name_of, percent, render, CategoryNames};
use crate::services::{DateRange, SpendingSummary};

#[derive(Tabled)]
struct CategoryShareRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Share")]
    share: String,
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Spent")]
    spent: String,
}

/// Totals for a date range, broken down by category and by day
pub fn format_spending_report(
    summary: &SpendingSummary,
    range: &DateRange,
    names: &CategoryNames,
    symbol: &str,
) -> String {
    let mut output = String::new();
    output.push_str(&format!("Spending {}\n", range));
    output.push_str(&format!(
        "  Total:         {} across {} expense(s)\n",
        money(symbol, summary.total),
        summary.expense_count
    ));
    output.push_str(&format!(
        "  Daily average: {}\n",
        money(symbol, summary.daily_average(range))
    ));

    if summary.expense_count == 0 {
        output.push_str("\nNo expenses in this range.\n");
        return output;
    }

    let by_category = summary
        .top_categories(summary.by_category.len())
        .into_iter()
        .map(|(id, spent)| CategoryShareRow {
            category: name_of(names, id),
            spent: money(symbol, spent),
            share: spent
                .ratio(summary.total)
                .map(|r| percent(r * 100.0))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    output.push_str("\nBy category\n");
    output.push_str(&render(by_category));
    output.push('\n');

    let daily = summary
        .daily
        .iter()
        .map(|(date, spent)| DayRow {
            date: date.to_string(),
            spent: money(symbol, *spent),
        })
        .collect();
    output.push_str("\nBy day\n");
    output.push_str(&render(daily));
    output.push('\n');

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::category_names;
    use crate::models::{Category, Expense, HouseholdId, Money, UserId};
    use crate::services::SpendingAggregator;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_spending_report() {
        let household = HouseholdId::new();
        let rent = Category::new(household, "Rent");
        let food = Category::new(household, "Food");
        let user = UserId::new();
        let expenses = vec![
            Expense::on_day(household, Money::from_cents(75_000), day(1), rent.id, user),
            Expense::on_day(household, Money::from_cents(25_000), day(2), food.id, user),
        ];
        let range = DateRange::new(day(1), day(10)).unwrap();
        let summary = SpendingAggregator::aggregate(&range, &expenses);

        let output = format_spending_report(&summary, &range, &category_names(&[rent, food]), "$");
        assert!(output.contains("$1000.00 across 2 expense(s)"));
        assert!(output.contains("Daily average: $100.00"));
        assert!(output.contains("75.0%"));
        assert!(output.find("Rent").unwrap() < output.find("Food").unwrap());
        assert!(output.contains("2025-03-02"));
    }

    #[test]
    fn test_empty_range() {
        let range = DateRange::single_day(day(1));
        let output = format_spending_report(&SpendingSummary::default(), &range, &CategoryNames::new(), "€");
        assert!(output.contains("No expenses in this range."));
        assert!(output.contains("€0.00"));
    }
}
