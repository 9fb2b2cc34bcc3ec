//! Budget display formatting

use chrono::NaiveDate;
use tabled::Tabled;

use super::{money, name_of, percent, render, CategoryNames};
use crate::models::{Budget, Money};
use crate::services::BudgetReport;

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Allocated")]
    allocated: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "ID")]
    id: String,
}

#[derive(Tabled)]
struct AllocationRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "Rollover")]
    rollover: &'static str,
}

#[derive(Tabled)]
struct ProgressRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Allocated")]
    allocated: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Progress")]
    progress: String,
}

pub fn format_budget_list(budgets: &[Budget], today: NaiveDate, symbol: &str) -> String {
    if budgets.is_empty() {
        return "No budgets found.\n\nCreate one with 'hearth budget create'.".to_string();
    }

    render(
        budgets
            .iter()
            .map(|b| BudgetRow {
                name: b.name.clone(),
                start: b.start_date.to_string(),
                end: b.end_date.to_string(),
                period: b.period.to_string(),
                total: money(symbol, b.total_amount),
                allocated: money(symbol, b.allocated_total()),
                status: b.status(today).to_string(),
                id: b.id.to_string(),
            })
            .collect(),
    )
}

pub fn format_budget_details(budget: &Budget, names: &CategoryNames, symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Budget: {}\n", budget.name));
    output.push_str(&format!("  ID:          {}\n", budget.id.key()));
    output.push_str(&format!(
        "  Range:       {} to {} ({}, {} days)\n",
        budget.start_date,
        budget.end_date,
        budget.period,
        budget.days()
    ));
    output.push_str(&format!("  Total:       {}\n", money(symbol, budget.total_amount)));
    output.push_str(&format!("  Allocated:   {}\n", money(symbol, budget.allocated_total())));
    output.push_str(&format!("  Unallocated: {}\n", money(symbol, budget.unallocated())));

    if budget.allocations.is_empty() {
        output.push_str("\nNo allocations.\n");
        return output;
    }

    let rows = budget
        .allocations
        .iter()
        .map(|a| AllocationRow {
            category: name_of(names, a.category_id),
            amount: money(symbol, a.amount),
            share: a.percentage.map(percent).unwrap_or_else(|| "-".to_string()),
            rollover: if a.rollover_enabled { "yes" } else { "no" },
        })
        .collect();

    output.push('\n');
    output.push_str(&render(rows));
    output.push('\n');
    output
}

/// Progress table for a budget, with overall figures and unallocated spending
pub fn format_progress_report(report: &BudgetReport, names: &CategoryNames, symbol: &str) -> String {
    let budget = &report.budget;
    let mut output = String::new();

    output.push_str(&format!(
        "{} ({} to {})\n",
        budget.name, budget.start_date, budget.end_date
    ));
    output.push_str(&format!(
        "Spent {} of {} ({} used)\n",
        money(symbol, report.spending.total),
        money(symbol, budget.total_amount),
        percent(report.progress.overall)
    ));

    if !report.details.is_empty() {
        let rows = report
            .details
            .iter()
            .map(|d| ProgressRow {
                category: name_of(names, d.category_id),
                allocated: money(symbol, d.allocated),
                spent: money(symbol, d.spent),
                remaining: money(symbol, d.remaining),
                progress: if d.over_budget {
                    format!("{} OVER", percent(d.percent))
                } else {
                    percent(d.percent)
                },
            })
            .collect();
        output.push('\n');
        output.push_str(&render(rows));
        output.push('\n');
    }

    let unallocated: Money = report
        .spending
        .by_category
        .iter()
        .filter(|(id, _)| budget.allocation_for(**id).is_none())
        .map(|(_, amount)| *amount)
        .sum();
    if !unallocated.is_zero() {
        output.push_str(&format!(
            "\nSpending in unallocated categories: {}\n",
            money(symbol, unallocated)
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::category_names;
    use crate::models::{Category, CategoryAllocation, Expense, HouseholdId, PeriodKind, UserId};
    use crate::services::{DateRange, ProgressCalculator, SpendingAggregator};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_budget_list_shows_status() {
        let household = HouseholdId::new();
        let budget = Budget::for_period(household, "March", Money::from_cents(100_000), PeriodKind::Monthly, day(1))
            .unwrap();
        let output = format_budget_list(&[budget], day(15), "$");
        assert!(output.contains("March"));
        assert!(output.contains("Current"));
        assert!(output.contains("$1000.00"));
    }

    #[test]
    fn test_progress_report() {
        let household = HouseholdId::new();
        let food = Category::new(household, "Food");
        let misc = Category::new(household, "Misc");
        let budget = Budget::for_period(household, "March", Money::from_cents(10_000), PeriodKind::Monthly, day(1))
            .unwrap()
            .with_allocations(vec![CategoryAllocation::fixed(food.id, Money::from_cents(2_000))]);

        let user = UserId::new();
        let expenses = vec![
            Expense::on_day(household, Money::from_cents(3_000), day(2), food.id, user),
            Expense::on_day(household, Money::from_cents(1_000), day(3), misc.id, user),
        ];
        let range = DateRange::new(budget.start_date, budget.end_date).unwrap();
        let spending = SpendingAggregator::aggregate(&range, &expenses);
        let calculator = ProgressCalculator::default();
        let report = BudgetReport {
            progress: calculator.calculate(&budget, &spending).unwrap(),
            details: calculator.details(&budget, &spending).unwrap(),
            budget,
            spending,
        };

        let output = format_progress_report(&report, &category_names(&[food, misc]), "$");
        assert!(output.contains("Spent $40.00 of $100.00 (40.0% used)"));
        assert!(output.contains("100.0% OVER"));
        assert!(output.contains("Spending in unallocated categories: $10.00"));
    }
}
