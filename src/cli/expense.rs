//! Expense CLI commands

use clap::Subcommand;

use super::{parse_date, parse_money, today, AppContext};
use crate::auth::AuthProvider;
use crate::display::{category_names, format_expense_list};
use crate::error::{HearthError, HearthResult};
use crate::models::{Expense, ExpenseId};
use crate::services::DateRange;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense for the signed-in user
    Add {
        /// Amount (e.g. "12.50")
        amount: String,
        /// Category name or ID
        #[arg(short, long)]
        category: String,
        /// Day of the expense (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
        /// What it was for
        #[arg(short = 'm', long, default_value = "")]
        description: String,
        /// Where it happened
        #[arg(short, long)]
        location: Option<String>,
    },

    /// List expenses
    List {
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// Show at most this many of the most recent expenses
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID, full or as shown in listings
        id: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(ctx: &AppContext, cmd: ExpenseCommands) -> HearthResult<()> {
    let service = ctx.expenses();

    match cmd {
        ExpenseCommands::Add {
            amount,
            category,
            date,
            description,
            location,
        } => {
            let user = ctx.auth.require_user()?;
            let category = ctx.categories().resolve(&category)?;
            let amount = parse_money(&amount)?;
            let day = match date {
                Some(date) => parse_date(&date)?,
                None => today(),
            };

            let mut expense =
                Expense::on_day(ctx.household, amount, day, category.id, user.id).with_description(description);
            if let Some(location) = location {
                expense = expense.with_location(location);
            }

            let expense = service.create(expense)?;
            println!(
                "Recorded {} in {} on {}",
                ctx.settings.format_money(expense.amount),
                category.name,
                expense.day()
            );
            println!("  ID: {}", expense.id.key());
        }

        ExpenseCommands::List {
            from,
            to,
            category,
            limit,
        } => {
            let mut expenses = match (from, to) {
                (None, None) => service.list_all()?,
                (from, to) => {
                    let start = match from {
                        Some(from) => parse_date(&from)?,
                        None => chrono::NaiveDate::MIN,
                    };
                    let end = match to {
                        Some(to) => parse_date(&to)?,
                        None => chrono::NaiveDate::MAX,
                    };
                    service.list_in_range(&DateRange::new(start, end)?)?
                }
            };

            if let Some(category) = category {
                let category = ctx.categories().resolve(&category)?;
                expenses.retain(|e| e.category_id == category.id);
            }
            if let Some(limit) = limit {
                let skip = expenses.len().saturating_sub(limit);
                expenses.drain(..skip);
            }

            let names = category_names(&ctx.categories().list_all()?);
            print!(
                "{}",
                format_expense_list(&expenses, &names, ctx.symbol(), &ctx.settings.date_format)
            );
        }

        ExpenseCommands::Delete { id } => {
            let id = resolve_expense_id(ctx, &id)?;
            let expense = service.delete(id)?;
            println!(
                "Deleted expense of {} on {}",
                ctx.settings.format_money(expense.amount),
                expense.day()
            );
        }
    }

    Ok(())
}

/// Accept a full id, or the short form shown in listings
fn resolve_expense_id(ctx: &AppContext, input: &str) -> HearthResult<ExpenseId> {
    if let Ok(id) = input.parse::<ExpenseId>() {
        return Ok(id);
    }

    let wanted = input.trim();
    let matches: Vec<ExpenseId> = ctx
        .expenses()
        .list_all()?
        .into_iter()
        .map(|e| e.id)
        .filter(|id| id.to_string() == wanted)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(HearthError::expense_not_found(wanted)),
        _ => Err(HearthError::Validation(format!(
            "'{}' matches several expenses; use the full ID",
            wanted
        ))),
    }
}
