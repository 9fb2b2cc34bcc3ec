//! Budget CLI commands

use clap::{Subcommand, ValueEnum};

use super::{parse_date, parse_money, today, AppContext};
use crate::display::{category_names, format_budget_details, format_budget_list, format_progress_report};
use crate::error::{HearthError, HearthResult};
use crate::models::{Budget, BudgetId, CategoryAllocation, Money, PeriodKind};
use crate::services::{retain_positive, AllocationStrategy};

/// Built-in ways to fill a budget's allocations
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Same amount for every active category
    Equal,
    /// Percentage buckets from the settings (50/30/20 by default)
    Rule,
}

impl StrategyArg {
    fn strategy(self, ctx: &AppContext) -> AllocationStrategy {
        match self {
            Self::Equal => AllocationStrategy::Equal,
            Self::Rule => AllocationStrategy::Rule(ctx.settings.rule_buckets.clone()),
        }
    }
}

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a budget
    Create {
        /// Budget name
        name: String,
        /// Total amount to spend over the period
        total: String,
        /// Period kind (daily, weekly, monthly, yearly, custom)
        #[arg(short, long)]
        period: Option<String>,
        /// First day, or any day inside the period (YYYY-MM-DD, default today)
        #[arg(long)]
        start: Option<String>,
        /// Last day; makes the budget a custom range
        #[arg(long)]
        end: Option<String>,
        /// Allocation as CATEGORY=AMOUNT or CATEGORY=PERCENT% (repeatable)
        #[arg(short, long = "allocate", value_name = "CATEGORY=AMOUNT")]
        allocations: Vec<String>,
        /// Fill allocations with a built-in strategy instead
        #[arg(short, long, value_enum, conflicts_with = "allocations")]
        strategy: Option<StrategyArg>,
    },

    /// Show a budget and its allocations
    Show {
        /// Budget name or ID
        budget: String,
    },

    /// List all budgets
    List,

    /// Show the budget covering today
    Current,

    /// Show spending progress against a budget
    Progress {
        /// Budget name or ID (default: the current budget)
        budget: Option<String>,
    },

    /// Recompute a budget's allocations
    Reallocate {
        /// Budget name or ID
        budget: String,
        /// Strategy to apply
        #[arg(short, long, value_enum, default_value = "equal")]
        strategy: StrategyArg,
    },

    /// Delete a budget and its allocations
    Delete {
        /// Budget name or ID
        budget: String,
    },
}

/// Handle a budget command
pub fn handle_budget_command(ctx: &AppContext, cmd: BudgetCommands) -> HearthResult<()> {
    let service = ctx.budgets();

    match cmd {
        BudgetCommands::Create {
            name,
            total,
            period,
            start,
            end,
            allocations,
            strategy,
        } => {
            let total = parse_money(&total)?;
            let anchor = match start {
                Some(start) => parse_date(&start)?,
                None => today(),
            };
            let kind = match (period, &end) {
                (Some(period), _) => period
                    .parse::<PeriodKind>()
                    .map_err(|e| HearthError::Validation(e.to_string()))?,
                (None, Some(_)) => PeriodKind::Custom,
                (None, None) => ctx.settings.default_period,
            };

            let mut budget = match (kind, end) {
                (PeriodKind::Custom, Some(end)) => {
                    Budget::new(ctx.household, name, total, anchor, parse_date(&end)?, kind)
                }
                (PeriodKind::Custom, None) => {
                    return Err(HearthError::Validation(
                        "A custom budget needs --start and --end".into(),
                    ))
                }
                (_, Some(_)) => {
                    return Err(HearthError::Validation(
                        "--end only applies to custom budgets".into(),
                    ))
                }
                (kind, None) => Budget::for_period(ctx.household, name, total, kind, anchor)
                    .ok_or_else(|| HearthError::Validation(format!("No {} period contains {}", kind, anchor)))?,
            };

            let planned = match strategy {
                Some(strategy) => strategy
                    .strategy(ctx)
                    .allocate(total, &ctx.categories().list_all()?),
                None => retain_positive(
                    allocations
                        .iter()
                        .map(|arg| parse_allocation(ctx, arg, total))
                        .collect::<HearthResult<Vec<_>>>()?,
                ),
            };
            budget.set_allocations(planned);

            let budget = service.create(budget)?;
            println!(
                "Created budget: {} ({} to {})",
                budget.name, budget.start_date, budget.end_date
            );
            println!("  ID: {}", budget.id.key());
            println!(
                "  Allocated {} of {}",
                ctx.settings.format_money(budget.allocated_total()),
                ctx.settings.format_money(budget.total_amount)
            );
        }

        BudgetCommands::Show { budget } => {
            let budget = resolve_budget(ctx, &budget)?;
            let names = category_names(&ctx.categories().list_all()?);
            print!("{}", format_budget_details(&budget, &names, ctx.symbol()));
        }

        BudgetCommands::List => {
            let budgets = service.list()?;
            println!("{}", format_budget_list(&budgets, today(), ctx.symbol()));
        }

        BudgetCommands::Current => {
            let day = today();
            match service.find_current(day)? {
                Some(budget) => {
                    let names = category_names(&ctx.categories().list_all()?);
                    print!("{}", format_budget_details(&budget, &names, ctx.symbol()));
                }
                None => println!("No budget covers {}.", day),
            }
        }

        BudgetCommands::Progress { budget } => {
            let report = match budget {
                Some(budget) => service.report(resolve_budget(ctx, &budget)?.id)?,
                None => service.current_report(today())?,
            };
            let names = category_names(&ctx.categories().list_all()?);
            print!("{}", format_progress_report(&report, &names, ctx.symbol()));
        }

        BudgetCommands::Reallocate { budget, strategy } => {
            let budget = resolve_budget(ctx, &budget)?;
            let strategy = strategy.strategy(ctx);
            let updated = service.reallocate(budget.id, &strategy)?;
            println!(
                "Reallocated '{}' ({}): {} across {} categories",
                updated.name,
                strategy.label(),
                ctx.settings.format_money(updated.allocated_total()),
                updated.allocations.len()
            );
        }

        BudgetCommands::Delete { budget } => {
            let budget = resolve_budget(ctx, &budget)?;
            service.delete(budget.id)?;
            println!("Deleted budget: {}", budget.name);
        }
    }

    Ok(())
}

/// Parse `CATEGORY=AMOUNT` or `CATEGORY=PERCENT%`
fn parse_allocation(ctx: &AppContext, arg: &str, total: Money) -> HearthResult<CategoryAllocation> {
    let (category, amount) = arg.rsplit_once('=').ok_or_else(|| {
        HearthError::Validation(format!(
            "Invalid allocation '{}', expected CATEGORY=AMOUNT or CATEGORY=PERCENT%",
            arg
        ))
    })?;
    let category = ctx.categories().resolve(category)?;

    match amount.trim().strip_suffix('%') {
        Some(pct) => {
            let pct: f64 = pct
                .trim()
                .parse()
                .map_err(|_| HearthError::Validation(format!("Invalid percentage '{}'", amount)))?;
            if !(0.0..=100.0).contains(&pct) {
                return Err(HearthError::Validation(format!(
                    "Percentage must be between 0 and 100, got {}",
                    pct
                )));
            }
            Ok(CategoryAllocation::from_percentage(category.id, total.percent_of(pct), pct))
        }
        None => Ok(CategoryAllocation::fixed(category.id, parse_money(amount)?)),
    }
}

/// Find a budget by name (latest start wins), full ID or listed short ID
fn resolve_budget(ctx: &AppContext, input: &str) -> HearthResult<Budget> {
    let service = ctx.budgets();
    if let Ok(id) = input.parse::<BudgetId>() {
        return service.get(id);
    }

    let wanted = input.trim();
    service
        .list()?
        .into_iter()
        .rev()
        .find(|b| b.name.eq_ignore_ascii_case(wanted) || b.id.to_string() == wanted)
        .ok_or_else(|| HearthError::budget_not_found(wanted))
}
