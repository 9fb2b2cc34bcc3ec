//! Report CLI commands

use clap::Subcommand;

use super::{parse_date, today, AppContext};
use crate::display::{category_names, format_spending_report};
use crate::error::{HearthError, HearthResult};
use crate::models::PeriodKind;
use crate::services::{DateRange, SpendingAggregator};

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Spending totals by category and day
    Spending {
        /// First day (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Last day (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// Report on the period of this kind containing today
        #[arg(short, long, conflicts_with = "from")]
        period: Option<String>,
    },
}

/// Handle a report command
pub fn handle_report_command(ctx: &AppContext, cmd: ReportCommands) -> HearthResult<()> {
    match cmd {
        ReportCommands::Spending { from, to, period } => {
            let range = report_range(ctx, from, to, period)?;
            let expenses = ctx.expenses().list_in_range(&range)?;
            let summary = SpendingAggregator::aggregate(&range, &expenses);
            let names = category_names(&ctx.categories().list_all()?);
            print!("{}", format_spending_report(&summary, &range, &names, ctx.symbol()));
        }
    }

    Ok(())
}

/// Explicit dates, else the named period, else the current budget's range,
/// else the default period containing today
fn report_range(
    ctx: &AppContext,
    from: Option<String>,
    to: Option<String>,
    period: Option<String>,
) -> HearthResult<DateRange> {
    if let (Some(from), Some(to)) = (from, to) {
        return DateRange::new(parse_date(&from)?, parse_date(&to)?);
    }

    let day = today();
    let kind = match period {
        Some(period) => period
            .parse::<PeriodKind>()
            .map_err(|e| HearthError::Validation(e.to_string()))?,
        None => {
            if let Some(budget) = ctx.budgets().find_current(day)? {
                return DateRange::new(budget.start_date, budget.end_date);
            }
            ctx.settings.default_period
        }
    };

    let (start, end) = kind.range_containing(day).ok_or_else(|| {
        HearthError::Validation("A custom period needs --from and --to".into())
    })?;
    DateRange::new(start, end)
}
