//! Export CLI commands

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Subcommand;

use super::AppContext;
use crate::error::HearthResult;
use crate::export::{export_allocations_csv, export_expenses_csv, export_household_json};

/// Export subcommands
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export expenses (or budget allocations) as CSV
    Csv {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export budget allocations instead of expenses
        #[arg(long)]
        allocations: bool,
    },

    /// Export the whole household as JSON
    Json {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn open_output(output: &Option<PathBuf>) -> HearthResult<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

/// Handle an export command
pub fn handle_export_command(ctx: &AppContext, cmd: ExportCommands) -> HearthResult<()> {
    match cmd {
        ExportCommands::Csv {
            output,
            allocations,
        } => {
            let mut writer = open_output(&output)?;
            let rows = if allocations {
                export_allocations_csv(&ctx.store, ctx.household, &mut writer)?
            } else {
                export_expenses_csv(&ctx.store, ctx.household, &mut writer)?
            };
            writer.flush()?;

            if let Some(path) = output {
                println!("Exported {} row(s) to {}", rows, path.display());
            }
        }

        ExportCommands::Json { output, pretty } => {
            let mut writer = open_output(&output)?;
            let snapshot = export_household_json(&ctx.store, ctx.household, &mut writer, pretty)?;
            if output.is_none() {
                writeln!(writer)?;
            }
            writer.flush()?;

            if let Some(path) = output {
                println!(
                    "Exported {} categories, {} expenses and {} budgets to {}",
                    snapshot.metadata.category_count,
                    snapshot.metadata.expense_count,
                    snapshot.metadata.budget_count,
                    path.display()
                );
            }
        }
    }

    Ok(())
}
