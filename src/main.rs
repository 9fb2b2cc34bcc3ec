use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use hearth::cli::{
    handle_audit_command, handle_auth_command, handle_budget_command, handle_category_command,
    handle_expense_command, handle_export_command, handle_report_command, open_auth, AppContext,
    AuthCommands, BudgetCommands, CategoryCommands, ExpenseCommands, ExportCommands, ReportCommands,
};
use hearth::config::{HearthPaths, Settings};
use hearth::models::HouseholdId;
use hearth::services::CategoryService;
use hearth::storage::JsonFileStore;

/// Filter directives, e.g. `HEARTH_LOG=hearth=debug`
const LOG_ENV: &str = "HEARTH_LOG";
/// Set to `json` for machine-readable logs
const LOG_FORMAT_ENV: &str = "HEARTH_LOG_FORMAT";

#[derive(Parser)]
#[command(
    name = "hearth",
    author = "Kaylee Beyene",
    version,
    about = "Household budget tracking from the command line",
    long_about = "Hearth tracks shared household spending: record expenses by category, \
                  plan budgets with per-category allocations and watch progress against them."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, the household and its default categories
    Init,

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Local accounts
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Category management commands
    #[command(subcommand, alias = "cat")]
    Category(CategoryCommands),

    /// Expense commands
    #[command(subcommand, alias = "exp")]
    Expense(ExpenseCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Spending reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export data as CSV or JSON
    #[command(subcommand)]
    Export(ExportCommands),

    /// Show recent changes from the audit log
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print paths and settings
    Show,
    /// Change a setting
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let paths = HearthPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Init) => run_init(&paths, settings)?,
        Some(Commands::Config { action }) => run_config(&paths, settings, action)?,
        Some(Commands::Auth(cmd)) => {
            paths.ensure_directories()?;
            let auth = open_auth(&paths)?;
            handle_auth_command(&auth, cmd)?;
        }
        Some(Commands::Category(cmd)) => handle_category_command(&open(paths, settings)?, cmd)?,
        Some(Commands::Expense(cmd)) => handle_expense_command(&open(paths, settings)?, cmd)?,
        Some(Commands::Budget(cmd)) => handle_budget_command(&open(paths, settings)?, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&open(paths, settings)?, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&open(paths, settings)?, cmd)?,
        Some(Commands::Audit { limit }) => handle_audit_command(&open(paths, settings)?, limit)?,
        None => {
            println!("Hearth - household budget tracking");
            println!();
            println!("Run 'hearth init' to get started, or 'hearth --help' for usage.");
        }
    }

    Ok(())
}

fn open(paths: HearthPaths, settings: Settings) -> Result<AppContext> {
    AppContext::open(paths, settings).context("Failed to open household data")
}

fn run_init(paths: &HearthPaths, mut settings: Settings) -> Result<()> {
    paths.ensure_directories()?;

    let household = match settings.household_id {
        Some(household) => household,
        None => {
            let household = HouseholdId::new();
            settings.household_id = Some(household);
            settings.save(paths)?;
            household
        }
    };

    let store = JsonFileStore::open(paths.household_file(household))?;
    let seeded = CategoryService::new(&store, household).seed_defaults()?;

    println!("Hearth data directory: {}", paths.base_dir().display());
    if seeded > 0 {
        println!("Created household {} with {} default categories.", household, seeded);
        println!();
        println!("Next steps:");
        println!("  hearth auth signup <email>");
        println!("  hearth budget create \"This month\" 2500 --strategy rule");
    } else {
        println!("Household {} is already initialized.", household);
    }
    Ok(())
}

fn run_config(paths: &HearthPaths, mut settings: Settings, action: Option<ConfigAction>) -> Result<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            println!("Hearth Configuration");
            println!("====================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            match settings.household_id {
                Some(household) => println!("Household:      {}", household.key()),
                None => println!("Household:      (not initialized)"),
            }
            println!();
            println!("Settings:");
            for (key, value) in settings.entries() {
                println!("  {:<24}{}", key, value);
            }
        }
        ConfigAction::Set { key, value } => {
            settings.set(&key, &value)?;
            settings.save(paths)?;
            println!("Set {} = {}", key, value);
        }
    }
    Ok(())
}
