//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer. Every handler
//! borrows an [`AppContext`] holding the opened store, the settings and the
//! audit log for the configured household.

pub mod audit;
pub mod auth;
pub mod budget;
pub mod category;
pub mod expense;
pub mod export;
pub mod report;

pub use self::audit::handle_audit_command;
pub use self::auth::{handle_auth_command, AuthCommands};
pub use self::budget::{handle_budget_command, BudgetCommands};
pub use self::category::{handle_category_command, CategoryCommands};
pub use self::expense::{handle_expense_command, ExpenseCommands};
pub use self::export::{handle_export_command, ExportCommands};
pub use self::report::{handle_report_command, ReportCommands};

use chrono::{Local, NaiveDate};

use crate::audit::AuditLogger;
use crate::auth::LocalAuthProvider;
use crate::config::{HearthPaths, Settings};
use crate::error::{HearthError, HearthResult};
use crate::models::{HouseholdId, Money};
use crate::services::{BudgetService, CategoryService, ExpenseService};
use crate::storage::JsonFileStore;

/// Everything a command needs, opened once per invocation
pub struct AppContext {
    pub paths: HearthPaths,
    pub settings: Settings,
    pub household: HouseholdId,
    pub store: JsonFileStore,
    pub audit: AuditLogger,
    pub auth: LocalAuthProvider,
}

impl AppContext {
    /// Open the configured household. Fails until `hearth init` has run.
    pub fn open(paths: HearthPaths, settings: Settings) -> HearthResult<Self> {
        let household = settings.household()?;
        let store = JsonFileStore::open(paths.household_file(household))?;
        let audit = AuditLogger::new(paths.audit_log());
        let auth = open_auth(&paths)?;

        Ok(Self {
            paths,
            settings,
            household,
            store,
            audit,
            auth,
        })
    }

    pub fn categories(&self) -> CategoryService<'_> {
        CategoryService::new(&self.store, self.household).with_audit(Some(&self.audit))
    }

    pub fn expenses(&self) -> ExpenseService<'_> {
        ExpenseService::new(&self.store, self.household).with_audit(Some(&self.audit))
    }

    pub fn budgets(&self) -> BudgetService<'_> {
        BudgetService::new(&self.store, self.household)
            .with_audit(Some(&self.audit))
            .with_policy(self.settings.zero_allocation_policy)
    }

    pub fn symbol(&self) -> &str {
        &self.settings.currency_symbol
    }
}

/// The local auth provider with its session persisted between invocations
pub fn open_auth(paths: &HearthPaths) -> HearthResult<LocalAuthProvider> {
    LocalAuthProvider::new(paths.credentials_file()).with_session_file(paths.session_file())
}

/// Today in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_date(input: &str) -> HearthResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        HearthError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", input))
    })
}

fn parse_money(input: &str) -> HearthResult<Money> {
    Money::parse(input)
        .map_err(|e| HearthError::Validation(format!("Invalid amount '{}': {}", input, e)))
}
