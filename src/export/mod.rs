//! Data export
//!
//! - CSV: expenses and budget allocations, for spreadsheets
//! - JSON: a full household snapshot with schema versioning

pub mod csv;
pub mod json;

pub use self::csv::{export_allocations_csv, export_expenses_csv};
pub use self::json::{export_household_json, import_from_json, HouseholdSnapshot, EXPORT_SCHEMA_VERSION};
