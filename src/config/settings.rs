//! User settings for Hearth
//!
//! Stored as pretty JSON next to the data directory. Unknown or missing
//! fields fall back to defaults so older files keep loading.

use serde::{Deserialize, Serialize};

use super::paths::HearthPaths;
use crate::error::{HearthError, HearthResult};
use crate::models::{HouseholdId, Money, PeriodKind};
use crate::services::{RuleBucket, ZeroAllocationPolicy};
use crate::storage::file_io::{read_json, write_json_atomic};

const SCHEMA_VERSION: u32 = 1;

/// Settings keys that `hearth config set` accepts
pub const SETTABLE_KEYS: &[&str] = &[
    "currency_symbol",
    "date_format",
    "default_period",
    "zero_allocation_policy",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Household this installation works on; set by `hearth init`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub household_id: Option<HouseholdId>,

    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// strftime format for displayed dates
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Period used when a budget is created without explicit dates
    #[serde(default)]
    pub default_period: PeriodKind,

    #[serde(default)]
    pub zero_allocation_policy: ZeroAllocationPolicy,

    /// Buckets used by rule-based reallocation
    #[serde(default = "RuleBucket::fifty_thirty_twenty")]
    pub rule_buckets: Vec<RuleBucket>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            household_id: None,
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            default_period: PeriodKind::default(),
            zero_allocation_policy: ZeroAllocationPolicy::default(),
            rule_buckets: RuleBucket::fifty_thirty_twenty(),
        }
    }
}

impl Settings {
    /// Load settings, or defaults if the file doesn't exist yet.
    /// Nothing is written until [`save`](Self::save).
    pub fn load_or_create(paths: &HearthPaths) -> HearthResult<Self> {
        read_json(&paths.settings_file())
            .map_err(|e| HearthError::Config(format!("Failed to load settings: {}", e)))
    }

    pub fn save(&self, paths: &HearthPaths) -> HearthResult<()> {
        paths.ensure_directories()?;
        write_json_atomic(&paths.settings_file(), self)
    }

    /// The configured household, or an error pointing at `hearth init`
    pub fn household(&self) -> HearthResult<HouseholdId> {
        self.household_id.ok_or_else(|| {
            HearthError::Config("No household configured. Run 'hearth init' first.".into())
        })
    }

    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }

    /// Change one setting from its string form
    pub fn set(&mut self, key: &str, value: &str) -> HearthResult<()> {
        match key {
            "currency_symbol" => {
                if value.trim().is_empty() {
                    return Err(HearthError::Validation("Currency symbol cannot be empty".into()));
                }
                self.currency_symbol = value.trim().to_string();
            }
            "date_format" => {
                if value.trim().is_empty() {
                    return Err(HearthError::Validation("Date format cannot be empty".into()));
                }
                self.date_format = value.to_string();
            }
            "default_period" => {
                self.default_period = value
                    .parse()
                    .map_err(|e| HearthError::Validation(format!("{}", e)))?;
            }
            "zero_allocation_policy" => {
                self.zero_allocation_policy = value.parse()?;
            }
            other => {
                return Err(HearthError::Validation(format!(
                    "Unknown setting '{}'. Settable keys: {}",
                    other,
                    SETTABLE_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Current values of the settable keys, for display
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("currency_symbol", self.currency_symbol.clone()),
            ("date_format", self.date_format.clone()),
            ("default_period", self.default_period.to_string()),
            ("zero_allocation_policy", self.zero_allocation_policy.to_string()),
        ]
    }
}
