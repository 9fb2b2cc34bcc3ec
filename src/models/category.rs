//! Category model
//!
//! Categories group expenses and receive budget allocations. Archiving is a
//! soft delete: archived categories drop out of active listings but their ids
//! stay resolvable for the expenses and allocations that reference them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, HouseholdId};

/// Default color for new categories
pub const DEFAULT_COLOR: &str = "#9E9E9E";

/// Default icon for new categories
pub const DEFAULT_ICON: &str = "tag";

/// A spending category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Household this category belongs to
    pub household_id: HouseholdId,

    /// Display name
    pub name: String,

    /// Display color (hex string, e.g. "#4CAF50")
    #[serde(default = "default_color")]
    pub color: String,

    /// Icon name
    #[serde(default = "default_icon")]
    pub icon: String,

    /// Whether this category is archived (soft-deleted)
    #[serde(default)]
    pub archived: bool,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last modified
    pub updated_at: DateTime<Utc>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

impl Category {
    /// Create a new category
    pub fn new(household_id: HouseholdId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            household_id,
            name: name.into(),
            color: default_color(),
            icon: default_icon(),
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new category with explicit color and icon
    pub fn with_style(
        household_id: HouseholdId,
        name: impl Into<String>,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        let mut category = Self::new(household_id, name);
        category.color = color.into();
        category.icon = icon.into();
        category
    }

    /// Whether this category shows up in active listings
    pub fn is_active(&self) -> bool {
        !self.archived
    }

    /// Archive (soft-delete) the category
    pub fn archive(&mut self) {
        self.archived = true;
        self.updated_at = Utc::now();
    }

    /// Restore an archived category
    pub fn unarchive(&mut self) {
        self.archived = false;
        self.updated_at = Utc::now();
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if self.name.len() > 50 {
            return Err(CategoryValidationError::NameTooLong(self.name.len()));
        }

        if !is_hex_color(&self.color) {
            return Err(CategoryValidationError::InvalidColor(self.color.clone()));
        }

        Ok(())
    }
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => (hex.len() == 6 || hex.len() == 3) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.archived {
            write!(f, " (archived)")?;
        }
        Ok(())
    }
}

/// Starter categories created by `hearth init` as (name, color, icon)
pub const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Rent", "#5C6BC0", "home"),
    ("Utilities", "#26A69A", "bolt"),
    ("Groceries", "#66BB6A", "cart"),
    ("Transportation", "#42A5F5", "car"),
    ("Health", "#EF5350", "heart"),
    ("Dining Out", "#FFA726", "utensils"),
    ("Entertainment", "#AB47BC", "film"),
    ("Shopping", "#EC407A", "bag"),
    ("Emergency Fund", "#8D6E63", "shield"),
    ("Investments", "#78909C", "chart"),
];

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    InvalidColor(String),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 50)", len)
            }
            Self::InvalidColor(color) => write!(f, "Invalid color '{}', expected #RRGGBB", color),
        }
    }
}

impl std::error::Error for CategoryValidationError {}
