//! Storage initialization
//!
//! Handles first-run setup of a household: seeds the starter categories when
//! the household has none.

use tracing::info;

use super::document::CollectionPath;
use super::query::Query;
use super::records::to_record;
use super::DocumentStore;
use crate::error::HearthResult;
use crate::models::category::DEFAULT_CATEGORIES;
use crate::models::{Category, HouseholdId};

/// Seed default categories for a fresh household.
///
/// Returns the number of categories created; zero when the household
/// already has categories.
pub fn initialize_household(store: &dyn DocumentStore, household: HouseholdId) -> HearthResult<usize> {
    let path = CollectionPath::categories(household);

    if !store.query(&path, &Query::all().limit(1))?.is_empty() {
        return Ok(0);
    }

    for (name, color, icon) in DEFAULT_CATEGORIES {
        let category = Category::with_style(household, *name, *color, *icon);
        store.create(&path, &category.id.key(), to_record(&category)?)?;
    }

    info!(household = %household, count = DEFAULT_CATEGORIES.len(), "seeded default categories");
    Ok(DEFAULT_CATEGORIES.len())
}
