//! Category service
//!
//! CRUD over a household's categories. Categories are never deleted:
//! archiving hides them from active listings while their ids keep resolving
//! for the expenses and allocations that reference them.

use tracing::{debug, info};

use super::record_audit;
use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::error::{HearthError, HearthResult};
use crate::models::{Category, CategoryId, HouseholdId};
use crate::storage::records::{from_record, to_record};
use crate::storage::{initialize_household, CollectionPath, DocumentStore, Query};

/// Fields that can be changed on an existing category
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges<'s> {
    pub name: Option<&'s str>,
    pub color: Option<&'s str>,
    pub icon: Option<&'s str>,
}

/// Service for category management
pub struct CategoryService<'a> {
    store: &'a dyn DocumentStore,
    household: HouseholdId,
    audit: Option<&'a AuditLogger>,
}

impl<'a> CategoryService<'a> {
    pub fn new(store: &'a dyn DocumentStore, household: HouseholdId) -> Self {
        Self {
            store,
            household,
            audit: None,
        }
    }

    /// Record every mutation in `audit`
    pub fn with_audit(mut self, audit: Option<&'a AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    fn path(&self) -> CollectionPath {
        CollectionPath::categories(self.household)
    }

    /// Create a category. The name must be unique among active categories,
    /// ignoring case.
    pub fn create(&self, name: &str, color: Option<&str>, icon: Option<&str>) -> HearthResult<Category> {
        let name = name.trim();
        self.ensure_name_free(name, None)?;

        let mut category = Category::new(self.household, name);
        if let Some(color) = color {
            category.color = color.to_string();
        }
        if let Some(icon) = icon {
            category.icon = icon.to_string();
        }
        category
            .validate()
            .map_err(|e| HearthError::Validation(e.to_string()))?;

        self.store
            .create(&self.path(), &category.id.key(), to_record(&category)?)?;

        info!(category = %category.id, name = %category.name, "created category");
        record_audit(
            self.audit,
            AuditEntry::created(EntityType::Category, category.id.key(), &category).labeled(&category.name),
        );

        Ok(category)
    }

    /// Seed the default categories if the household has none
    pub fn seed_defaults(&self) -> HearthResult<usize> {
        initialize_household(self.store, self.household)
    }

    /// Get a category by id, archived or not
    pub fn get(&self, id: CategoryId) -> HearthResult<Category> {
        self.find_by_id(id)?
            .ok_or_else(|| HearthError::category_not_found(id.to_string()))
    }

    fn find_by_id(&self, id: CategoryId) -> HearthResult<Option<Category>> {
        self.store
            .get(&self.path(), &id.key())?
            .map(from_record)
            .transpose()
    }

    /// Find a category by name or id.
    ///
    /// Names are matched case-insensitively, preferring an active category
    /// over an archived one with the same name.
    pub fn find(&self, identifier: &str) -> HearthResult<Option<Category>> {
        let wanted = identifier.trim();
        let mut matches: Vec<Category> = self
            .list_all()?
            .into_iter()
            .filter(|c| c.name.eq_ignore_ascii_case(wanted))
            .collect();
        matches.sort_by_key(|c| c.archived);

        if let Some(category) = matches.into_iter().next() {
            return Ok(Some(category));
        }

        match wanted.parse::<CategoryId>() {
            Ok(id) => self.find_by_id(id),
            Err(_) => Ok(None),
        }
    }

    /// Like [`find`](Self::find), failing with `NotFound` when nothing matches
    pub fn resolve(&self, identifier: &str) -> HearthResult<Category> {
        self.find(identifier)?
            .ok_or_else(|| HearthError::category_not_found(identifier))
    }

    /// Every category, sorted by name
    pub fn list_all(&self) -> HearthResult<Vec<Category>> {
        let mut categories = self
            .store
            .query(&self.path(), &Query::all())?
            .into_iter()
            .map(from_record)
            .collect::<HearthResult<Vec<Category>>>()?;
        categories.sort_by_key(|c| c.name.to_lowercase());
        debug!(count = categories.len(), "listed categories");
        Ok(categories)
    }

    /// Categories that are not archived, sorted by name
    pub fn list_active(&self) -> HearthResult<Vec<Category>> {
        let mut categories = self.list_all()?;
        categories.retain(Category::is_active);
        Ok(categories)
    }

    /// Rename or restyle a category
    pub fn update(&self, id: CategoryId, changes: CategoryChanges<'_>) -> HearthResult<Category> {
        let before = self.get(id)?;
        let mut category = before.clone();

        if let Some(name) = changes.name {
            let name = name.trim();
            if category.is_active() {
                self.ensure_name_free(name, Some(id))?;
            }
            category.name = name.to_string();
        }
        if let Some(color) = changes.color {
            category.color = color.to_string();
        }
        if let Some(icon) = changes.icon {
            category.icon = icon.to_string();
        }

        category.updated_at = chrono::Utc::now();
        category
            .validate()
            .map_err(|e| HearthError::Validation(e.to_string()))?;

        self.save(&before, &category)?;
        Ok(category)
    }

    /// Hide a category from active listings
    pub fn archive(&self, id: CategoryId) -> HearthResult<Category> {
        let before = self.get(id)?;
        if before.archived {
            return Err(HearthError::InvalidState(format!(
                "Category '{}' is already archived",
                before.name
            )));
        }

        let mut category = before.clone();
        category.archive();
        self.save(&before, &category)?;
        info!(category = %id, "archived category");
        Ok(category)
    }

    /// Bring an archived category back. Fails if an active category has
    /// taken its name in the meantime.
    pub fn unarchive(&self, id: CategoryId) -> HearthResult<Category> {
        let before = self.get(id)?;
        if before.is_active() {
            return Err(HearthError::InvalidState(format!(
                "Category '{}' is not archived",
                before.name
            )));
        }
        self.ensure_name_free(&before.name, Some(id))?;

        let mut category = before.clone();
        category.unarchive();
        self.save(&before, &category)?;
        info!(category = %id, "unarchived category");
        Ok(category)
    }

    fn save(&self, before: &Category, after: &Category) -> HearthResult<()> {
        self.store
            .update(&self.path(), &after.id.key(), to_record(after)?)?;
        record_audit(
            self.audit,
            AuditEntry::updated(EntityType::Category, after.id.key(), before, after).labeled(&after.name),
        );
        Ok(())
    }

    fn ensure_name_free(&self, name: &str, except: Option<CategoryId>) -> HearthResult<()> {
        let taken = self
            .list_active()?
            .into_iter()
            .any(|c| Some(c.id) != except && c.name.eq_ignore_ascii_case(name));

        if taken {
            return Err(HearthError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::DEFAULT_CATEGORIES;
    use crate::storage::MemoryStore;

    fn setup() -> (MemoryStore, HouseholdId) {
        (MemoryStore::new(), HouseholdId::new())
    }

    #[test]
    fn test_create_and_get() {
        let (store, household) = setup();
        let service = CategoryService::new(&store, household);

        let category = service.create("  Groceries ", Some("#4CAF50"), None).unwrap();
        assert_eq!(category.name, "Groceries");

        let fetched = service.get(category.id).unwrap();
        assert_eq!(fetched, category);
    }

    #[test]
    fn test_create_validation() {
        let (store, household) = setup();
        let service = CategoryService::new(&store, household);

        assert!(service.create("   ", None, None).unwrap_err().is_validation());
        assert!(service.create(&"x".repeat(51), None, None).unwrap_err().is_validation());
        assert!(service.create("Pets", Some("blue"), None).unwrap_err().is_validation());
    }

    #[test]
    fn test_duplicate_name_among_active() {
        let (store, household) = setup();
        let service = CategoryService::new(&store, household);

        let first = service.create("Dining", None, None).unwrap();
        let err = service.create("dining", None, None).unwrap_err();
        assert!(matches!(err, HearthError::Duplicate { .. }));

        // an archived name can be reused
        service.archive(first.id).unwrap();
        let second = service.create("Dining", None, None).unwrap();

        // but the archived one can't come back while the name is taken
        let err = service.unarchive(first.id).unwrap_err();
        assert!(matches!(err, HearthError::Duplicate { .. }));

        // find prefers the active one
        assert_eq!(service.find("DINING").unwrap().unwrap().id, second.id);
    }

    #[test]
    fn test_archive_keeps_id_resolvable() {
        let (store, household) = setup();
        let service = CategoryService::new(&store, household);

        let category = service.create("Gym", None, None).unwrap();
        service.archive(category.id).unwrap();

        assert!(service.list_active().unwrap().is_empty());
        assert_eq!(service.list_all().unwrap().len(), 1);
        assert!(service.get(category.id).unwrap().archived);

        let err = service.archive(category.id).unwrap_err();
        assert!(matches!(err, HearthError::InvalidState(_)));

        let restored = service.unarchive(category.id).unwrap();
        assert!(restored.is_active());
    }

    #[test]
    fn test_update() {
        let (store, household) = setup();
        let service = CategoryService::new(&store, household);

        let rent = service.create("Rent", None, None).unwrap();
        service.create("Utilities", None, None).unwrap();

        let renamed = service
            .update(
                rent.id,
                CategoryChanges {
                    name: Some("Housing"),
                    icon: Some("home"),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "Housing");
        assert_eq!(renamed.icon, "home");
        assert_eq!(service.get(rent.id).unwrap().name, "Housing");

        let err = service
            .update(
                rent.id,
                CategoryChanges {
                    name: Some("utilities"),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, HearthError::Duplicate { .. }));
    }

    #[test]
    fn test_find_by_id_and_missing() {
        let (store, household) = setup();
        let service = CategoryService::new(&store, household);

        let category = service.create("Travel", None, None).unwrap();
        assert_eq!(service.find(&category.id.key()).unwrap().unwrap().id, category.id);
        assert_eq!(service.find(&category.id.to_string()).unwrap(), None);
        assert!(service.find("nope").unwrap().is_none());
        assert!(service.get(CategoryId::new()).unwrap_err().is_not_found());
        assert!(service.resolve("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_seed_defaults() {
        let (store, household) = setup();
        let service = CategoryService::new(&store, household);
        assert_eq!(service.seed_defaults().unwrap(), DEFAULT_CATEGORIES.len());
        assert_eq!(service.list_active().unwrap().len(), DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn test_households_are_isolated() {
        let store = MemoryStore::new();
        let ours = CategoryService::new(&store, HouseholdId::new());
        let theirs = CategoryService::new(&store, HouseholdId::new());

        ours.create("Rent", None, None).unwrap();
        assert!(theirs.list_all().unwrap().is_empty());
        theirs.create("Rent", None, None).unwrap();
    }
}
