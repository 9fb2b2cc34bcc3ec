//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::diff::summarize_changes;

/// Kind of mutation recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        };
        f.write_str(label)
    }
}

/// Entity kinds that appear in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Category,
    Expense,
    Budget,
    CategoryAllocation,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Category => "Category",
            Self::Expense => "Expense",
            Self::Budget => "Budget",
            Self::CategoryAllocation => "CategoryAllocation",
        };
        f.write_str(label)
    }
}

/// One line of the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub entity_type: EntityType,
    pub entity_id: String,

    /// Display label for the entity (category name, budget name, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// State before the mutation (updates and deletes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    /// State after the mutation (creates and updates)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// Field-level change summary for updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<String>,
}

impl AuditEntry {
    fn blank(operation: Operation, entity_type: EntityType, entity_id: String) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id,
            label: None,
            before: None,
            after: None,
            changes: None,
        }
    }

    /// Entry for a newly created entity
    pub fn created<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::blank(Operation::Create, entity_type, entity_id.into());
        entry.after = serde_json::to_value(entity).ok();
        entry
    }

    /// Entry for a modified entity; the change summary is derived from the
    /// two states
    pub fn updated<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let mut entry = Self::blank(Operation::Update, entity_type, entity_id.into());
        entry.before = serde_json::to_value(before).ok();
        entry.after = serde_json::to_value(after).ok();
        if let (Some(b), Some(a)) = (&entry.before, &entry.after) {
            entry.changes = summarize_changes(b, a);
        }
        entry
    }

    /// Entry for a removed entity
    pub fn deleted<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::blank(Operation::Delete, entity_type, entity_id.into());
        entry.before = serde_json::to_value(entity).ok();
        entry
    }

    /// Attach a display label
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether an update actually changed anything worth recording
    pub fn has_changes(&self) -> bool {
        self.operation != Operation::Update || self.changes.is_some()
    }
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.operation,
            self.entity_type,
            self.entity_id
        )?;
        if let Some(label) = &self.label {
            write!(f, " ({})", label)?;
        }
        if let Some(changes) = &self.changes {
            write!(f, ": {}", changes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_created_entry_has_only_after() {
        let entry = AuditEntry::created(EntityType::Category, "c1", &json!({"name": "Rent"}))
            .labeled("Rent");
        assert_eq!(entry.operation, Operation::Create);
        assert!(entry.before.is_none());
        assert_eq!(entry.after, Some(json!({"name": "Rent"})));
        assert!(entry.to_string().contains("CREATE Category c1 (Rent)"));
    }

    #[test]
    fn test_updated_entry_summarizes() {
        let entry = AuditEntry::updated(
            EntityType::Budget,
            "b1",
            &json!({"name": "March", "total_amount": 100.0}),
            &json!({"name": "March", "total_amount": 120.0}),
        );
        assert_eq!(entry.changes.as_deref(), Some("total_amount: 100.0 -> 120.0"));
        assert!(entry.has_changes());
    }

    #[test]
    fn test_noop_update_has_no_changes() {
        let state = json!({"name": "March"});
        let entry = AuditEntry::updated(EntityType::Budget, "b1", &state, &state);
        assert!(!entry.has_changes());
    }

    #[test]
    fn test_entity_type_serializes_snake_case() {
        let json = serde_json::to_string(&EntityType::CategoryAllocation).unwrap();
        assert_eq!(json, "\"category_allocation\"");
    }
}
