//! Documents and collection paths
//!
//! The store addresses documents by a collection path plus a document id.
//! Paths alternate collection and document segments, always ending in a
//! collection: `households/{household}/budgets/{budget}/allocations`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{HearthError, HearthResult};
use crate::models::{BudgetId, HouseholdId};

/// The field map of a stored document
pub type Fields = Map<String, Value>;

/// A stored document: its id and fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Look up a top-level field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// How `set` treats fields already on a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Keep existing fields that the write does not mention
    #[default]
    Merge,
    /// Overwrite the whole document
    Replace,
}

/// Address of a collection in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionPath(String);

const HOUSEHOLDS: &str = "households";

impl CollectionPath {
    /// Parse and validate a collection path
    pub fn parse(path: &str) -> HearthResult<Self> {
        let segments: Vec<&str> = path.split('/').collect();

        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(HearthError::Storage(format!(
                "Invalid collection path '{}': empty segment",
                path
            )));
        }

        if segments.len() % 2 == 0 {
            return Err(HearthError::Storage(format!(
                "Invalid collection path '{}': points at a document, not a collection",
                path
            )));
        }

        Ok(Self(path.to_string()))
    }

    /// `households/{household}/categories`
    pub fn categories(household: HouseholdId) -> Self {
        Self(format!("{}/{}/categories", HOUSEHOLDS, household.key()))
    }

    /// `households/{household}/expenses`
    pub fn expenses(household: HouseholdId) -> Self {
        Self(format!("{}/{}/expenses", HOUSEHOLDS, household.key()))
    }

    /// `households/{household}/budgets`
    pub fn budgets(household: HouseholdId) -> Self {
        Self(format!("{}/{}/budgets", HOUSEHOLDS, household.key()))
    }

    /// `households/{household}/budgets/{budget}/allocations`
    pub fn allocations(household: HouseholdId, budget: BudgetId) -> Self {
        Self(format!(
            "{}/{}/budgets/{}/allocations",
            HOUSEHOLDS,
            household.key(),
            budget.key()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last segment: the collection's own name
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionPath {
    type Err = HearthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CollectionPath {
    type Error = HearthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CollectionPath> for String {
    fn from(path: CollectionPath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_paths() {
        let household = HouseholdId::new();
        let budget = BudgetId::new();

        let path = CollectionPath::allocations(household, budget);
        assert_eq!(path.name(), "allocations");
        assert!(path.as_str().starts_with("households/"));
        assert_eq!(CollectionPath::parse(path.as_str()).unwrap(), path);
        assert_eq!(CollectionPath::expenses(household).name(), "expenses");
    }

    #[test]
    fn test_rejects_document_paths() {
        assert!(CollectionPath::parse("households/abc").is_err());
        assert!(CollectionPath::parse("households//budgets").is_err());
        assert!(CollectionPath::parse("").is_err());
        assert!(CollectionPath::parse("households").is_ok());
    }

    #[test]
    fn test_path_serializes_as_string() {
        let path = CollectionPath::parse("households/h1/categories").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"households/h1/categories\"");

        let bad: Result<CollectionPath, _> = serde_json::from_str("\"a/b\"");
        assert!(bad.is_err());
    }
}
