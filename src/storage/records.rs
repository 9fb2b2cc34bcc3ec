//! Entity <-> record conversion
//!
//! Every entity maps 1:1 to a document whose fields are the entity's serde
//! representation. Budgets are the exception: their allocations live in a
//! child collection, one document per allocation, ordered by a `position`
//! field.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::document::{Document, Fields};
use crate::error::{HearthError, HearthResult};
use crate::models::{Budget, CategoryAllocation};

/// Field holding an allocation's index within its budget
pub const POSITION_FIELD: &str = "position";

const ALLOCATIONS_FIELD: &str = "allocations";
const PERCENTAGE_FIELD: &str = "percentage";

/// Serialize an entity into a document field map
pub fn to_record<T: Serialize>(entity: &T) -> HearthResult<Fields> {
    match serde_json::to_value(entity)? {
        Value::Object(fields) => Ok(fields),
        other => Err(HearthError::Storage(format!(
            "Expected an object record, got {}",
            other
        ))),
    }
}

/// Deserialize an entity from a stored document
pub fn from_record<T: DeserializeOwned>(document: Document) -> HearthResult<T> {
    let id = document.id;
    serde_json::from_value(Value::Object(document.fields)).map_err(|e| {
        HearthError::Storage(format!("Malformed record '{}': {}", id, e))
    })
}

/// The budget's own record, without its allocations
pub fn budget_record(budget: &Budget) -> HearthResult<Fields> {
    let mut fields = to_record(budget)?;
    fields.remove(ALLOCATIONS_FIELD);
    Ok(fields)
}

/// An allocation's child record, tagged with its position in the budget.
///
/// `percentage` is always present (null when unset) so a merge write clears
/// a stale value.
pub fn allocation_record(allocation: &CategoryAllocation, position: usize) -> HearthResult<Fields> {
    let mut fields = to_record(allocation)?;
    fields.entry(PERCENTAGE_FIELD).or_insert(Value::Null);
    fields.insert(POSITION_FIELD.to_string(), Value::from(position as u64));
    Ok(fields)
}

/// Reassemble a budget from its record and its allocation records.
///
/// `allocations` must already be ordered by position.
pub fn budget_from_records(document: Document, allocations: Vec<Document>) -> HearthResult<Budget> {
    let mut budget: Budget = from_record(document)?;
    budget.allocations = allocations
        .into_iter()
        .map(from_record)
        .collect::<HearthResult<Vec<CategoryAllocation>>>()?;
    Ok(budget)
}
