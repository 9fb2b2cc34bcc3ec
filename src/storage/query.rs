//! Collection queries
//!
//! A query is a conjunction of field filters, an optional ordering and an
//! optional limit. Numbers compare numerically, strings lexically; dates are
//! stored as ISO-8601 strings so lexical order is chronological order.

use serde_json::Value;
use std::cmp::Ordering;

use super::document::{Document, Fields};

/// Comparison operator of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A single `field op value` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    /// Whether a document's fields satisfy this filter.
    ///
    /// A missing field or an incomparable value never matches.
    pub fn matches(&self, fields: &Fields) -> bool {
        let Some(actual) = fields.get(&self.field) else {
            return false;
        };

        match compare_values(actual, &self.value) {
            Some(ordering) => match self.op {
                FilterOp::Eq => ordering == Ordering::Equal,
                FilterOp::Lt => ordering == Ordering::Less,
                FilterOp::Le => ordering != Ordering::Greater,
                FilterOp::Gt => ordering == Ordering::Greater,
                FilterOp::Ge => ordering != Ordering::Less,
            },
            None => false,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// A query over one collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    /// A query matching every document in the collection
    pub fn all() -> Self {
        Self::default()
    }

    fn filter(mut self, field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn where_lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Lt, value)
    }

    pub fn where_le(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Le, value)
    }

    pub fn where_gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Gt, value)
    }

    pub fn where_ge(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Ge, value)
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a document passes every filter
    pub fn matches(&self, fields: &Fields) -> bool {
        self.filters.iter().all(|f| f.matches(fields))
    }

    /// Filter, order and limit a set of documents.
    ///
    /// Without an explicit ordering, documents are returned by id. Documents
    /// missing the ordering field sort last.
    pub fn apply(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut results: Vec<Document> = documents
            .into_iter()
            .filter(|d| self.matches(&d.fields))
            .collect();

        match &self.order_by {
            Some((field, direction)) => {
                results.sort_by(|a, b| {
                    let ordering = match (a.fields.get(field), b.fields.get(field)) {
                        (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                        (Some(_), None) => return Ordering::Less,
                        (None, Some(_)) => return Ordering::Greater,
                        (None, None) => Ordering::Equal,
                    };
                    let ordering = match direction {
                        Direction::Ascending => ordering,
                        Direction::Descending => ordering.reverse(),
                    };
                    ordering.then_with(|| a.id.cmp(&b.id))
                });
            }
            None => results.sort_by(|a, b| a.id.cmp(&b.id)),
        }

        if let Some(limit) = self.limit {
            results.truncate(limit);
        }

        results
    }
}

/// Compare two JSON values of the same kind
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, value: Value) -> Document {
        Document::new(id, value.as_object().unwrap().clone())
    }

    fn sample() -> Vec<Document> {
        vec![
            doc("a", json!({"start_date": "2025-01-01", "total": 100.0})),
            doc("b", json!({"start_date": "2025-03-01", "total": 300.5})),
            doc("c", json!({"start_date": "2025-02-01", "total": 200})),
            doc("d", json!({"total": 50})),
        ]
    }

    #[test]
    fn test_range_filters() {
        let query = Query::all()
            .where_le("start_date", "2025-02-15")
            .order_by("start_date", Direction::Descending);
        let ids: Vec<_> = query.apply(sample()).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_numeric_compare_mixes_int_and_float() {
        let query = Query::all().where_gt("total", 150);
        let ids: Vec<_> = query.apply(sample()).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["b", "c"]);

        let query = Query::all().where_eq("total", 200.0);
        assert_eq!(query.apply(sample()).len(), 1);
    }

    #[test]
    fn test_missing_field_sorts_last_and_never_matches() {
        let query = Query::all().order_by("start_date", Direction::Ascending);
        let ids: Vec<_> = query.apply(sample()).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "c", "b", "d"]);

        let query = Query::all().where_ge("start_date", "2000-01-01");
        assert_eq!(query.apply(sample()).len(), 3);
    }

    #[test]
    fn test_limit_and_type_mismatch() {
        let query = Query::all().order_by("total", Direction::Descending).limit(2);
        let ids: Vec<_> = query.apply(sample()).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["b", "c"]);

        let query = Query::all().where_eq("total", "100");
        assert!(query.apply(sample()).is_empty());
    }
}
