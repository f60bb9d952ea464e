//! Query and partial-update descriptions for the document store.

use super::index::{Direction, IndexDefinition, IndexField};
use crate::error::AppError;
use crate::models::Document;
use serde_json::Value;
use std::cmp::Ordering;

/// Equality filter, single-field order and limit over one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filter: Option<(String, Value)>,
    order_by: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only documents whose `field` equals `value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = Some((field.into(), value.into()));
        self
    }

    /// Order results by `field`; documents without the field are dropped.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Composite index needed to serve this query, if any.
    ///
    /// Only a filter and an order on two different fields need one.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] when the collection or field names are invalid.
    pub(crate) fn required_index(
        &self,
        collection: &str,
    ) -> Result<Option<IndexDefinition>, AppError> {
        match (&self.filter, &self.order_by) {
            (Some((filter_field, _)), Some((order_field, direction)))
                if filter_field != order_field =>
            {
                IndexDefinition::new(
                    collection,
                    vec![
                        IndexField::new(filter_field.clone(), Direction::Asc),
                        IndexField::new(order_field.clone(), *direction),
                    ],
                )
                .map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Evaluate the query over an in-memory document list.
    pub(crate) fn apply(&self, documents: Vec<Document>) -> Vec<Document> {
        let mut matched: Vec<Document> = documents
            .into_iter()
            .filter(|doc| match &self.filter {
                Some((field, expected)) => doc.field(field) == Some(expected),
                None => true,
            })
            .collect();

        if let Some((field, direction)) = &self.order_by {
            matched.retain(|doc| doc.field(field).is_some());
            matched.sort_by(|left, right| {
                let ordering = match (left.field(field), right.field(field)) {
                    (Some(a), Some(b)) => compare_values(a, b),
                    _ => Ordering::Equal,
                };
                match direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: by type first, then by value within a type.
fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(0.0);
            let b = b.as_f64().unwrap_or(0.0);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

/// Partial update: field paths (dotted for nested fields) and their new values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    writes: Vec<(String, Value)>,
}

impl FieldUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `path` to `value`, leaving every other field untouched.
    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.writes.push((path.into(), value.into()));
        self
    }

    pub fn writes(&self) -> &[(String, Value)] {
        &self.writes
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs(rows: Vec<(&str, Value)>) -> Vec<Document> {
        rows.into_iter()
            .map(|(id, data)| match data {
                Value::Object(map) => Document::new(id, map),
                other => panic!("expected object, got {}", other),
            })
            .collect()
    }

    fn ids(documents: &[Document]) -> Vec<&str> {
        documents.iter().map(|doc| doc.id.as_str()).collect()
    }

    #[test]
    fn apply_filters_orders_and_limits() {
        let rows = docs(vec![
            ("a", json!({ "to": "x", "at": "2024-01-02" })),
            ("b", json!({ "to": "y", "at": "2024-01-03" })),
            ("c", json!({ "to": "x", "at": "2024-01-05" })),
            ("d", json!({ "to": "x" })),
        ]);

        let result = Query::new()
            .where_eq("to", "x")
            .order_by("at", Direction::Desc)
            .limit(1)
            .apply(rows.clone());
        assert_eq!(ids(&result), vec!["c"]);

        let result = Query::new().where_eq("to", "x").apply(rows.clone());
        assert_eq!(ids(&result), vec!["a", "c", "d"]);

        let result = Query::new().order_by("at", Direction::Asc).apply(rows);
        assert_eq!(ids(&result), vec!["a", "b", "c"]);
    }

    #[test]
    fn numbers_sort_numerically_and_types_sort_by_rank() {
        let rows = docs(vec![
            ("ten", json!({ "n": 10 })),
            ("two", json!({ "n": 2 })),
            ("text", json!({ "n": "1" })),
            ("flag", json!({ "n": true })),
        ]);
        let result = Query::new().order_by("n", Direction::Asc).apply(rows);
        assert_eq!(ids(&result), vec!["flag", "two", "ten", "text"]);
    }

    #[test]
    fn required_index_only_for_filter_and_order_on_different_fields() {
        let plain = Query::new().where_eq("uid", "u1");
        assert!(plain.required_index("users").expect("valid").is_none());

        let same_field = Query::new()
            .where_eq("createdAt", "x")
            .order_by("createdAt", Direction::Desc);
        assert!(same_field.required_index("notifications").expect("valid").is_none());

        let composite = Query::new()
            .where_eq("recipientEmail", "a@b.c")
            .order_by("createdAt", Direction::Desc);
        let index = composite
            .required_index("notifications")
            .expect("valid")
            .expect("index required");
        assert_eq!(index.fields_spec(), "recipientEmail:asc,createdAt:desc");
    }
}
