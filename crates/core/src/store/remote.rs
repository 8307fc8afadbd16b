//! Remote document-store port and its query model.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Result;

/// Comparison applied by a query filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

/// One field predicate of a collection query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq,
            value,
        }
    }

    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gte,
            value,
        }
    }

    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Lte,
            value,
        }
    }
}

/// Result ordering of a collection query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub field: String,
    pub ascending: bool,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }
}

/// Networked collection store with server-assigned identifiers.
///
/// Every operation fails soft (`RemoteUnavailable`, `Timeout`,
/// `RemoteNotFound`); callers treat failures as a trigger for the local
/// fallback, never as fatal. After an `add` the store mirrors the assigned
/// id into the document body under `id`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert a document, returning the server-assigned id.
    async fn add(&self, collection: &str, document: Value) -> Result<String>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
        order: Option<&SortSpec>,
    ) -> Result<Vec<Value>>;

    /// Merge the given fields into an existing document.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<()>;

    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}

/// Evaluate a filter set against a JSON document.
///
/// This is the local-fallback equivalent of the remote query predicate:
/// numbers compare numerically, strings lexicographically. A document
/// missing the filtered field never matches.
pub fn document_matches(document: &Value, filters: &[FieldFilter]) -> bool {
    filters.iter().all(|filter| {
        let Some(actual) = document.get(&filter.field) else {
            return false;
        };
        match filter.op {
            FilterOp::Eq => actual == &filter.value,
            FilterOp::Gte => {
                matches!(compare_values(actual, &filter.value), Some(ord) if ord != Ordering::Less)
            }
            FilterOp::Lte => {
                matches!(compare_values(actual, &filter.value), Some(ord) if ord != Ordering::Greater)
            }
        }
    })
}

/// Order two documents by the sort field; documents missing the field sort
/// first when ascending.
pub fn order_documents(a: &Value, b: &Value, order: &SortSpec) -> Ordering {
    let ord = match (a.get(&order.field), b.get(&order.field)) {
        (Some(a), Some(b)) => compare_values(a, b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    };
    if order.ascending {
        ord
    } else {
        ord.reverse()
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equality_and_range_filters() {
        let doc = json!({ "userId": "u1", "date": "2024-06-02", "time": 120 });

        assert!(document_matches(
            &doc,
            &[FieldFilter::eq("userId", json!("u1"))]
        ));
        assert!(document_matches(
            &doc,
            &[
                FieldFilter::gte("date", json!("2024-06-01")),
                FieldFilter::lte("date", json!("2024-06-30")),
            ]
        ));
        assert!(!document_matches(
            &doc,
            &[FieldFilter::gte("time", json!(500))]
        ));
    }

    #[test]
    fn missing_field_never_matches() {
        let doc = json!({ "userId": "u1" });
        assert!(!document_matches(
            &doc,
            &[FieldFilter::eq("date", json!("2024-06-01"))]
        ));
    }

    #[test]
    fn ordering_by_numeric_field() {
        let mut docs = vec![
            json!({ "time": 300 }),
            json!({ "time": 100 }),
            json!({ "time": 200 }),
        ];
        let order = SortSpec::asc("time");
        docs.sort_by(|a, b| order_documents(a, b, &order));
        let times: Vec<i64> = docs.iter().map(|d| d["time"].as_i64().unwrap()).collect();
        assert_eq!(times, vec![100, 200, 300]);
    }

    #[test]
    fn descending_reverses() {
        let a = json!({ "date": "2024-06-01" });
        let b = json!({ "date": "2024-06-02" });
        let order = SortSpec::desc("date");
        assert_eq!(order_documents(&a, &b, &order), Ordering::Greater);
    }
}
