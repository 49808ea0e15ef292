/*!
 * Content Store
 * Document-store abstraction: whole documents addressed by (collection, id)
 */
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

pub const PAGES: &str = "pages";
pub const SETTINGS: &str = "settings";
pub const PROJECTS: &str = "projects";
pub const VISUAL_PRODUCTIONS: &str = "visual_productions";

/// A stored document. `data` never contains the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("document encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_) => StoreError::Unavailable(err.to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Whole-document reads and writes. There is no partial update and no
/// version check: a `set` replaces the stored value and the last write wins.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// A missing document is `Ok(None)`.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn set(&self, collection: &str, id: &str, value: Value) -> Result<(), StoreError>;

    async fn list(
        &self,
        collection: &str,
        order: Option<&OrderBy>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Inserts with a store-assigned id.
    async fn add_document(&self, collection: &str, value: Value) -> Result<String, StoreError>;

    /// Deleting a missing id is not an error.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Inserts every value or none of them.
    async fn batch_write(
        &self,
        collection: &str,
        values: Vec<Value>,
    ) -> Result<Vec<String>, StoreError>;

    async fn ping(&self) -> Result<Duration, StoreError>;
}

pub type SharedStore = Arc<dyn ContentStore>;

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

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Sorts in place by a top-level field. Documents without the field go last
/// in either direction; ties keep id order.
pub(crate) fn sort_documents(docs: &mut [Document], order: &OrderBy) {
    docs.sort_by(|a, b| {
        let left = a.data.get(&order.field).filter(|v| !v.is_null());
        let right = b.data.get(&order.field).filter(|v| !v.is_null());
        let ordering = match (left, right) {
            (Some(x), Some(y)) => {
                let o = compare_values(x, y);
                if order.descending {
                    o.reverse()
                } else {
                    o
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        Document {
            id: id.to_string(),
            data,
        }
    }

    #[test]
    fn sort_descending_puts_missing_fields_last() {
        let mut docs = vec![
            doc("a", json!({ "createdAt": "2024-01-01T00:00:00.000Z" })),
            doc("b", json!({})),
            doc("c", json!({ "createdAt": "2024-03-01T00:00:00.000Z" })),
        ];
        sort_documents(&mut docs, &OrderBy::desc("createdAt"));
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn sort_ascending_compares_numbers_numerically() {
        let mut docs = vec![
            doc("a", json!({ "rank": 10 })),
            doc("b", json!({ "rank": 2 })),
            doc("c", json!({ "rank": null })),
        ];
        sort_documents(&mut docs, &OrderBy::asc("rank"));
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn pool_timeouts_map_to_unavailable() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StoreError::Unavailable(_)));
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
