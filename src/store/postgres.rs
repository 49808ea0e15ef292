use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::{ContentStore, Document, OrderBy, StoreError};
use crate::db::models::DocumentRow;

/// Documents kept as JSONB rows in the `documents` table.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: Arc<PgPool>,
}

impl PgDocumentStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            data: row.data,
        }
    }
}

#[async_trait]
impl ContentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT collection, id, data, created_at, updated_at FROM documents \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Document::from))
    }

    async fn set(&self, collection: &str, id: &str, value: Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            VALUES ($1, $2, $3, now(), now())
            ON CONFLICT (collection, id) DO UPDATE SET
                data = EXCLUDED.data,
                updated_at = now()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&value)
        .execute(self.pool.as_ref())
        .await?;

        tracing::debug!(collection = %collection, id = %id, "document written");
        Ok(())
    }

    async fn list(
        &self,
        collection: &str,
        order: Option<&OrderBy>,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = match order {
            Some(order) => {
                // Direction cannot be bound as a parameter; it only ever comes from the enum flag.
                let direction = if order.descending { "DESC" } else { "ASC" };
                let sql = format!(
                    "SELECT collection, id, data, created_at, updated_at FROM documents \
                     WHERE collection = $1 \
                     ORDER BY data->>$2 {} NULLS LAST, id",
                    direction
                );
                sqlx::query_as::<_, DocumentRow>(&sql)
                    .bind(collection)
                    .bind(&order.field)
                    .fetch_all(self.pool.as_ref())
                    .await?
            }
            None => {
                sqlx::query_as::<_, DocumentRow>(
                    "SELECT collection, id, data, created_at, updated_at FROM documents \
                     WHERE collection = $1 ORDER BY created_at, id",
                )
                .bind(collection)
                .fetch_all(self.pool.as_ref())
                .await?
            }
        };

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn add_document(&self, collection: &str, value: Value) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO documents (collection, id, data, created_at, updated_at) \
             VALUES ($1, $2, $3, now(), now())",
        )
        .bind(collection)
        .bind(&id)
        .bind(&value)
        .execute(self.pool.as_ref())
        .await?;

        Ok(id)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(collection = %collection, id = %id, "delete matched no document");
        }
        Ok(())
    }

    async fn batch_write(
        &self,
        collection: &str,
        values: Vec<Value>,
    ) -> Result<Vec<String>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(values.len());

        for value in &values {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO documents (collection, id, data, created_at, updated_at) \
                 VALUES ($1, $2, $3, now(), now())",
            )
            .bind(collection)
            .bind(&id)
            .bind(value)
            .execute(&mut *tx)
            .await?;
            ids.push(id);
        }

        tx.commit().await?;
        tracing::info!(collection = %collection, count = ids.len(), "batch write committed");
        Ok(ids)
    }

    async fn ping(&self) -> Result<Duration, StoreError> {
        let start = Instant::now();
        sqlx::query("SELECT 1").fetch_one(self.pool.as_ref()).await?;
        Ok(start.elapsed())
    }
}
