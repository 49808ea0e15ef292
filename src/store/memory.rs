use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{sort_documents, ContentStore, Document, OrderBy, StoreError};

/// In-process document store for `STORE_BACKEND=memory` and tests.
///
/// Can be switched offline to exercise the degraded paths, and counts every
/// write so callers can assert that nothing was persisted.
#[derive(Debug)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    online: AtomicBool,
    writes: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
            writes: AtomicUsize::new(0),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of successful write operations (set, add, delete, batch).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.check_online()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn set(&self, collection: &str, id: &str, value: Value) -> Result<(), StoreError> {
        self.check_online()?;
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), value);
        self.record_write();
        Ok(())
    }

    async fn list(
        &self,
        collection: &str,
        order: Option<&OrderBy>,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_online()?;
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        if let Some(order) = order {
            sort_documents(&mut docs, order);
        }
        Ok(docs)
    }

    async fn add_document(&self, collection: &str, value: Value) -> Result<String, StoreError> {
        self.check_online()?;
        let id = Uuid::new_v4().to_string();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), value);
        self.record_write();
        Ok(id)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check_online()?;
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        self.record_write();
        Ok(())
    }

    async fn batch_write(
        &self,
        collection: &str,
        values: Vec<Value>,
    ) -> Result<Vec<String>, StoreError> {
        self.check_online()?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        let ids: Vec<String> = values
            .into_iter()
            .map(|value| {
                let id = Uuid::new_v4().to_string();
                docs.insert(id.clone(), value);
                id
            })
            .collect();
        self.record_write();
        Ok(ids)
    }

    async fn ping(&self) -> Result<Duration, StoreError> {
        let start = Instant::now();
        self.check_online()?;
        Ok(start.elapsed())
    }
}
