//! In-memory implementation of DocumentStore
//!
//! Mirrors the unique-index semantics of the MongoDB store, including the
//! shape of duplicate-key messages. Used for tests and `DOCUMENT_STORE=memory`.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::instrument;

use super::{DocumentStore, StoreError, UniqueIndex};
use crate::record::Record;

#[derive(Default)]
struct Collection {
    /// Records keyed by primary-key value
    records: HashMap<String, Record>,
    indexes: Vec<UniqueIndex>,
}

impl Collection {
    /// First unique index `candidate` collides on, ignoring the record `own_id`.
    fn collision(
        &self,
        name: &str,
        candidate: &Record,
        own_id: Option<&str>,
    ) -> Option<StoreError> {
        for index in &self.indexes {
            // Sparse indexes skip absent fields only; a stored null is indexed
            let value = match candidate.get(&index.field) {
                None if index.sparse => continue,
                None => &Value::Null,
                Some(v) => v,
            };

            let taken = self.records.iter().any(|(id, other)| {
                let stored = match other.get(&index.field) {
                    None if index.sparse => return false,
                    stored => stored.unwrap_or(&Value::Null),
                };
                Some(id.as_str()) != own_id && stored == value
            });

            if taken {
                return Some(duplicate(name, &index.field, value));
            }
        }
        None
    }
}

fn duplicate(collection: &str, field: &str, value: &Value) -> StoreError {
    StoreError::DuplicateKey {
        field: Some(field.to_string()),
        message: format!(
            "E11000 duplicate key error collection: memory.{collection} index: {field}_1 dup key: {{ {field}: {value} }}"
        ),
    }
}

/// Process-local document store guarded by a single `RwLock`.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in `collection`
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, |c| c.records.len())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    #[instrument(skip(self, record))]
    async fn create(
        &self,
        collection: &str,
        primary_key: &str,
        record: Record,
    ) -> Result<Record, StoreError> {
        let id = record
            .get(primary_key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::Backend(format!("record has no string {primary_key}")))?;

        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();

        if let Some(err) = target.collision(collection, &record, None) {
            return Err(err);
        }
        // Collections without registered indexes still keep the key unique
        if target.records.contains_key(&id) {
            return Err(duplicate(collection, primary_key, &Value::String(id)));
        }

        target.records.insert(id, record.clone());
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn find_by_id(
        &self,
        collection: &str,
        _primary_key: &str,
        id: &str,
    ) -> Result<Option<Record>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|c| c.records.get(id))
            .cloned())
    }

    #[instrument(skip(self, record))]
    async fn replace(
        &self,
        collection: &str,
        _primary_key: &str,
        id: &str,
        record: Record,
    ) -> Result<Option<Record>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(target) = collections.get_mut(collection) else {
            return Ok(None);
        };
        if !target.records.contains_key(id) {
            return Ok(None);
        }

        if let Some(err) = target.collision(collection, &record, Some(id)) {
            return Err(err);
        }

        target.records.insert(id.to_string(), record.clone());
        Ok(Some(record))
    }

    #[instrument(skip(self, patch))]
    async fn merge(
        &self,
        collection: &str,
        _primary_key: &str,
        id: &str,
        patch: Record,
    ) -> Result<Option<Record>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(target) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(existing) = target.records.get(id) else {
            return Ok(None);
        };

        let mut merged = existing.clone();
        for (field, value) in patch {
            if value.is_null() {
                merged.remove(&field);
            } else {
                merged.insert(field, value);
            }
        }

        if let Some(err) = target.collision(collection, &merged, Some(id)) {
            return Err(err);
        }

        target.records.insert(id.to_string(), merged.clone());
        Ok(Some(merged))
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        collection: &str,
        _primary_key: &str,
        id: &str,
    ) -> Result<bool, StoreError> {
        Ok(self
            .collections
            .write()
            .await
            .get_mut(collection)
            .is_some_and(|c| c.records.remove(id).is_some()))
    }

    async fn ensure_indexes(
        &self,
        collection: &str,
        indexes: Vec<UniqueIndex>,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default().indexes = indexes;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
