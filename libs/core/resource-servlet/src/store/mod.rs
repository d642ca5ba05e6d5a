//! Document store abstraction.
//!
//! Handlers only see [`DocumentStore`]; failures come back as raw
//! [`StoreError`]s and are translated into domain errors by the translator.

mod memory;
mod mongo;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::Record;

pub use memory::InMemoryDocumentStore;
pub use mongo::MongoDocumentStore;

/// Raw storage failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A unique index rejected the write. `field` is set when the backend
    /// reported which key collided.
    #[error("duplicate key: {message}")]
    DuplicateKey {
        field: Option<String>,
        message: String,
    },

    /// The record was rejected by schema validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Anything else: connectivity, timeouts, serialization.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// A unique index over one field. Sparse indexes ignore records missing the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIndex {
    pub field: String,
    pub sparse: bool,
}

/// Persistence for schemaless records, addressed by collection and a
/// string primary key stored as a regular field.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new record; unique collisions fail with `DuplicateKey`.
    async fn create(
        &self,
        collection: &str,
        primary_key: &str,
        record: Record,
    ) -> Result<Record, StoreError>;

    async fn find_by_id(
        &self,
        collection: &str,
        primary_key: &str,
        id: &str,
    ) -> Result<Option<Record>, StoreError>;

    /// Overwrite the whole record. `Ok(None)` when no record has `id`.
    async fn replace(
        &self,
        collection: &str,
        primary_key: &str,
        id: &str,
        record: Record,
    ) -> Result<Option<Record>, StoreError>;

    /// Set the patch fields, leaving every other field untouched. A null
    /// patch value removes the field. `Ok(None)` when no record has `id`.
    async fn merge(
        &self,
        collection: &str,
        primary_key: &str,
        id: &str,
        patch: Record,
    ) -> Result<Option<Record>, StoreError>;

    /// `Ok(false)` when no record has `id`.
    async fn delete(&self, collection: &str, primary_key: &str, id: &str)
    -> Result<bool, StoreError>;

    async fn ensure_indexes(
        &self,
        collection: &str,
        indexes: Vec<UniqueIndex>,
    ) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
