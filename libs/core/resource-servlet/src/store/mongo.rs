//! MongoDB implementation of DocumentStore
//!
//! Records keep their primary key as a regular field with its own unique
//! index; `_id` is left to the server and stripped on the way out. This is the
//! only module that inspects driver error codes and messages.

use async_trait::async_trait;
use database::mongodb::{MongoConfig, MongoError, connect_from_config_with_retry};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Bson, Document, doc},
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::instrument;

use super::{DocumentStore, StoreError, UniqueIndex};
use crate::record::Record;

const DUPLICATE_KEY: i32 = 11000;
const DOCUMENT_VALIDATION_FAILURE: i32 = 121;

/// `index: email_1 dup key` -> `email`
static INDEX_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"index:\s+([A-Za-z0-9_.]+?)_-?1\b").expect("static regex is valid")
});

pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let store = MongoDocumentStore::new(client.database("alpha"));
    /// ```
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Connect with retry and use `config.database`.
    pub async fn connect(config: &MongoConfig) -> Result<Self, MongoError> {
        let client = connect_from_config_with_retry(config, None).await?;
        Ok(Self::new(client.database(config.database())))
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

fn by_id(primary_key: &str, id: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(primary_key, id);
    filter
}

fn to_document(record: &Record) -> Result<Document, StoreError> {
    bson::to_document(record).map_err(|e| StoreError::Backend(e.to_string()))
}

fn into_record(mut document: Document) -> Record {
    document.remove("_id");
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// Map a driver error onto the store taxonomy.
fn classify(error: mongodb::error::Error) -> StoreError {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) => {
            classify_code(write.code, &write.message, write.details.as_ref())
        }
        ErrorKind::Command(command) => classify_code(command.code, &command.message, None),
        _ => StoreError::Backend(error.to_string()),
    }
}

fn classify_code(code: i32, message: &str, details: Option<&Document>) -> StoreError {
    match code {
        DUPLICATE_KEY => StoreError::DuplicateKey {
            field: details
                .and_then(key_pattern_field)
                .or_else(|| index_field(message)),
            message: message.to_string(),
        },
        DOCUMENT_VALIDATION_FAILURE => StoreError::Validation(message.to_string()),
        _ => StoreError::Backend(message.to_string()),
    }
}

fn key_pattern_field(details: &Document) -> Option<String> {
    details
        .get_document("keyPattern")
        .ok()
        .and_then(|pattern| pattern.keys().next().cloned())
}

fn index_field(message: &str) -> Option<String> {
    INDEX_FIELD
        .captures(message)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// `$set` for present values, `$unset` for nulls. `None` for an empty patch,
/// since the server rejects an update without operators.
fn merge_update(patch: Record) -> Result<Option<Document>, StoreError> {
    let (unset, set): (Record, Record) = patch.into_iter().partition(|(_, value)| value.is_null());

    let mut update = Document::new();
    if !set.is_empty() {
        update.insert("$set", to_document(&set)?);
    }
    if !unset.is_empty() {
        let fields: Document = unset
            .into_iter()
            .map(|(field, _)| (field, Bson::String(String::new())))
            .collect();
        update.insert("$unset", fields);
    }
    Ok((!update.is_empty()).then_some(update))
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    #[instrument(skip(self, record))]
    async fn create(
        &self,
        collection: &str,
        primary_key: &str,
        record: Record,
    ) -> Result<Record, StoreError> {
        let document = to_document(&record)?;
        self.collection(collection)
            .insert_one(document)
            .await
            .map_err(classify)?;

        tracing::info!(id = ?record.get(primary_key), "Record inserted");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn find_by_id(
        &self,
        collection: &str,
        primary_key: &str,
        id: &str,
    ) -> Result<Option<Record>, StoreError> {
        let found = self
            .collection(collection)
            .find_one(by_id(primary_key, id))
            .await
            .map_err(classify)?;
        Ok(found.map(into_record))
    }

    #[instrument(skip(self, record))]
    async fn replace(
        &self,
        collection: &str,
        primary_key: &str,
        id: &str,
        record: Record,
    ) -> Result<Option<Record>, StoreError> {
        let replacement = to_document(&record)?;
        let replaced = self
            .collection(collection)
            .find_one_and_replace(by_id(primary_key, id), replacement)
            .return_document(ReturnDocument::After)
            .await
            .map_err(classify)?;
        Ok(replaced.map(into_record))
    }

    #[instrument(skip(self, patch))]
    async fn merge(
        &self,
        collection: &str,
        primary_key: &str,
        id: &str,
        patch: Record,
    ) -> Result<Option<Record>, StoreError> {
        let Some(update) = merge_update(patch)? else {
            return self.find_by_id(collection, primary_key, id).await;
        };

        let merged = self
            .collection(collection)
            .find_one_and_update(by_id(primary_key, id), update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(classify)?;
        Ok(merged.map(into_record))
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        collection: &str,
        primary_key: &str,
        id: &str,
    ) -> Result<bool, StoreError> {
        let result = self
            .collection(collection)
            .delete_one(by_id(primary_key, id))
            .await
            .map_err(classify)?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, indexes))]
    async fn ensure_indexes(
        &self,
        collection: &str,
        indexes: Vec<UniqueIndex>,
    ) -> Result<(), StoreError> {
        let target = self.collection(collection);
        for index in indexes {
            let mut keys = Document::new();
            keys.insert(index.field.as_str(), 1);

            let options = IndexOptions::builder()
                .name(format!("{}_1", index.field))
                .unique(true)
                .sparse(index.sparse)
                .build();

            target
                .create_index(IndexModel::builder().keys(keys).options(options).build())
                .await
                .map_err(classify)?;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(classify)
    }
}
