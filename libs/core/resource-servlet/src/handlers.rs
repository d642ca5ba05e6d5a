//! Generic resource handlers.
//!
//! Each operation works only through a [`DocumentStore`] and a
//! [`ResourceDescriptor`]. Storage failures go through the translator and
//! then the optional [`OnFailure`] callback; missing records are reported as
//! [`ServletError::NotFound`] directly.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::descriptor::ResourceDescriptor;
use crate::error::{OnFailure, ServletError};
use crate::record::{Record, drop_nulls, ensure_primary_key, strip_undeclared};
use crate::store::{DocumentStore, StoreError};
use crate::translator::translate;

/// Successful handler result, one variant per response status.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 201
    Created(Record),
    /// 200
    Found(Record),
    /// 200
    Updated(Record),
    /// 204, no body
    Removed,
}

impl Outcome {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Created(_) => StatusCode::CREATED,
            Self::Found(_) | Self::Updated(_) => StatusCode::OK,
            Self::Removed => StatusCode::NO_CONTENT,
        }
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Created(r) | Self::Found(r) | Self::Updated(r) => Some(r),
            Self::Removed => None,
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Created(r) | Self::Found(r) | Self::Updated(r) => {
                (status, Json(r)).into_response()
            }
            Self::Removed => status.into_response(),
        }
    }
}

fn fail(
    descriptor: &dyn ResourceDescriptor,
    failure: StoreError,
    on_failure: Option<&dyn OnFailure>,
) -> ServletError {
    let translated = translate(descriptor, &failure);
    let refined = match on_failure {
        Some(callback) => callback.on_failure(&failure, translated),
        None => translated,
    };
    ServletError::Domain(refined)
}

fn not_found(descriptor: &dyn ResourceDescriptor, id: &str) -> ServletError {
    ServletError::NotFound {
        resource: descriptor.name(),
        id: id.to_string(),
    }
}

#[instrument(skip_all, fields(resource = descriptor.name()))]
pub async fn create(
    store: &dyn DocumentStore,
    descriptor: &dyn ResourceDescriptor,
    payload: Record,
    on_failure: Option<&dyn OnFailure>,
) -> Result<Outcome, ServletError> {
    let mut record = drop_nulls(strip_undeclared(descriptor, payload));
    let id = ensure_primary_key(descriptor, &mut record);

    if let Err(message) = descriptor.validate(&record) {
        return Err(fail(descriptor, StoreError::Validation(message), on_failure));
    }

    match store
        .create(descriptor.name(), descriptor.primary_key(), record)
        .await
    {
        Ok(created) => {
            tracing::info!(id = ?id, "Record created");
            Ok(Outcome::Created(created))
        }
        Err(failure) => Err(fail(descriptor, failure, on_failure)),
    }
}

#[instrument(skip(store, descriptor, on_failure), fields(resource = descriptor.name()))]
pub async fn fetch_one(
    store: &dyn DocumentStore,
    descriptor: &dyn ResourceDescriptor,
    id: &str,
    on_failure: Option<&dyn OnFailure>,
) -> Result<Outcome, ServletError> {
    match store
        .find_by_id(descriptor.name(), descriptor.primary_key(), id)
        .await
    {
        Ok(Some(record)) => Ok(Outcome::Found(record)),
        Ok(None) => Err(not_found(descriptor, id)),
        Err(failure) => Err(fail(descriptor, failure, on_failure)),
    }
}

/// Overwrite the record under `id`; fields missing from `payload` end up absent.
#[instrument(skip(store, descriptor, payload, on_failure), fields(resource = descriptor.name()))]
pub async fn replace(
    store: &dyn DocumentStore,
    descriptor: &dyn ResourceDescriptor,
    id: &str,
    payload: Record,
    on_failure: Option<&dyn OnFailure>,
) -> Result<Outcome, ServletError> {
    let pk = descriptor.primary_key();
    let mut record = drop_nulls(strip_undeclared(descriptor, payload));

    match record.get(pk) {
        None => {
            record.insert(pk.to_string(), id.into());
        }
        Some(given) if given.as_str() != Some(id) => {
            let message = format!("{pk} cannot be changed");
            return Err(fail(descriptor, StoreError::Validation(message), on_failure));
        }
        Some(_) => {}
    }

    if let Err(message) = descriptor.validate(&record) {
        return Err(fail(descriptor, StoreError::Validation(message), on_failure));
    }

    match store.replace(descriptor.name(), pk, id, record).await {
        Ok(Some(replaced)) => Ok(Outcome::Updated(replaced)),
        Ok(None) => Err(not_found(descriptor, id)),
        Err(failure) => Err(fail(descriptor, failure, on_failure)),
    }
}

/// Merge `patch` into the record under `id`; omitted fields are kept and
/// fields set to null are removed.
#[instrument(skip(store, descriptor, patch, on_failure), fields(resource = descriptor.name()))]
pub async fn partial_update(
    store: &dyn DocumentStore,
    descriptor: &dyn ResourceDescriptor,
    id: &str,
    patch: Record,
    on_failure: Option<&dyn OnFailure>,
) -> Result<Outcome, ServletError> {
    let patch = strip_undeclared(descriptor, patch);

    if let Err(message) = descriptor.validate_patch(id, &patch) {
        return Err(fail(descriptor, StoreError::Validation(message), on_failure));
    }

    match store
        .merge(descriptor.name(), descriptor.primary_key(), id, patch)
        .await
    {
        Ok(Some(merged)) => Ok(Outcome::Updated(merged)),
        Ok(None) => Err(not_found(descriptor, id)),
        Err(failure) => Err(fail(descriptor, failure, on_failure)),
    }
}

#[instrument(skip(store, descriptor, on_failure), fields(resource = descriptor.name()))]
pub async fn delete(
    store: &dyn DocumentStore,
    descriptor: &dyn ResourceDescriptor,
    id: &str,
    on_failure: Option<&dyn OnFailure>,
) -> Result<Outcome, ServletError> {
    match store
        .delete(descriptor.name(), descriptor.primary_key(), id)
        .await
    {
        Ok(true) => {
            tracing::info!("Record removed");
            Ok(Outcome::Removed)
        }
        Ok(false) => Err(not_found(descriptor, id)),
        Err(failure) => Err(fail(descriptor, failure, on_failure)),
    }
}
