use axum::response::{IntoResponse, Response};
use axum::http::StatusCode;
use axum_helpers::{AppError, ErrorCode};
use thiserror::Error;

use crate::store::StoreError;

/// Category of a translated storage failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainErrorKind {
    ValidationFailed,
    /// Unique constraint on the named field
    FieldConflict(String),
    Internal,
}

/// Client-facing failure produced by the translator.
///
/// Only this crate constructs values; failure callbacks may refine the
/// message of one they receive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DomainError {
    kind: DomainErrorKind,
    message: String,
    cause: Option<StoreError>,
}

impl DomainError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: DomainErrorKind::ValidationFailed,
            message: message.into(),
            cause: None,
        }
    }

    pub(crate) fn conflict(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DomainErrorKind::FieldConflict(field.into()),
            message: message.into(),
            cause: None,
        }
    }

    pub(crate) fn internal(cause: StoreError) -> Self {
        Self {
            kind: DomainErrorKind::Internal,
            message: ErrorCode::InternalError.default_message().to_string(),
            cause: Some(cause),
        }
    }

    pub(crate) fn caused_by(mut self, cause: StoreError) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn kind(&self) -> &DomainErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Original storage failure. Never serialized.
    pub fn cause(&self) -> Option<&StoreError> {
        self.cause.as_ref()
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            DomainErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
            DomainErrorKind::FieldConflict(_) => StatusCode::CONFLICT,
            DomainErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable identifier, e.g. `VALIDATION_ERROR` or `EMAIL_IN_USE`.
    pub fn identifier(&self) -> String {
        match &self.kind {
            DomainErrorKind::ValidationFailed => ErrorCode::ValidationError.as_str().to_string(),
            DomainErrorKind::FieldConflict(field) => format!("{}_IN_USE", field.to_uppercase()),
            DomainErrorKind::Internal => ErrorCode::InternalError.as_str().to_string(),
        }
    }

    /// Same kind and cause with a different message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let identifier = err.identifier();
        match err.kind {
            DomainErrorKind::ValidationFailed => AppError::Validation(err.message),
            DomainErrorKind::FieldConflict(field) => AppError::FieldConflict {
                identifier,
                field,
                message: err.message,
            },
            DomainErrorKind::Internal => AppError::InternalServerError(
                err.cause
                    .map(|cause| cause.to_string())
                    .unwrap_or(err.message),
            ),
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Post-failure callback: receives the raw failure and its default
/// translation and returns the error sent to the client.
pub trait OnFailure: Send + Sync {
    fn on_failure(&self, failure: &StoreError, translated: DomainError) -> DomainError;
}

impl<F> OnFailure for F
where
    F: Fn(&StoreError, DomainError) -> DomainError + Send + Sync,
{
    fn on_failure(&self, failure: &StoreError, translated: DomainError) -> DomainError {
        self(failure, translated)
    }
}

/// Errors returned by the generic handlers.
#[derive(Debug, Error)]
pub enum ServletError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("unknown resource: {0}")]
    UnknownResource(String),
}

impl From<ServletError> for AppError {
    fn from(err: ServletError) -> Self {
        match err {
            ServletError::NotFound { .. } => AppError::NotFound(err.to_string()),
            ServletError::Domain(domain) => domain.into(),
            ServletError::UnknownResource(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl IntoResponse for ServletError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
