//! JSON object body extractor for record payloads.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use axum_helpers::AppError;
use serde_json::Value;

use crate::record::Record;

/// Request body parsed as a JSON object.
///
/// An empty body is treated as `{}`. Invalid JSON and non-object bodies are
/// rejected with `INVALID_JSON`. No `Content-Type` check is made.
///
/// ```ignore
/// async fn create_user(RecordPayload(record): RecordPayload) -> impl IntoResponse { .. }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPayload(pub Record);

impl RecordPayload {
    pub fn parse(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Record::new()));
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(record)) => Ok(Self(record)),
            Ok(other) => Err(AppError::InvalidJson(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))),
            Err(e) => Err(AppError::InvalidJson(e.to_string())),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl<S> FromRequest<S> for RecordPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Self::parse(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_empty_body_is_empty_object() {
        assert_eq!(RecordPayload::parse(b"").unwrap().0, Record::new());
        assert_eq!(RecordPayload::parse(b"  \n").unwrap().0, Record::new());
    }

    #[test]
    fn test_object_body() {
        let RecordPayload(record) = RecordPayload::parse(br#"{"name":"n"}"#).unwrap();
        assert_eq!(record["name"], "n");
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = RecordPayload::parse(b"{name:").unwrap_err();
        assert!(matches!(err, AppError::InvalidJson(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_non_object_rejected() {
        let err = RecordPayload::parse(b"[1,2]").unwrap_err();
        assert!(matches!(err, AppError::InvalidJson(ref m) if m.contains("an array")));
    }
}
