//! Storage failure -> client-facing [`DomainError`].
//!
//! Rules are tried in order and the first match wins:
//! 1. duplicate key -> field conflict on the collided unique field
//! 2. schema validation -> validation failure, message verbatim
//! 3. anything else -> internal error, cause kept and logged

use crate::descriptor::ResourceDescriptor;
use crate::error::DomainError;
use crate::store::StoreError;

pub fn translate<D>(descriptor: &D, failure: &StoreError) -> DomainError
where
    D: ResourceDescriptor + ?Sized,
{
    match failure {
        StoreError::DuplicateKey { field, message } => {
            let field = collided_field(descriptor, field.as_deref(), message);
            DomainError::conflict(field, format!("{field} already in use"))
                .caused_by(failure.clone())
        }
        StoreError::Validation(message) => {
            DomainError::validation(message.clone()).caused_by(failure.clone())
        }
        StoreError::Backend(_) => {
            tracing::error!(
                resource = descriptor.name(),
                error = %failure,
                "Unexpected store failure"
            );
            DomainError::internal(failure.clone())
        }
    }
}

/// Pick the unique field a duplicate-key failure refers to.
///
/// Candidates are the declared unique fields in declaration order, then the
/// primary key. A structured `indicated` field wins when it is a candidate;
/// otherwise the first candidate named in `message` wins. With neither, the
/// primary key is the only index left.
pub fn collided_field<D>(descriptor: &D, indicated: Option<&str>, message: &str) -> &'static str
where
    D: ResourceDescriptor + ?Sized,
{
    let pk = descriptor.primary_key();
    let mut candidates = descriptor.unique_fields().iter().copied().chain([pk]);

    if let Some(field) = indicated {
        if let Some(found) = candidates.clone().find(|c| *c == field) {
            return found;
        }
    }

    candidates
        .find(|c| mentions(message, c))
        .unwrap_or(pk)
}

/// Whether `word` occurs in `text` without alphanumeric neighbours.
/// `_` counts as a boundary so index names like `name_1` match.
fn mentions(text: &str, word: &str) -> bool {
    text.match_indices(word).any(|(at, _)| {
        let before = text[..at].chars().next_back();
        let after = text[at + word.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphanumeric())
            && !after.is_some_and(|c| c.is_ascii_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::tests::Widgets;
    use crate::error::DomainErrorKind;
    use axum::http::StatusCode;

    fn duplicate(field: Option<&str>, message: &str) -> StoreError {
        StoreError::DuplicateKey {
            field: field.map(str::to_string),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_indicated_field_wins() {
        assert_eq!(collided_field(&Widgets, Some("email"), "index: name_1"), "email");
    }

    #[test]
    fn test_unknown_indicated_field_falls_back_to_message() {
        assert_eq!(collided_field(&Widgets, Some("_id"), "index: name_1"), "name");
    }

    #[test]
    fn test_message_scan_follows_declaration_order() {
        let message = "E11000 index: email_1 dup key: { email: \"a@b\", name: \"x\" }";
        assert_eq!(collided_field(&Widgets, None, message), "name");
        assert_eq!(collided_field(&Widgets, None, "index: email_1"), "email");
    }

    #[test]
    fn test_message_scan_respects_word_boundaries() {
        assert_eq!(collided_field(&Widgets, None, "index: username_1"), "id");
        assert_eq!(collided_field(&Widgets, None, "index: emails_1"), "id");
    }

    #[test]
    fn test_falls_back_to_primary_key() {
        assert_eq!(collided_field(&Widgets, None, "E11000 duplicate key error"), "id");
    }

    #[test]
    fn test_translate_duplicate_to_conflict() {
        let err = translate(&Widgets, &duplicate(Some("name"), "E11000"));
        assert_eq!(err.kind(), &DomainErrorKind::FieldConflict("name".into()));
        assert_eq!(err.identifier(), "NAME_IN_USE");
        assert_eq!(err.message(), "name already in use");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_translate_validation_keeps_message() {
        let err = translate(&Widgets, &StoreError::Validation("name is required".into()));
        assert_eq!(err.kind(), &DomainErrorKind::ValidationFailed);
        assert_eq!(err.message(), "name is required");
    }

    #[test]
    fn test_translate_backend_is_internal() {
        let failure = StoreError::Backend("connection reset".into());
        let err = translate(&Widgets, &failure);
        assert_eq!(err.kind(), &DomainErrorKind::Internal);
        assert_eq!(err.identifier(), "INTERNAL_ERROR");
        assert_eq!(err.cause(), Some(&failure));
        assert!(!err.message().contains("connection reset"));
    }
}
