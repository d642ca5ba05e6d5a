use resource_servlet::{DomainError, DomainErrorKind, StoreError};

const LOG_TARGET: &str = "rest-users";

/// Failure callback for every user write.
///
/// Gives unique-field conflicts their user-facing wording and logs the
/// outcome under the `rest-users` target.
pub fn user_failure(failure: &StoreError, translated: DomainError) -> DomainError {
    let message = match translated.kind() {
        DomainErrorKind::FieldConflict(field) if field == "name" => Some("Username already in use"),
        DomainErrorKind::FieldConflict(field) if field == "email" => Some("Email already in use"),
        _ => None,
    };

    let refined = match message {
        Some(message) => translated.with_message(message),
        None => translated,
    };

    match refined.kind() {
        DomainErrorKind::Internal => tracing::error!(
            target: LOG_TARGET,
            error = %refined.identifier(),
            cause = %failure,
            "User write failed"
        ),
        _ => tracing::warn!(
            target: LOG_TARGET,
            error = %refined.identifier(),
            "{}",
            refined.message()
        ),
    }

    refined
}
