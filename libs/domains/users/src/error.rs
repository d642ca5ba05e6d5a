use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use resource_servlet::ServletError;
use thiserror::Error;

use crate::avatar::UploadError;

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Servlet(#[from] ServletError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("multipart field 'avatar' is missing")]
    MissingAvatar,

    #[error("malformed multipart body: {0}")]
    Multipart(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Servlet(e) => e.into(),
            UserError::Upload(UploadError::Io(e)) => AppError::Io(e),
            UserError::Upload(UploadError::Empty)
            | UserError::MissingAvatar
            | UserError::Multipart(_) => AppError::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_statuses() {
        assert_eq!(AppError::from(UserError::MissingAvatar).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(UserError::Upload(UploadError::Empty)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(UserError::Servlet(ServletError::NotFound {
                resource: "users",
                id: "u1".into()
            }))
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(UserError::Upload(UploadError::Io(std::io::Error::other("disk"))))
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
