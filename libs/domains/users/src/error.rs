use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    NotFound(String),

    #[error("El usuario ya existe")]
    AlreadyExists,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::NotFound(_) => AppError::NotFound(message),
            UserError::AlreadyExists => AppError::Conflict(message),
            UserError::Unauthorized(_) => AppError::Unauthorized(message),
            UserError::Validation(_) => AppError::BadRequest(message),
            UserError::Internal(_) => AppError::InternalServerError(message),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
