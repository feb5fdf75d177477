use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnityError {
    #[error("Unidad no encontrada")]
    NotFound,

    #[error("La unidad ya existe")]
    AlreadyExists,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),
}

pub type UnityResult<T> = Result<T, UnityError>;

impl From<UnityError> for AppError {
    fn from(err: UnityError) -> Self {
        let message = err.to_string();
        match err {
            UnityError::NotFound => AppError::NotFound(message),
            UnityError::AlreadyExists => AppError::Conflict(message),
            UnityError::Validation(_) => AppError::BadRequest(message),
            UnityError::Internal(_) => AppError::InternalServerError(message),
        }
    }
}

impl IntoResponse for UnityError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
