use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Categoría no encontrada")]
    NotFound,

    #[error("La categoría ya existe")]
    AlreadyExists,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),
}

pub type CategoryResult<T> = Result<T, CategoryError>;

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        let message = err.to_string();
        match err {
            CategoryError::NotFound => AppError::NotFound(message),
            CategoryError::AlreadyExists => AppError::Conflict(message),
            CategoryError::Validation(_) => AppError::BadRequest(message),
            CategoryError::Internal(_) => AppError::InternalServerError(message),
        }
    }
}

impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
