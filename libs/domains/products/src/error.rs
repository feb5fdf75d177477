use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    /// Message varies: product vs image lookups report differently
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        let message = err.to_string();
        match err {
            ProductError::NotFound(_) => AppError::NotFound(message),
            ProductError::AlreadyExists(_) => AppError::Conflict(message),
            ProductError::Validation(_) => AppError::BadRequest(message),
            ProductError::Internal(_) => AppError::InternalServerError(message),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
