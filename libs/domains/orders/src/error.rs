use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    /// Message varies: missing order vs empty listing
    #[error("{0}")]
    NotFound(String),

    #[error("La orden ya existe")]
    AlreadyExists,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::NotFound(_) => AppError::NotFound(message),
            OrderError::AlreadyExists => AppError::Conflict(message),
            OrderError::Validation(_) => AppError::BadRequest(message),
            OrderError::Internal(_) => AppError::InternalServerError(message),
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
