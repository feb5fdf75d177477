use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShippingError {
    #[error("Dirección no encontrada")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),
}

pub type ShippingResult<T> = Result<T, ShippingError>;

impl From<ShippingError> for AppError {
    fn from(err: ShippingError) -> Self {
        let message = err.to_string();
        match err {
            ShippingError::NotFound => AppError::NotFound(message),
            ShippingError::Validation(_) => AppError::BadRequest(message),
            ShippingError::Internal(_) => AppError::InternalServerError(message),
        }
    }
}

impl IntoResponse for ShippingError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
