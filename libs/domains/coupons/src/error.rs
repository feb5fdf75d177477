use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CouponError {
    #[error("{0}")]
    NotFound(String),

    #[error("El cupón ya existe")]
    AlreadyExists,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),
}

pub type CouponResult<T> = Result<T, CouponError>;

impl From<CouponError> for AppError {
    fn from(err: CouponError) -> Self {
        let message = err.to_string();
        match err {
            CouponError::NotFound(_) => AppError::NotFound(message),
            CouponError::AlreadyExists => AppError::Conflict(message),
            CouponError::Validation(_) => AppError::BadRequest(message),
            CouponError::Internal(_) => AppError::InternalServerError(message),
        }
    }
}

impl IntoResponse for CouponError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
