//! Shared application error type and its wire format.
//!
//! Every error response has the shape `{"error": <message>}` where the
//! value is a plain string, except validation failures which carry a
//! field-to-messages object instead.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Wire format for all error responses.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message, or a field-to-messages object for
    /// validation failures
    #[schema(value_type = String)]
    pub error: serde_json::Value,
}

impl ErrorResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            error: serde_json::Value::String(message.into()),
        }
    }
}

/// Application error type that converts into HTTP responses.
///
/// Domain crates define their own `thiserror` enums and translate them
/// into this type at the handler boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InternalServerError(String),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, serde_json::Value::String(msg))
            }
            AppError::Unauthorized(msg) => {
                tracing::info!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, serde_json::Value::String(msg))
            }
            AppError::Forbidden(msg) => {
                tracing::info!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, serde_json::Value::String(msg))
            }
            AppError::NotFound(msg) => {
                tracing::info!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, serde_json::Value::String(msg))
            }
            AppError::Conflict(msg) => {
                tracing::info!("Conflict: {}", msg);
                (StatusCode::CONFLICT, serde_json::Value::String(msg))
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::Value::String(msg),
                )
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::info!("JSON extraction error: {:?}", e);
                (e.status(), serde_json::Value::String(e.body_text()))
            }
            AppError::ValidationError(e) => {
                tracing::info!("Validation error: {:?}", e);
                (StatusCode::BAD_REQUEST, validation_errors_to_json(&e))
            }
            AppError::Database(e) => {
                // Raw driver errors never reach the client
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::Value::String("Error interno del servidor".to_string()),
                )
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Flattens validator output into `{field: ["message", ...]}`.
pub fn validation_errors_to_json(errors: &ValidationErrors) -> serde_json::Value {
    let fields = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(message) => serde_json::Value::String(message.to_string()),
                    None => serde_json::Value::String(err.code.to_string()),
                })
                .collect();
            (field.to_string(), serde_json::Value::Array(messages))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 2, message = "too short"))]
        name: String,
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::NotFound("Producto no encontrado".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn db_error_hides_details() {
        let response =
            AppError::Database(DbErr::Custom("connection refused".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_errors_become_field_map() {
        let payload = Payload {
            name: "x".to_string(),
        };
        let errors = payload.validate().unwrap_err();
        let json = validation_errors_to_json(&errors);
        assert_eq!(json["name"][0], "too short");
    }
}
