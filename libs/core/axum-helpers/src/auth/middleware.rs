use super::cookies::ACCESS_TOKEN_COOKIE;
use super::jwt::{JwtAuth, JwtClaims};
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Extract JWT from Authorization header or the access_token cookie
fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(|s| s.to_string()))
        .or_else(|| {
            headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == ACCESS_TOKEN_COOKIE).then(|| value.to_string())
                    })
                })
        })
}

/// JWT authentication middleware.
///
/// Validates the token from the Authorization header or the
/// `access_token` cookie and inserts [`JwtClaims`] into request
/// extensions on success.
///
/// # Example
///
/// ```ignore
/// use axum_helpers::{jwt_auth_middleware, JwtAuth};
///
/// let protected = Router::new()
///     .route("/categories", post(create_category))
///     .layer(axum::middleware::from_fn_with_state(
///         jwt_auth.clone(),
///         jwt_auth_middleware,
///     ));
/// ```
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token_from_request(&headers).ok_or_else(|| {
        tracing::debug!("No JWT found in Authorization header or cookie");
        AppError::Unauthorized("No autenticado".to_string())
    })?;

    let claims = auth.verify_token(&token).map_err(|e| {
        tracing::debug!("JWT verification failed: {}", e);
        AppError::Unauthorized("Token inválido o expirado".to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Requires an authenticated admin. Layer after [`jwt_auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let claims = request
        .extensions()
        .get::<JwtClaims>()
        .ok_or_else(|| AppError::Unauthorized("No autenticado".to_string()))?;

    if !claims.is_admin() {
        return Err(AppError::Forbidden("No autorizado".to_string()));
    }

    Ok(next.run(request).await)
}

/// Requires a moderator or admin. Layer after [`jwt_auth_middleware`].
pub async fn require_mod(request: Request, next: Next) -> Result<Response, AppError> {
    let claims = request
        .extensions()
        .get::<JwtClaims>()
        .ok_or_else(|| AppError::Unauthorized("No autenticado".to_string()))?;

    if !claims.is_mod() {
        return Err(AppError::Forbidden("No autorizado".to_string()));
    }

    Ok(next.run(request).await)
}
