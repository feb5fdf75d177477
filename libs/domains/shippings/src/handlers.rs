use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch},
    Extension, Json, Router,
};
use axum_helpers::{jwt_auth_middleware, JwtAuth, JwtClaims, UuidPath, ValidatedJson};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::{ShippingError, ShippingResult};
use crate::models::{CreateShippingAddress, ShippingAddress, UpdateShippingAddress};
use crate::repository::ShippingRepository;
use crate::service::ShippingService;

const TAG: &str = "shippings";

/// OpenAPI documentation for the Shippings API
#[derive(OpenApi)]
#[openapi(
    paths(list_addresses, create_address, update_address, delete_address),
    components(schemas(ShippingAddress, CreateShippingAddress, UpdateShippingAddress)),
    tags(
        (name = TAG, description = "Shipping address endpoints")
    )
)]
pub struct ApiDoc;

/// Shipping router. Everything needs a session and is scoped to the
/// authenticated user.
pub fn router<R: ShippingRepository + 'static>(
    service: ShippingService<R>,
    jwt_auth: JwtAuth,
) -> Router {
    Router::new()
        .route("/", get(list_addresses).post(create_address))
        .route("/{id}", patch(update_address).delete(delete_address))
        .route_layer(middleware::from_fn_with_state(
            jwt_auth,
            jwt_auth_middleware,
        ))
        .with_state(Arc::new(service))
}

fn owner_id(claims: &JwtClaims) -> ShippingResult<Uuid> {
    claims
        .sub
        .parse()
        .map_err(|_| ShippingError::Validation("Usuario inválido".to_string()))
}

/// List the authenticated user's addresses
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "Addresses of the current user", body = Vec<ShippingAddress>)
    )
)]
async fn list_addresses<R: ShippingRepository>(
    State(service): State<Arc<ShippingService<R>>>,
    Extension(claims): Extension<JwtClaims>,
) -> ShippingResult<Json<Vec<ShippingAddress>>> {
    let addresses = service.list_addresses(owner_id(&claims)?).await?;
    Ok(Json(addresses))
}

/// Create an address for the authenticated user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateShippingAddress,
    responses(
        (status = 201, description = "Address created"),
        (status = 400, description = "Validation error")
    )
)]
async fn create_address<R: ShippingRepository>(
    State(service): State<Arc<ShippingService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    ValidatedJson(input): ValidatedJson<CreateShippingAddress>,
) -> ShippingResult<impl IntoResponse> {
    let address = service.create_address(owner_id(&claims)?, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "address": address,
            "message": "Dirección creada correctamente",
        })),
    ))
}

/// Update one of the authenticated user's addresses
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Address ID")),
    request_body = UpdateShippingAddress,
    responses(
        (status = 200, description = "Address updated"),
        (status = 404, description = "Address not found")
    )
)]
async fn update_address<R: ShippingRepository>(
    State(service): State<Arc<ShippingService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateShippingAddress>,
) -> ShippingResult<Json<serde_json::Value>> {
    let address = service.update_address(id, owner_id(&claims)?, input).await?;

    Ok(Json(json!({
        "address": address,
        "message": "Dirección actualizada correctamente",
    })))
}

/// Delete one of the authenticated user's addresses
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address deleted"),
        (status = 404, description = "Address not found")
    )
)]
async fn delete_address<R: ShippingRepository>(
    State(service): State<Arc<ShippingService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    UuidPath(id): UuidPath,
) -> ShippingResult<Json<serde_json::Value>> {
    let address = service.delete_address(id, owner_id(&claims)?).await?;

    Ok(Json(json!({
        "address": address,
        "message": "Dirección eliminada exitosamente",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryShippingRepository;
    use axum::body::Body;
    use axum::http::Request;
    use axum_helpers::JwtConfig;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn jwt_auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-that-is-long-enough-123"))
    }

    fn user_token(auth: &JwtAuth, user_id: Uuid) -> String {
        auth.create_access_token(&user_id.to_string(), "maria@example.com", "María", &[])
            .unwrap()
    }

    const ADDRESS_BODY: &str = r#"{
        "alias": "Casa",
        "name": "María",
        "lastName": "Pérez",
        "email": "maria@example.com",
        "phone": "04141234567",
        "address_line_1": "Av. Libertador, Edificio Sol, Piso 3",
        "country": "Venezuela",
        "state": "Miranda",
        "city": "Caracas"
    }"#;

    #[tokio::test]
    async fn everything_requires_auth() {
        let app = router(
            ShippingService::new(InMemoryShippingRepository::new()),
            jwt_auth(),
        );

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_then_list_own_addresses() {
        let auth = jwt_auth();
        let user_id = Uuid::now_v7();
        let token = user_token(&auth, user_id);
        let app = router(ShippingService::new(InMemoryShippingRepository::new()), auth);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::from(ADDRESS_BODY))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Dirección creada correctamente");
        assert_eq!(body["address"]["state"], "Miranda");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let listed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn foreign_state_is_rejected() {
        let auth = jwt_auth();
        let token = user_token(&auth, Uuid::now_v7());
        let app = router(ShippingService::new(InMemoryShippingRepository::new()), auth);

        let body = ADDRESS_BODY.replace("Miranda", "Texas");
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
