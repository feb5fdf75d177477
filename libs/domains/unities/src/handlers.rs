use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use axum_helpers::{jwt_auth_middleware, require_mod, JwtAuth, UuidPath, ValidatedJson};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UnityResult;
use crate::models::{CreateUnity, Unity, UpdateUnity};
use crate::repository::UnityRepository;
use crate::service::UnityService;

const TAG: &str = "unities";

/// OpenAPI documentation for the Unities API
#[derive(OpenApi)]
#[openapi(
    paths(list_unities, get_unity, create_unity, update_unity, delete_unity),
    components(schemas(Unity, CreateUnity, UpdateUnity)),
    tags(
        (name = TAG, description = "Unit of measure endpoints")
    )
)]
pub struct ApiDoc;

/// Unity router: public lookups plus moderated mutations.
pub fn router<R: UnityRepository + 'static>(service: UnityService<R>, jwt_auth: JwtAuth) -> Router {
    let public = Router::new()
        .route("/", get(list_unities))
        .route("/{id}", get(get_unity));

    let protected = Router::new()
        .route("/", post(create_unity))
        .route("/{id}", patch(update_unity).delete(delete_unity))
        .route_layer(middleware::from_fn(require_mod))
        .route_layer(middleware::from_fn_with_state(
            jwt_auth,
            jwt_auth_middleware,
        ));

    public.merge(protected).with_state(Arc::new(service))
}

/// List all unities
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "List of unities", body = Vec<Unity>)
    )
)]
async fn list_unities<R: UnityRepository>(
    State(service): State<Arc<UnityService<R>>>,
) -> UnityResult<Json<Vec<Unity>>> {
    let unities = service.list_unities().await?;
    Ok(Json(unities))
}

/// Get a unity by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Unity ID")),
    responses(
        (status = 200, description = "Unity found", body = Unity),
        (status = 404, description = "Unity not found")
    )
)]
async fn get_unity<R: UnityRepository>(
    State(service): State<Arc<UnityService<R>>>,
    UuidPath(id): UuidPath,
) -> UnityResult<Json<Unity>> {
    let unity = service.get_unity(id).await?;
    Ok(Json(unity))
}

/// Create a unity
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateUnity,
    responses(
        (status = 201, description = "Unity created"),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Unity already exists")
    )
)]
async fn create_unity<R: UnityRepository>(
    State(service): State<Arc<UnityService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUnity>,
) -> UnityResult<impl IntoResponse> {
    let unity = service.create_unity(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "unity": unity,
            "message": "Unidad creada correctamente",
        })),
    ))
}

/// Update a unity
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Unity ID")),
    request_body = UpdateUnity,
    responses(
        (status = 200, description = "Unity updated"),
        (status = 404, description = "Unity not found")
    )
)]
async fn update_unity<R: UnityRepository>(
    State(service): State<Arc<UnityService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateUnity>,
) -> UnityResult<Json<serde_json::Value>> {
    let unity = service.update_unity(id, input).await?;

    Ok(Json(json!({
        "unity": unity,
        "message": "Unidad actualizada correctamente",
    })))
}

/// Delete a unity
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Unity ID")),
    responses(
        (status = 200, description = "Unity deleted"),
        (status = 404, description = "Unity not found")
    )
)]
async fn delete_unity<R: UnityRepository>(
    State(service): State<Arc<UnityService<R>>>,
    UuidPath(id): UuidPath,
) -> UnityResult<Json<serde_json::Value>> {
    let unity = service.delete_unity(id).await?;

    Ok(Json(json!({
        "unity": unity,
        "message": "Unidad eliminada exitosamente",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUnityRepository;
    use axum::body::Body;
    use axum::http::Request;
    use axum_helpers::JwtConfig;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn jwt_auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-that-is-long-enough-123"))
    }

    fn mod_token(auth: &JwtAuth) -> String {
        auth.create_access_token(
            &uuid::Uuid::now_v7().to_string(),
            "mod@example.com",
            "Mod",
            &["mod".to_string()],
        )
        .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn list_is_public() {
        let app = router(UnityService::new(InMemoryUnityRepository::new()), jwt_auth());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_requires_auth() {
        let app = router(UnityService::new(InMemoryUnityRepository::new()), jwt_auth());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Kilogramo"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_with_mod_token() {
        let auth = jwt_auth();
        let token = mod_token(&auth);
        let app = router(UnityService::new(InMemoryUnityRepository::new()), auth);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::from(r#"{"name":"Kilogramo"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["unity"]["name"], "Kilogramo");
        assert_eq!(body["message"], "Unidad creada correctamente");
    }

    #[tokio::test]
    async fn duplicate_name_is_conflict() {
        let auth = jwt_auth();
        let token = mod_token(&auth);
        let app = router(UnityService::new(InMemoryUnityRepository::new()), auth);

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/")
                        .header("content-type", "application/json")
                        .header("authorization", format!("Bearer {token}"))
                        .body(Body::from(r#"{"name":"Docena"}"#))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), expected);
        }
    }
}
