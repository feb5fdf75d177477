use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use axum_helpers::{jwt_auth_middleware, require_mod, JwtAuth, JwtClaims, UuidPath, ValidatedJson};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CreateCategory, UpdateCategory};
use crate::repository::CategoryRepository;
use crate::service::CategoryService;

const TAG: &str = "categories";

/// OpenAPI documentation for the Categories API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories,
        get_category,
        create_category,
        update_category,
        delete_category,
    ),
    components(schemas(Category, CreateCategory, UpdateCategory)),
    tags(
        (name = TAG, description = "Product category endpoints")
    )
)]
pub struct ApiDoc;

/// Category router: public lookups plus moderated mutations.
pub fn router<R: CategoryRepository + 'static>(
    service: CategoryService<R>,
    jwt_auth: JwtAuth,
) -> Router {
    let public = Router::new()
        .route("/", get(list_categories))
        .route("/{id}", get(get_category));

    let protected = Router::new()
        .route("/", post(create_category))
        .route("/{id}", patch(update_category).delete(delete_category))
        .route_layer(middleware::from_fn(require_mod))
        .route_layer(middleware::from_fn_with_state(
            jwt_auth,
            jwt_auth_middleware,
        ));

    public.merge(protected).with_state(Arc::new(service))
}

/// List all categories
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "List of categories", body = Vec<Category>)
    )
)]
async fn list_categories<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
) -> CategoryResult<Json<Vec<Category>>> {
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}

/// Get an active category by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 404, description = "Category not found")
    )
)]
async fn get_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CategoryResult<Json<Category>> {
    let category = service.get_category(id).await?;
    Ok(Json(category))
}

/// Create a category
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created"),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Category already exists")
    )
)]
async fn create_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> CategoryResult<impl IntoResponse> {
    let user_id = claims
        .sub
        .parse()
        .map_err(|_| CategoryError::Validation("Usuario inválido".to_string()))?;

    let category = service.create_category(user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "category": category,
            "message": "Categoría creada correctamente",
        })),
    ))
}

/// Update a category
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated"),
        (status = 404, description = "Category not found")
    )
)]
async fn update_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> CategoryResult<Json<serde_json::Value>> {
    let category = service.update_category(id, input).await?;

    Ok(Json(json!({
        "category": category,
        "message": "Categoría actualizada exitosamente",
    })))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found")
    )
)]
async fn delete_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CategoryResult<Json<serde_json::Value>> {
    let category = service.delete_category(id).await?;

    Ok(Json(json!({
        "category": category,
        "message": "Categoría eliminada exitosamente",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryCategoryRepository;
    use axum::body::Body;
    use axum::http::Request;
    use axum_helpers::JwtConfig;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn jwt_auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-that-is-long-enough-123"))
    }

    fn admin_token(auth: &JwtAuth) -> String {
        auth.create_access_token(
            &uuid::Uuid::now_v7().to_string(),
            "admin@example.com",
            "Admin",
            &["admin".to_string()],
        )
        .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn list_is_public() {
        let app = router(
            CategoryService::new(InMemoryCategoryRepository::new()),
            jwt_auth(),
        );

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_requires_auth() {
        let app = router(
            CategoryService::new(InMemoryCategoryRepository::new()),
            jwt_auth(),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Sillas"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_with_admin_token() {
        let auth = jwt_auth();
        let token = admin_token(&auth);
        let app = router(CategoryService::new(InMemoryCategoryRepository::new()), auth);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::from(r#"{"name":"Sillas"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["category"]["name"], "Sillas");
        assert_eq!(body["message"], "Categoría creada correctamente");
    }

    #[tokio::test]
    async fn create_rejects_invalid_payload() {
        let auth = jwt_auth();
        let token = admin_token(&auth);
        let app = router(CategoryService::new(InMemoryCategoryRepository::new()), auth);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::from(r#"{"name":"x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]["name"].is_array());
    }

    #[tokio::test]
    async fn non_mod_is_forbidden() {
        let auth = jwt_auth();
        let token = auth
            .create_access_token(
                &uuid::Uuid::now_v7().to_string(),
                "user@example.com",
                "User",
                &[],
            )
            .unwrap();
        let app = router(CategoryService::new(InMemoryCategoryRepository::new()), auth);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::from(r#"{"name":"Sillas"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
