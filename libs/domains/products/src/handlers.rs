use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use axum_helpers::{
    comma_separated, jwt_auth_middleware, require_mod, JwtAuth, JwtClaims, ListQuery, Pagination,
    UuidPath, ValidatedJson,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::export::XLSX_CONTENT_TYPE;
use crate::models::{
    CartItem, ChangePrices, CreateImages, CreateProduct, MoveProduct, Product, ProductFilters,
    ProductImage, ReorderItem, UpdateProduct, ValidatedCartItem,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

const TAG: &str = "products";

/// OpenAPI documentation for the Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        get_product,
        validate_cart,
        create_product,
        update_products_order,
        move_product,
        change_prices,
        export_products,
        update_product,
        delete_product,
        list_images,
        create_images,
        reorder_images,
        delete_image,
    ),
    components(schemas(
        Product,
        ProductImage,
        CreateProduct,
        UpdateProduct,
        MoveProduct,
        ChangePrices,
        CartItem,
        ValidatedCartItem,
        CartRequest,
        CreateImages,
    )),
    tags(
        (name = TAG, description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// Catalog listing query: pagination plus optional filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub categories_ids: Option<Vec<Uuid>>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub unities_ids: Option<Vec<Uuid>>,
    /// `priceRange=min,max`; ignored unless exactly two values
    #[serde(default, deserialize_with = "comma_separated")]
    pub price_range: Option<Vec<f64>>,
    pub in_stock_only: Option<bool>,
}

impl ProductListQuery {
    fn into_parts(self) -> (ListQuery, ProductFilters) {
        let list = ListQuery {
            page: self.page,
            limit: self.limit,
            search: self.search,
        };

        let price_range = self
            .price_range
            .filter(|range| range.len() == 2)
            .map(|range| (range[0], range[1]));

        let filters = ProductFilters {
            offset: list.offset(),
            limit: list.limit(),
            search: list.search().map(str::to_string),
            categories_ids: self.categories_ids,
            unities_ids: self.unities_ids,
            price_range,
            in_stock_only: self.in_stock_only.unwrap_or(false),
        };

        (list, filters)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
struct CartRequest {
    items: Vec<CartItem>,
}

/// Product router: public catalog reads and cart validation, plus the
/// moderated mutation surface (including image management).
pub fn router<R: ProductRepository + 'static>(
    service: ProductService<R>,
    jwt_auth: JwtAuth,
) -> Router {
    let public = Router::new()
        .route("/", get(list_products))
        .route("/validateCart", post(validate_cart))
        .route("/{id}", get(get_product));

    let protected = Router::new()
        .route("/", post(create_product))
        .route("/order", patch(update_products_order))
        .route("/change-prices", patch(change_prices))
        .route("/export/{format}", get(export_products))
        .route("/{id}/order-manual", patch(move_product))
        .route("/{id}", patch(update_product).delete(delete_product))
        .route("/images/{productId}", get(list_images).post(create_images))
        .route("/images/{productId}/order", patch(reorder_images))
        .route("/images/{productId}/{imageId}", delete(delete_image))
        .route_layer(middleware::from_fn(require_mod))
        .route_layer(middleware::from_fn_with_state(
            jwt_auth,
            jwt_auth_middleware,
        ));

    public.merge(protected).with_state(Arc::new(service))
}

/// List products in display order, filtered and paginated
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ProductListQuery),
    responses(
        (status = 200, description = "Catalog page with pagination metadata")
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<ProductListQuery>,
) -> ProductResult<Json<serde_json::Value>> {
    let (list, filters) = query.into_parts();
    let (objects, total) = service.list_products(filters).await?;

    Ok(Json(json!({
        "objects": objects,
        "pagination": Pagination::new(list.page(), list.limit(), total),
    })))
}

/// Get a product by slug
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found")
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(slug): Path<String>,
) -> ProductResult<Json<Product>> {
    let product = service.get_product_by_slug(&slug).await?;
    Ok(Json(product))
}

/// Validate cart lines against current stock
#[utoipa::path(
    post,
    path = "/validateCart",
    tag = TAG,
    request_body = CartRequest,
    responses(
        (status = 200, description = "Per-item validation results")
    )
)]
async fn validate_cart<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Json(body): Json<CartRequest>,
) -> ProductResult<Json<serde_json::Value>> {
    let items = service.validate_cart(body.items).await?;

    Ok(Json(json!({
        "items": items,
        "message": "Productos del carrito validados",
    })))
}

/// Create a product, appended at the end of the catalog order
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Product already exists")
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let user_id = claims
        .sub
        .parse()
        .map_err(|_| ProductError::Validation("Usuario inválido".to_string()))?;

    let product = service.create_product(user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "product": product,
            "message": "Producto creado correctamente",
        })),
    ))
}

/// Bulk reorder: applies the submitted (id, displayOrder) pairs
#[utoipa::path(
    patch,
    path = "/order",
    tag = TAG,
    responses(
        (status = 200, description = "Order updated"),
        (status = 400, description = "Malformed reorder payload")
    )
)]
async fn update_products_order<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Json(body): Json<serde_json::Value>,
) -> ProductResult<Json<serde_json::Value>> {
    let raw = body
        .get("updatedProducts")
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            ProductError::Validation(
                "El cuerpo de la solicitud debe contener un array llamado \"updatedProducts\""
                    .to_string(),
            )
        })?;

    let items = raw
        .iter()
        .map(|value| {
            let id = value
                .get("id")
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse().ok());
            let display_order = value.get("displayOrder").and_then(|v| v.as_i64());

            match (id, display_order) {
                (Some(id), Some(display_order)) => Ok(ReorderItem {
                    id,
                    display_order: display_order as i32,
                }),
                _ => Err(ProductError::Validation(
                    "Cada producto debe tener un \"id\" (string) y un \"displayOrder\" (number)"
                        .to_string(),
                )),
            }
        })
        .collect::<ProductResult<Vec<_>>>()?;

    service.reorder_products(items).await?;

    Ok(Json(json!({
        "message": "Orden actualizado correctamente",
    })))
}

/// Move one product to a target position, shifting its neighbors
#[utoipa::path(
    patch,
    path = "/{id}/order-manual",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = MoveProduct,
    responses(
        (status = 200, description = "Order updated"),
        (status = 400, description = "Target position out of range"),
        (status = 404, description = "Product not found")
    )
)]
async fn move_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    Json(input): Json<MoveProduct>,
) -> ProductResult<Json<serde_json::Value>> {
    service.move_product(id, input.display_order).await?;

    Ok(Json(json!({
        "message": "Orden actualizado correctamente",
    })))
}

/// Adjust every catalog price by a percentage
#[utoipa::path(
    patch,
    path = "/change-prices",
    tag = TAG,
    request_body = ChangePrices,
    responses(
        (status = 200, description = "Prices updated"),
        (status = 400, description = "Validation error")
    )
)]
async fn change_prices<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedJson(input): ValidatedJson<ChangePrices>,
) -> ProductResult<Json<serde_json::Value>> {
    let count = service.change_prices(input).await?;

    Ok(Json(json!({
        "message": "Precios actualizados correctamente",
        "count": count,
    })))
}

/// Export the catalog; only xlsx is available
#[utoipa::path(
    get,
    path = "/export/{format}",
    tag = TAG,
    params(("format" = String, Path, description = "Export format")),
    responses(
        (status = 200, description = "Spreadsheet file", content_type = XLSX_CONTENT_TYPE),
        (status = 400, description = "Unavailable format")
    )
)]
async fn export_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(format): Path<String>,
) -> ProductResult<impl IntoResponse> {
    let (filename, bytes) = service.export(&format).await?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}.xlsx\""),
            ),
        ],
        bytes,
    ))
}

/// Update a product; a name change regenerates the slug
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated"),
        (status = 404, description = "Product not found")
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<serde_json::Value>> {
    let product = service.update_product(id, input).await?;

    Ok(Json(json!({
        "product": product,
        "message": "Producto actualizado exitosamente",
    })))
}

/// Delete a product; later products close the ordering gap
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found")
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<serde_json::Value>> {
    let product = service.delete_product(id).await?;

    Ok(Json(json!({
        "product": product,
        "message": "Producto eliminado exitosamente",
    })))
}

/// List a product's images in display order
#[utoipa::path(
    get,
    path = "/images/{productId}",
    tag = TAG,
    params(("productId" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Ordered image set"),
        (status = 404, description = "Product not found")
    )
)]
async fn list_images<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(product_id): UuidPath,
) -> ProductResult<Json<serde_json::Value>> {
    let images = service.list_images(product_id).await?;

    Ok(Json(json!({
        "productId": product_id,
        "images": images,
    })))
}

/// Register uploaded images against a product (cap of 5)
#[utoipa::path(
    post,
    path = "/images/{productId}",
    tag = TAG,
    params(("productId" = Uuid, Path, description = "Product ID")),
    request_body = CreateImages,
    responses(
        (status = 201, description = "Images registered"),
        (status = 400, description = "Image cap exceeded"),
        (status = 409, description = "Duplicate image keys")
    )
)]
async fn create_images<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(product_id): UuidPath,
    Json(input): Json<CreateImages>,
) -> ProductResult<impl IntoResponse> {
    let count = input.storage_keys.len();
    let images = service.add_images(product_id, input).await?;

    let message = if count == 1 {
        "Imagen registrada correctamente"
    } else {
        "Imágenes registradas correctamente"
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "productId": product_id,
            "images": images,
            "message": message,
        })),
    ))
}

/// Bulk reorder of a product's images
#[utoipa::path(
    patch,
    path = "/images/{productId}/order",
    tag = TAG,
    params(("productId" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Order updated"),
        (status = 404, description = "Product not found")
    )
)]
async fn reorder_images<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(product_id): UuidPath,
    Json(items): Json<Vec<ReorderItem>>,
) -> ProductResult<Json<serde_json::Value>> {
    let images = service.reorder_images(product_id, items).await?;

    Ok(Json(json!({
        "images": images,
        "message": "Orden actualizado correctamente",
    })))
}

/// Delete one image; the remaining set is compacted and returned
#[utoipa::path(
    delete,
    path = "/images/{productId}/{imageId}",
    tag = TAG,
    params(
        ("productId" = Uuid, Path, description = "Product ID"),
        ("imageId" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image deleted"),
        (status = 404, description = "Image not found")
    )
)]
async fn delete_image<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path((product_id, image_id)): Path<(Uuid, Uuid)>,
) -> ProductResult<Json<serde_json::Value>> {
    let images = service.delete_image(product_id, image_id).await?;

    Ok(Json(json!({
        "images": images,
        "message": "Imagen eliminada correctamente",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryProductRepository;
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

    fn app() -> (Router, String) {
        let auth = jwt_auth();
        let token = admin_token(&auth);
        let router = router(
            ProductService::new(InMemoryProductRepository::new()),
            auth,
        );
        (router, token)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    fn product_body(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "description": "Descripción de prueba",
            "price": 100.0,
            "categoryId": Uuid::now_v7(),
            "unityId": Uuid::now_v7(),
        })
    }

    async fn create(app: &Router, token: &str, name: &str) -> Uuid {
        let response = send(app, "POST", "/", Some(token), Some(product_body(name))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        body["product"]["id"].as_str().unwrap().parse().unwrap()
    }

    async fn catalog(app: &Router) -> Vec<(String, i64)> {
        let response = send(app, "GET", "/", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        body["objects"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| {
                (
                    p["name"].as_str().unwrap().to_string(),
                    p["displayOrder"].as_i64().unwrap(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn manual_move_and_delete_keep_ordering_dense() {
        let (app, token) = app();
        create(&app, &token, "A").await;
        let b = create(&app, &token, "B").await;
        let c = create(&app, &token, "C").await;

        // C goes to the front; A and B shift back
        let response = send(
            &app,
            "PATCH",
            &format!("/{c}/order-manual"),
            Some(&token),
            Some(json!({"displayOrder": 1})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            catalog(&app).await,
            vec![
                ("C".to_string(), 1),
                ("A".to_string(), 2),
                ("B".to_string(), 3),
            ]
        );

        // Deleting B closes the gap
        let response = send(&app, "DELETE", &format!("/{b}"), Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            catalog(&app).await,
            vec![("C".to_string(), 1), ("A".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn bulk_reorder_validates_body_shape() {
        let (app, token) = app();

        let response = send(
            &app,
            "PATCH",
            "/order",
            Some(&token),
            Some(json!({"products": []})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["error"],
            "El cuerpo de la solicitud debe contener un array llamado \"updatedProducts\""
        );

        let response = send(
            &app,
            "PATCH",
            "/order",
            Some(&token),
            Some(json!({"updatedProducts": [{"id": 42, "displayOrder": "1"}]})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["error"],
            "Cada producto debe tener un \"id\" (string) y un \"displayOrder\" (number)"
        );
    }

    #[tokio::test]
    async fn bulk_reorder_applies_permutation() {
        let (app, token) = app();
        let a = create(&app, &token, "A").await;
        let b = create(&app, &token, "B").await;

        let response = send(
            &app,
            "PATCH",
            "/order",
            Some(&token),
            Some(json!({"updatedProducts": [
                {"id": a, "displayOrder": 2},
                {"id": b, "displayOrder": 1},
            ]})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            catalog(&app).await,
            vec![("B".to_string(), 1), ("A".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn cart_validation_is_public() {
        let (app, _) = app();

        let response = send(
            &app,
            "POST",
            "/validateCart",
            None,
            Some(json!({"items": [{"productId": Uuid::now_v7(), "quantity": 2}]})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["message"], "Productos del carrito validados");
        assert_eq!(body["items"][0]["valid"], false);
        assert_eq!(body["items"][0]["reason"], "Producto no disponible");
        assert_eq!(body["items"][0]["availableStock"], 0);
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let (app, _) = app();

        let response = send(&app, "GET", "/no-existe", None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "No existe el producto");
    }

    #[tokio::test]
    async fn export_rejects_unknown_format() {
        let (app, token) = app();

        let response = send(&app, "GET", "/export/csv", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Formato de exportación no disponible");
    }

    #[tokio::test]
    async fn export_returns_spreadsheet() {
        let (app, token) = app();
        create(&app, &token, "Silla").await;

        let response = send(&app, "GET", "/export/xlsx", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            XLSX_CONTENT_TYPE
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("productos_"));
        assert!(disposition.ends_with(".xlsx\""));
    }

    #[tokio::test]
    async fn image_cap_is_enforced_over_http() {
        let (app, token) = app();
        let id = create(&app, &token, "Silla").await;

        let response = send(
            &app,
            "POST",
            &format!("/images/{id}"),
            Some(&token),
            Some(json!({"storageKeys": ["k1", "k2", "k3", "k4", "k5"]})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Imágenes registradas correctamente");
        assert_eq!(body["images"].as_array().unwrap().len(), 5);

        let response = send(
            &app,
            "POST",
            &format!("/images/{id}"),
            Some(&token),
            Some(json!({"storageKeys": ["k6"]})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["error"],
            "Alcanzaste el límite de 5 imágenes por producto"
        );
    }

    #[tokio::test]
    async fn image_reorder_on_unknown_product_is_not_found() {
        let (app, token) = app();

        let response = send(
            &app,
            "PATCH",
            &format!("/images/{}/order", Uuid::now_v7()),
            Some(&token),
            Some(json!([{"id": Uuid::now_v7(), "displayOrder": 1}])),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Producto no encontrado");
    }

    #[tokio::test]
    async fn mutations_require_moderator() {
        let (app, _) = app();

        let response = send(&app, "POST", "/", None, Some(product_body("Silla"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let auth = jwt_auth();
        let client = auth
            .create_access_token(
                &Uuid::now_v7().to_string(),
                "user@example.com",
                "User",
                &[],
            )
            .unwrap();
        let app = router(
            ProductService::new(InMemoryProductRepository::new()),
            auth,
        );
        let response = send(&app, "POST", "/", Some(&client), Some(product_body("Silla"))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
