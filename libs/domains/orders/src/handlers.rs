use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_helpers::{jwt_auth_middleware, JwtAuth, JwtClaims, ValidatedJson};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{CreateOrder, Order, OrderItem, OrderLine};
use crate::repository::OrderRepository;
use crate::service::OrderService;

const TAG: &str = "orders";

/// OpenAPI documentation for the Orders API
#[derive(OpenApi)]
#[openapi(
    paths(list_orders, get_order, create_order),
    components(schemas(Order, OrderItem, CreateOrder, OrderLine)),
    tags(
        (name = TAG, description = "Order endpoints")
    )
)]
pub struct ApiDoc;

/// Order router; every route requires a session. Moderators see the
/// whole book, everyone else only their own orders.
pub fn router<R: OrderRepository + 'static>(
    service: OrderService<R>,
    jwt_auth: JwtAuth,
) -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{id}", get(get_order))
        .route_layer(middleware::from_fn_with_state(
            jwt_auth,
            jwt_auth_middleware,
        ))
        .with_state(Arc::new(service))
}

fn owner_id(claims: &JwtClaims) -> OrderResult<Uuid> {
    claims
        .sub
        .parse()
        .map_err(|_| OrderError::Validation("Usuario inválido".to_string()))
}

/// List the session user's orders (all orders for moderators)
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "Orders, newest first", body = Vec<Order>),
        (status = 404, description = "No orders found")
    )
)]
async fn list_orders<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    Extension(claims): Extension<JwtClaims>,
) -> OrderResult<Json<Vec<Order>>> {
    let user_id = owner_id(&claims)?;
    let orders = service.list_orders(user_id, claims.is_mod()).await?;
    Ok(Json(orders))
}

/// Get one order by its ORD- reference
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = String, Path, description = "Order reference")),
    responses(
        (status = 200, description = "Order found"),
        (status = 404, description = "Order not found")
    )
)]
async fn get_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<String>,
) -> OrderResult<Json<serde_json::Value>> {
    let user_id = owner_id(&claims)?;
    let order = service.get_order(&id, user_id, claims.is_mod()).await?;

    Ok(Json(json!({
        "order": order,
        "message": "Orden obtenida correctamente",
    })))
}

/// Place an order
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateOrder,
    responses(
        (status = 201, description = "Order created"),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Order reference already exists")
    )
)]
async fn create_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    ValidatedJson(input): ValidatedJson<CreateOrder>,
) -> OrderResult<impl IntoResponse> {
    let user_id = owner_id(&claims)?;
    let order = service.create_order(user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "order": order,
            "message": "Orden creada correctamente",
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryOrderRepository;
    use axum::body::Body;
    use axum::http::Request;
    use axum_helpers::JwtConfig;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn jwt_auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-that-is-long-enough-123"))
    }

    fn client_token(auth: &JwtAuth, user_id: Uuid) -> String {
        auth.create_access_token(&user_id.to_string(), "user@example.com", "User", &[])
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn order_body(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "shippingAddressId": Uuid::now_v7(),
            "products": [{
                "id": Uuid::now_v7(),
                "name": "Silla",
                "price": 50.0,
                "categoryId": Uuid::now_v7(),
                "quantity": 2,
            }],
            "subtotal": 100.0,
            "discount": 0.0,
            "tax": 16.0,
            "total": 116.0,
        })
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

    #[tokio::test]
    async fn orders_require_a_session() {
        let app = router(OrderService::new(InMemoryOrderRepository::new()), jwt_auth());

        let response = send(&app, "GET", "/", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_and_list_roundtrip() {
        let auth = jwt_auth();
        let user_id = Uuid::now_v7();
        let token = client_token(&auth, user_id);
        let app = router(OrderService::new(InMemoryOrderRepository::new()), auth);

        let response = send(
            &app,
            "POST",
            "/",
            Some(&token),
            Some(order_body("ORD-20250707183547475003")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Orden creada correctamente");
        assert_eq!(body["order"]["userId"], user_id.to_string());

        let response = send(&app, "GET", "/", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let response = send(
            &app,
            "GET",
            "/ORD-20250707183547475003",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Orden obtenida correctamente");
        assert_eq!(body["order"]["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_listing_is_not_found() {
        let auth = jwt_auth();
        let token = client_token(&auth, Uuid::now_v7());
        let app = router(OrderService::new(InMemoryOrderRepository::new()), auth);

        let response = send(&app, "GET", "/", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "No se encontraron órdenes");
    }

    #[tokio::test]
    async fn malformed_reference_is_rejected() {
        let auth = jwt_auth();
        let token = client_token(&auth, Uuid::now_v7());
        let app = router(OrderService::new(InMemoryOrderRepository::new()), auth);

        let response = send(&app, "POST", "/", Some(&token), Some(order_body("ORD-42"))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn foreign_order_is_hidden() {
        let auth = jwt_auth();
        let alice = client_token(&auth, Uuid::now_v7());
        let bob = client_token(&auth, Uuid::now_v7());
        let app = router(OrderService::new(InMemoryOrderRepository::new()), auth);

        send(
            &app,
            "POST",
            "/",
            Some(&alice),
            Some(order_body("ORD-20250707183547475003")),
        )
        .await;

        let response = send(
            &app,
            "GET",
            "/ORD-20250707183547475003",
            Some(&bob),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "La orden no existe");
    }
}
